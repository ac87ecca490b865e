//! Source collectors.
//!
//! Every external data producer implements one capability trait per
//! category of input; mock and live variants are two implementations of
//! the same trait, selected at composition time. Collectors are the only
//! concurrent part of the system; their outputs are buffered and handed to
//! the engine as one immutable snapshot per run.

pub mod fetch;
pub mod futures_feed;
pub mod indicator_feed;
pub mod news;
pub mod social;

use anyhow::Result;
use async_trait::async_trait;

use common::{ContractSeries, IndicatorSnapshot, RawSignal, SourceCategory};

pub use fetch::{fetch_indicators, fetch_series, fetch_signals};
pub use futures_feed::MockFuturesFeed;
pub use indicator_feed::MockIndicatorFeed;
pub use news::{GdeltNewsCollector, MockNewsCollector};
pub use social::MockSocialCollector;

/// A producer of raw sentiment signals for one source category.
#[async_trait]
pub trait SignalCollector: Send + Sync {
    fn name(&self) -> &str;
    fn category(&self) -> SourceCategory;
    async fn collect(&self) -> Result<Vec<RawSignal>>;
}

/// A producer of macro indicator readings plus the indicator-derived
/// sentiment view on macro themes.
#[async_trait]
pub trait IndicatorFeed: Send + Sync {
    fn name(&self) -> &str;
    async fn snapshot(&self) -> Result<IndicatorSnapshot>;
    async fn signals(&self) -> Result<Vec<RawSignal>>;
}

/// A producer of per-contract volume/open-interest series.
#[async_trait]
pub trait FuturesFeed: Send + Sync {
    fn name(&self) -> &str;
    async fn series(&self) -> Result<Vec<ContractSeries>>;
}
