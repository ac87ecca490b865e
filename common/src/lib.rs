//! Shared data model for the marketbrief pipeline.
//!
//! Everything downstream of the collectors works in terms of these types:
//! raw signals flow in, normalized signals and per-entity composites are
//! derived, and a single `Synthesis` snapshot flows out to the report
//! renderer.

pub mod composite;
pub mod entity;
pub mod error;
pub mod futures_data;
pub mod indicators;
pub mod signal;
pub mod synthesis;

pub use composite::{CompositeScore, DivergenceDirection, DivergenceFlag, TimeWindow};
pub use entity::{Entity, EntityId, EntityKind};
pub use error::SignalError;
pub use futures_data::{ContractMetric, ContractSeries, SeriesPoint, SpikeFlag};
pub use indicators::{
    BiasConfidence, BiasDirection, FuturesBias, IndicatorReading, IndicatorSnapshot,
    MacroAssessment, MacroRating,
};
pub use signal::{NormalizedSignal, RawSignal, SignalPayload, SourceCategory};
pub use synthesis::{RankedEntry, RationaleItem, RunCoverage, Synthesis};
