//! Bounded concurrent fetch phase.
//!
//! All sources are polled concurrently, each under its own timeout, and
//! the buffered results are handed downstream only after every fetch has
//! completed or timed out. A failed or slow source contributes zero
//! signals and is recorded by name; it never aborts the run.

use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

use common::{ContractSeries, IndicatorSnapshot, RawSignal, SignalError};

use crate::{FuturesFeed, IndicatorFeed, SignalCollector};

/// Poll every signal collector. Returns the combined signal snapshot plus
/// the names of sources that contributed nothing.
pub async fn fetch_signals(
    collectors: &[Box<dyn SignalCollector>],
    timeout: Duration,
) -> (Vec<RawSignal>, Vec<String>) {
    let tasks = collectors.iter().map(|collector| async move {
        let name = collector.name().to_string();
        let outcome = tokio::time::timeout(timeout, collector.collect()).await;
        (name, outcome)
    });

    let mut signals = Vec::new();
    let mut unavailable = Vec::new();
    for (name, outcome) in join_all(tasks).await {
        match outcome {
            Ok(Ok(batch)) => {
                info!(source = %name, count = batch.len(), "collected signals");
                signals.extend(batch);
            }
            Ok(Err(err)) => {
                let err = SignalError::SourceUnavailable {
                    source: name.clone(),
                    reason: err.to_string(),
                };
                warn!(%err, "source degraded");
                unavailable.push(name);
            }
            Err(_) => {
                let err = SignalError::SourceUnavailable {
                    source: name.clone(),
                    reason: format!("timed out after {:?}", timeout),
                };
                warn!(%err, "source degraded");
                unavailable.push(name);
            }
        }
    }
    (signals, unavailable)
}

/// Poll the macro indicator feed: the indicator snapshot for the rule
/// table plus the feed's interpreted theme signals.
pub async fn fetch_indicators(
    feed: &dyn IndicatorFeed,
    timeout: Duration,
) -> (IndicatorSnapshot, Vec<RawSignal>, Option<String>) {
    let combined = tokio::time::timeout(timeout, async {
        let snapshot = feed.snapshot().await?;
        let signals = feed.signals().await?;
        anyhow::Ok((snapshot, signals))
    })
    .await;

    match combined {
        Ok(Ok((snapshot, signals))) => {
            info!(
                source = feed.name(),
                indicators = snapshot.len(),
                signals = signals.len(),
                "collected macro indicators"
            );
            (snapshot, signals, None)
        }
        Ok(Err(err)) => {
            warn!(source = feed.name(), %err, "indicator feed degraded");
            (IndicatorSnapshot::new(), Vec::new(), Some(feed.name().to_string()))
        }
        Err(_) => {
            warn!(source = feed.name(), ?timeout, "indicator feed timed out");
            (IndicatorSnapshot::new(), Vec::new(), Some(feed.name().to_string()))
        }
    }
}

/// Poll the futures feed for per-contract series.
pub async fn fetch_series(
    feed: &dyn FuturesFeed,
    timeout: Duration,
) -> (Vec<ContractSeries>, Option<String>) {
    match tokio::time::timeout(timeout, feed.series()).await {
        Ok(Ok(series)) => {
            info!(source = feed.name(), series = series.len(), "collected futures series");
            (series, None)
        }
        Ok(Err(err)) => {
            warn!(source = feed.name(), %err, "futures feed degraded");
            (Vec::new(), Some(feed.name().to_string()))
        }
        Err(_) => {
            warn!(source = feed.name(), ?timeout, "futures feed timed out");
            (Vec::new(), Some(feed.name().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use common::SourceCategory;

    struct FailingCollector;

    #[async_trait]
    impl SignalCollector for FailingCollector {
        fn name(&self) -> &str {
            "flaky-wire"
        }

        fn category(&self) -> SourceCategory {
            SourceCategory::News
        }

        async fn collect(&self) -> anyhow::Result<Vec<RawSignal>> {
            Err(anyhow!("connection reset"))
        }
    }

    struct SlowCollector;

    #[async_trait]
    impl SignalCollector for SlowCollector {
        fn name(&self) -> &str {
            "slow-wire"
        }

        fn category(&self) -> SourceCategory {
            SourceCategory::News
        }

        async fn collect(&self) -> anyhow::Result<Vec<RawSignal>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_source_degrades_not_aborts() {
        let collectors: Vec<Box<dyn SignalCollector>> = vec![
            Box::new(FailingCollector),
            Box::new(crate::MockNewsCollector::new(
                "cnbc",
                vec!["AAPL".to_string()],
                5,
                1,
            )),
        ];
        let (signals, unavailable) =
            fetch_signals(&collectors, Duration::from_secs(5)).await;
        assert_eq!(signals.len(), 5);
        assert_eq!(unavailable, vec!["flaky-wire".to_string()]);
    }

    #[tokio::test]
    async fn test_timeout_is_bounded() {
        let collectors: Vec<Box<dyn SignalCollector>> = vec![Box::new(SlowCollector)];
        let (signals, unavailable) =
            fetch_signals(&collectors, Duration::from_millis(100)).await;
        assert!(signals.is_empty());
        assert_eq!(unavailable, vec!["slow-wire".to_string()]);
    }
}
