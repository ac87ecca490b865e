//! Macro indicator feed.
//!
//! Supplies the indicator snapshot the macro rule table evaluates, plus
//! the feed's own interpreted view of those indicators as labeled macro
//! signals on theme entities.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use common::indicators::names;
use common::{IndicatorReading, IndicatorSnapshot, RawSignal, SignalPayload, SourceCategory};

use crate::IndicatorFeed;

/// Mock macro feed with a representative late-cycle tape: inflation above
/// band, growth stalling, labor market still tight.
pub struct MockIndicatorFeed {
    pub vix: f64,
    pub yield_spread_10y_2y: f64,
    pub cpi_yoy: f64,
    pub gdp_qoq: f64,
    pub unemployment: f64,
}

impl Default for MockIndicatorFeed {
    fn default() -> Self {
        Self {
            vix: 18.5,
            yield_spread_10y_2y: -0.05,
            cpi_yoy: 3.2,
            gdp_qoq: -0.2,
            unemployment: 3.8,
        }
    }
}

impl MockIndicatorFeed {
    fn labeled(&self, theme: &str, label: &str, text: &str) -> RawSignal {
        RawSignal {
            id: Uuid::new_v4(),
            source_category: SourceCategory::Macro,
            source_name: "macro-feed".to_string(),
            payload: SignalPayload {
                text: text.to_string(),
                raw_score: None,
                label: Some(label.to_string()),
                confidence: None,
            },
            timestamp: Some(Utc::now()),
            raw_entities: vec![theme.to_string()],
        }
    }
}

#[async_trait]
impl IndicatorFeed for MockIndicatorFeed {
    fn name(&self) -> &str {
        "macro-feed"
    }

    async fn snapshot(&self) -> Result<IndicatorSnapshot> {
        let observed_at = Utc::now();
        let mut snapshot = IndicatorSnapshot::new();
        for (name, value) in [
            (names::VIX, self.vix),
            (names::YIELD_SPREAD_10Y_2Y, self.yield_spread_10y_2y),
            (names::CPI_YOY, self.cpi_yoy),
            (names::GDP_QOQ, self.gdp_qoq),
            (names::UNEMPLOYMENT, self.unemployment),
        ] {
            snapshot.insert(IndicatorReading {
                name: name.to_string(),
                value,
                observed_at,
            });
        }
        Ok(snapshot)
    }

    /// The feed's interpreted view of its own numbers, expressed as
    /// labeled signals on macro themes.
    async fn signals(&self) -> Result<Vec<RawSignal>> {
        let mut signals = Vec::new();

        if self.cpi_yoy > 3.0 {
            signals.push(self.labeled(
                "inflation",
                "bearish",
                "CPI running above the target band",
            ));
        } else if self.cpi_yoy < 1.0 {
            signals.push(self.labeled(
                "inflation",
                "bullish",
                "Disinflation opens the door to easier policy",
            ));
        }

        if self.gdp_qoq < 0.0 {
            signals.push(self.labeled(
                "recession",
                "bearish",
                "GDP contracting quarter over quarter",
            ));
        } else if self.gdp_qoq > 3.0 {
            signals.push(self.labeled(
                "gdp",
                "bullish",
                "Growth running hot",
            ));
        }

        if self.unemployment < 4.0 {
            signals.push(self.labeled(
                "fed",
                "bearish",
                "Tight labor market keeps policy restrictive",
            ));
        } else if self.unemployment > 6.0 {
            signals.push(self.labeled(
                "fed",
                "bullish",
                "Slack labor market invites easing",
            ));
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_carries_all_indicators() {
        let feed = MockIndicatorFeed::default();
        let snapshot = feed.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.value(names::VIX), Some(18.5));
        assert_eq!(snapshot.value(names::CPI_YOY), Some(3.2));
    }

    #[tokio::test]
    async fn test_interpreted_signals_follow_values() {
        let feed = MockIndicatorFeed::default();
        let signals = feed.signals().await.unwrap();
        // Hot CPI, contracting GDP, tight labor market: three bearish
        // theme signals.
        assert_eq!(signals.len(), 3);
        for signal in &signals {
            assert_eq!(signal.source_category, SourceCategory::Macro);
            assert_eq!(signal.payload.label.as_deref(), Some("bearish"));
        }

        let calm = MockIndicatorFeed {
            cpi_yoy: 2.0,
            gdp_qoq: 1.5,
            unemployment: 4.5,
            ..MockIndicatorFeed::default()
        };
        assert!(calm.signals().await.unwrap().is_empty());
    }
}
