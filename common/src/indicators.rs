//! Macro indicator readings and the discrete macro assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical indicator names shared between the indicator feed and the
/// macro rule table.
pub mod names {
    pub const VIX: &str = "vix";
    pub const YIELD_SPREAD_10Y_2Y: &str = "yield_spread_10y_2y";
    pub const CPI_YOY: &str = "cpi_yoy";
    pub const GDP_QOQ: &str = "gdp_qoq";
    pub const UNEMPLOYMENT: &str = "unemployment";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub name: String,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

/// Point-in-time mapping of indicator name to reading, as handed over by
/// the macro indicator feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    readings: BTreeMap<String, IndicatorReading>,
}

impl IndicatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reading: IndicatorReading) {
        self.readings.insert(reading.name.clone(), reading);
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.readings.get(name).map(|r| r.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorReading> {
        self.readings.values()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroRating {
    RiskOn,
    RiskOff,
    Inflationary,
    Deflationary,
    Neutral,
}

impl MacroRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroRating::RiskOn => "risk-on",
            MacroRating::RiskOff => "risk-off",
            MacroRating::Inflationary => "inflationary",
            MacroRating::Deflationary => "deflationary",
            MacroRating::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for MacroRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The winning rating plus the rule that produced it and the indicator
/// state it was judged against, so the mapping stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroAssessment {
    pub rating: MacroRating,
    pub rule: String,
    pub indicators: IndicatorSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasDirection {
    Long,
    Short,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasConfidence {
    High,
    Medium,
    Low,
}

/// Suggested directional bias for equity index futures, derived from the
/// macro assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesBias {
    pub direction: BiasDirection,
    pub confidence: BiasConfidence,
    pub rationale: Vec<String>,
}
