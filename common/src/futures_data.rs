//! Futures volume/open-interest series and spike flags.
//!
//! Independent lifecycle from sentiment entities: contracts are not
//! resolved through the entity registry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractMetric {
    Volume,
    OpenInterest,
}

impl ContractMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractMetric::Volume => "volume",
            ContractMetric::OpenInterest => "open_interest",
        }
    }
}

impl std::fmt::Display for ContractMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ordered daily observations for one contract/metric pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSeries {
    pub contract: String,
    pub metric: ContractMetric,
    pub points: Vec<SeriesPoint>,
}

/// A ratio- or delta-based anomaly relative to the trailing baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeFlag {
    pub contract: String,
    pub metric: ContractMetric,
    pub date: NaiveDate,
    pub current_value: f64,
    pub baseline_value: f64,
    pub ratio: f64,
    /// Number of trailing observations behind the baseline.
    pub period: usize,
}
