//! Per-entity composite scores and cross-category divergence flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::signal::SourceCategory;

/// The lookback window a composite was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Confidence-weighted average sentiment for one entity within one source
/// category. Derived, recomputed each run, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    pub entity_id: EntityId,
    pub source_category: SourceCategory,
    pub weighted_average_sentiment: f64,
    pub signal_count: usize,
    /// Sum of the confidence weights behind the average. Used when category
    /// composites are combined into the per-entity overall score.
    pub weight_sum: f64,
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceDirection {
    /// Large gap, same direction of conviction.
    Confirming,
    /// Opposite-signed scores, both clear of the significance floor.
    Contradicting,
}

/// A significant disagreement between two source categories for the same
/// entity. Only created when the magnitude clears the configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceFlag {
    pub entity_id: EntityId,
    pub category_a: SourceCategory,
    pub category_b: SourceCategory,
    pub score_a: f64,
    pub score_b: f64,
    pub magnitude: f64,
    pub direction: DivergenceDirection,
}
