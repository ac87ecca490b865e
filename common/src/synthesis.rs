//! The final synthesis snapshot handed to the report renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::composite::DivergenceFlag;
use crate::entity::EntityId;
use crate::futures_data::SpikeFlag;
use crate::indicators::{FuturesBias, MacroAssessment};
use crate::signal::SourceCategory;

/// One contributing signal in a ranked entry's rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RationaleItem {
    pub source_name: String,
    pub source_category: SourceCategory,
    pub sentiment_score: f64,
    pub confidence_weight: f64,
}

/// One entry in the bullish or bearish list. Immutable snapshot; the
/// renderer performs no further scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub entity_id: EntityId,
    pub composite_sentiment: f64,
    pub supporting_signal_count: usize,
    /// Contributing signals in canonical (timestamp, source) order.
    pub rationale: Vec<RationaleItem>,
    pub divergences: Vec<DivergenceFlag>,
}

/// What the run actually saw: absorbed per-signal and per-source errors
/// reported as metadata rather than raised.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCoverage {
    pub sources_polled: usize,
    pub sources_unavailable: Vec<String>,
    pub signals_ingested: usize,
    pub dropped_malformed: usize,
    pub dropped_unscored: usize,
    pub dropped_stale: usize,
    pub unresolved_mentions: usize,
}

/// The full output of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    pub run_at: DateTime<Utc>,
    pub bullish: Vec<RankedEntry>,
    pub bearish: Vec<RankedEntry>,
    pub macro_assessment: MacroAssessment,
    pub futures_bias: FuturesBias,
    pub divergences: Vec<DivergenceFlag>,
    pub spike_alerts: Vec<SpikeFlag>,
    pub coverage: RunCoverage,
}
