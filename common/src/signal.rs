//! Raw and normalized sentiment signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::EntityId;

/// Grouping of signal origins that share normalization rules.
///
/// The variant order is the canonical iteration order used everywhere a
/// deterministic traversal over categories is required (composite
/// combination, divergence pairing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    News,
    Social,
    Macro,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 3] = [
        SourceCategory::News,
        SourceCategory::Social,
        SourceCategory::Macro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::News => "news",
            SourceCategory::Social => "social",
            SourceCategory::Macro => "macro",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scored content of a raw signal as handed over by the source.
///
/// The external sentiment scorer's output travels here: either a numeric
/// score on the source's native scale (`raw_score`), a categorical label
/// ("bullish"/"bearish"/"neutral"), or both. `confidence` is the source's
/// own model probability when it reports one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalPayload {
    pub text: String,
    pub raw_score: Option<f64>,
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

impl SignalPayload {
    /// A payload with nothing to score from is treated as malformed input.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.raw_score.is_none() && self.label.is_none()
    }
}

/// One record as produced by a collector. Immutable once ingested.
///
/// `timestamp` stays optional here because malformed upstream records are
/// dropped (and counted) at the ingestion boundary rather than failing the
/// run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    pub id: Uuid,
    pub source_category: SourceCategory,
    pub source_name: String,
    pub payload: SignalPayload,
    pub timestamp: Option<DateTime<Utc>>,
    /// Unresolved text mentions ("$AAPL", "Tesla Motors", "tech sector").
    /// Left empty when the source does not pre-extract mentions; the
    /// resolver then scans the payload text itself.
    pub raw_entities: Vec<String>,
}

/// A signal mapped onto the canonical scale and attributed to one entity.
///
/// Invariants: `sentiment_score` is in [-1, 1], `confidence_weight` is in
/// (0, 1], `entity_id` is never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSignal {
    pub entity_id: EntityId,
    pub source_category: SourceCategory,
    pub source_name: String,
    pub sentiment_score: f64,
    pub confidence_weight: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_canonical() {
        assert!(SourceCategory::News < SourceCategory::Social);
        assert!(SourceCategory::Social < SourceCategory::Macro);
    }

    #[test]
    fn test_empty_payload() {
        let payload = SignalPayload {
            text: "   ".to_string(),
            raw_score: None,
            label: None,
            confidence: None,
        };
        assert!(payload.is_empty());

        let scored = SignalPayload {
            text: String::new(),
            raw_score: Some(12.0),
            label: None,
            confidence: None,
        };
        assert!(!scored.is_empty());
    }
}
