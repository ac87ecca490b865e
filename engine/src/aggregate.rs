//! Composite score aggregation.
//!
//! Groups normalized signals by (entity, source category) and computes a
//! confidence-weighted average per group. Accumulation runs in a canonical
//! (timestamp, source, entity) order over stable `BTreeMap` grouping, so a
//! fixed input set reproduces the exact same floating-point output across
//! runs regardless of arrival order.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use common::{CompositeScore, EntityId, NormalizedSignal, SourceCategory, TimeWindow};

pub struct Aggregator {
    lookback_hours: i64,
}

/// Everything the downstream stages need from one aggregation pass.
pub struct AggregationResult {
    /// One composite per (entity, category) group that had signals, in
    /// stable (entity, category) order.
    pub composites: Vec<CompositeScore>,
    /// Fresh signals per entity in canonical order, for rationale
    /// construction.
    pub signals_by_entity: BTreeMap<EntityId, Vec<NormalizedSignal>>,
    /// Signals excluded by the staleness filter.
    pub dropped_stale: usize,
}

impl Aggregator {
    pub fn new(lookback_hours: i64) -> Self {
        Self { lookback_hours }
    }

    pub fn aggregate(
        &self,
        run_at: DateTime<Utc>,
        signals: Vec<NormalizedSignal>,
    ) -> AggregationResult {
        let window = TimeWindow {
            start: run_at - Duration::hours(self.lookback_hours),
            end: run_at,
        };

        // Staleness is a hard filter, not a decay weight.
        let total = signals.len();
        let mut fresh: Vec<NormalizedSignal> = signals
            .into_iter()
            .filter(|s| s.timestamp >= window.start && s.timestamp <= window.end)
            .collect();
        let dropped_stale = total - fresh.len();
        if dropped_stale > 0 {
            debug!(dropped_stale, lookback_hours = self.lookback_hours, "excluded stale signals");
        }

        // Canonical accumulation order.
        fresh.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.source_name.cmp(&b.source_name))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        let mut groups: BTreeMap<(EntityId, SourceCategory), Vec<&NormalizedSignal>> =
            BTreeMap::new();
        let mut signals_by_entity: BTreeMap<EntityId, Vec<NormalizedSignal>> = BTreeMap::new();
        for signal in &fresh {
            groups
                .entry((signal.entity_id.clone(), signal.source_category))
                .or_default()
                .push(signal);
            signals_by_entity
                .entry(signal.entity_id.clone())
                .or_default()
                .push(signal.clone());
        }

        // Groups with zero signals simply do not exist; nothing is
        // fabricated.
        let mut composites = Vec::with_capacity(groups.len());
        for ((entity_id, category), members) in groups {
            let mut score_sum = 0.0;
            let mut weight_sum = 0.0;
            for signal in &members {
                score_sum += signal.sentiment_score * signal.confidence_weight;
                weight_sum += signal.confidence_weight;
            }
            composites.push(CompositeScore {
                entity_id,
                source_category: category,
                weighted_average_sentiment: score_sum / weight_sum,
                signal_count: members.len(),
                weight_sum,
                window,
            });
        }

        AggregationResult {
            composites,
            signals_by_entity,
            dropped_stale,
        }
    }
}
