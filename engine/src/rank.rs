//! Ranked synthesis of composites and flags.
//!
//! Splits entities into bullish and bearish lists by their overall
//! composite, with fully deterministic ordering: score, then supporting
//! signal count (more corroboration ranks first), then entity id. Running
//! the ranker twice on the same inputs yields byte-identical output.

use std::collections::BTreeMap;

use common::{
    CompositeScore, DivergenceFlag, EntityId, NormalizedSignal, RankedEntry, RationaleItem,
};

pub struct Ranker {
    bullish_threshold: f64,
    bearish_threshold: f64,
}

impl Ranker {
    pub fn new(bullish_threshold: f64, bearish_threshold: f64) -> Self {
        Self {
            bullish_threshold,
            bearish_threshold,
        }
    }

    /// Produce the (bullish, bearish) lists.
    pub fn rank(
        &self,
        composites: &[CompositeScore],
        signals_by_entity: &BTreeMap<EntityId, Vec<NormalizedSignal>>,
        divergences: &[DivergenceFlag],
    ) -> (Vec<RankedEntry>, Vec<RankedEntry>) {
        let mut entries: Vec<RankedEntry> = Vec::new();
        for (entity_id, overall) in overall_composites(composites) {
            let rationale = signals_by_entity
                .get(&entity_id)
                .map(|signals| {
                    signals
                        .iter()
                        .map(|s| RationaleItem {
                            source_name: s.source_name.clone(),
                            source_category: s.source_category,
                            sentiment_score: s.sentiment_score,
                            confidence_weight: s.confidence_weight,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let entity_divergences: Vec<DivergenceFlag> = divergences
                .iter()
                .filter(|f| f.entity_id == entity_id)
                .cloned()
                .collect();
            entries.push(RankedEntry {
                entity_id,
                composite_sentiment: overall.score,
                supporting_signal_count: overall.signal_count,
                rationale,
                divergences: entity_divergences,
            });
        }

        let mut bullish: Vec<RankedEntry> = entries
            .iter()
            .filter(|e| e.composite_sentiment >= self.bullish_threshold)
            .cloned()
            .collect();
        bullish.sort_by(|a, b| {
            b.composite_sentiment
                .partial_cmp(&a.composite_sentiment)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.supporting_signal_count.cmp(&a.supporting_signal_count))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        let mut bearish: Vec<RankedEntry> = entries
            .into_iter()
            .filter(|e| e.composite_sentiment <= self.bearish_threshold)
            .collect();
        bearish.sort_by(|a, b| {
            a.composite_sentiment
                .partial_cmp(&b.composite_sentiment)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.supporting_signal_count.cmp(&a.supporting_signal_count))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        (bullish, bearish)
    }
}

struct Overall {
    score: f64,
    signal_count: usize,
}

/// Combine an entity's category composites into one overall score,
/// weighted by each category's confidence-weight sum. Categories are
/// visited in the input's stable (entity, category) order.
fn overall_composites(composites: &[CompositeScore]) -> BTreeMap<EntityId, Overall> {
    let mut acc: BTreeMap<EntityId, (f64, f64, usize)> = BTreeMap::new();
    for composite in composites {
        let entry = acc.entry(composite.entity_id.clone()).or_insert((0.0, 0.0, 0));
        entry.0 += composite.weighted_average_sentiment * composite.weight_sum;
        entry.1 += composite.weight_sum;
        entry.2 += composite.signal_count;
    }
    acc.into_iter()
        .filter(|(_, (_, weight_sum, _))| *weight_sum > 0.0)
        .map(|(id, (score_sum, weight_sum, count))| {
            (
                id,
                Overall {
                    score: score_sum / weight_sum,
                    signal_count: count,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{SourceCategory, TimeWindow};

    fn window() -> TimeWindow {
        TimeWindow {
            start: "2025-04-09T16:00:00Z".parse().unwrap(),
            end: "2025-04-10T16:00:00Z".parse().unwrap(),
        }
    }

    fn make_composite(
        entity: &str,
        category: SourceCategory,
        score: f64,
        count: usize,
        weight_sum: f64,
    ) -> CompositeScore {
        CompositeScore {
            entity_id: entity.to_string(),
            source_category: category,
            weighted_average_sentiment: score,
            signal_count: count,
            weight_sum,
            window: window(),
        }
    }

    fn ranker() -> Ranker {
        Ranker::new(0.2, -0.2)
    }

    #[test]
    fn test_threshold_split_and_order() {
        let composites = vec![
            make_composite("AAPL", SourceCategory::News, 0.5, 3, 3.0),
            make_composite("MSFT", SourceCategory::News, 0.9, 2, 2.0),
            make_composite("TSLA", SourceCategory::News, -0.6, 4, 4.0),
            make_composite("SPY", SourceCategory::News, 0.05, 5, 5.0),
        ];
        let (bullish, bearish) = ranker().rank(&composites, &BTreeMap::new(), &[]);

        let bullish_ids: Vec<&str> = bullish.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(bullish_ids, vec!["MSFT", "AAPL"]);
        let bearish_ids: Vec<&str> = bearish.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(bearish_ids, vec!["TSLA"]);
    }

    #[test]
    fn test_tie_breaks_by_count_then_id() {
        let composites = vec![
            make_composite("NVDA", SourceCategory::News, 0.4, 2, 2.0),
            make_composite("AMD", SourceCategory::News, 0.4, 5, 5.0),
            make_composite("AMZN", SourceCategory::News, 0.4, 5, 5.0),
        ];
        let (bullish, _) = ranker().rank(&composites, &BTreeMap::new(), &[]);
        let ids: Vec<&str> = bullish.iter().map(|e| e.entity_id.as_str()).collect();
        // Equal scores: higher count first, then lexical id.
        assert_eq!(ids, vec!["AMD", "AMZN", "NVDA"]);
    }

    #[test]
    fn test_overall_composite_weighting() {
        // News carries three signals of weight sum 3.0 at +0.6; social one
        // light signal at -0.9. Overall leans bullish.
        let composites = vec![
            make_composite("AAPL", SourceCategory::News, 0.6, 3, 3.0),
            make_composite("AAPL", SourceCategory::Social, -0.9, 1, 0.5),
        ];
        let (bullish, bearish) = ranker().rank(&composites, &BTreeMap::new(), &[]);
        assert_eq!(bullish.len(), 1);
        assert!(bearish.is_empty());
        let expected = (0.6 * 3.0 + (-0.9) * 0.5) / 3.5;
        assert!((bullish[0].composite_sentiment - expected).abs() < 1e-12);
        assert_eq!(bullish[0].supporting_signal_count, 4);
    }

    #[test]
    fn test_divergences_attached_as_rationale() {
        let composites = vec![
            make_composite("AAPL", SourceCategory::News, 0.6, 2, 2.0),
            make_composite("AAPL", SourceCategory::Social, 0.1, 1, 1.0),
        ];
        let flags = vec![DivergenceFlag {
            entity_id: "AAPL".to_string(),
            category_a: SourceCategory::News,
            category_b: SourceCategory::Social,
            score_a: 0.6,
            score_b: 0.1,
            magnitude: 0.5,
            direction: common::DivergenceDirection::Confirming,
        }];
        let (bullish, _) = ranker().rank(&composites, &BTreeMap::new(), &flags);
        assert_eq!(bullish[0].divergences.len(), 1);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let composites = vec![
            make_composite("AAPL", SourceCategory::News, 0.44, 2, 2.0),
            make_composite("AAPL", SourceCategory::Social, 0.31, 3, 2.5),
            make_composite("TSLA", SourceCategory::News, -0.52, 2, 2.0),
            make_composite("BTC", SourceCategory::Social, 0.44, 2, 2.0),
        ];
        let first = ranker().rank(&composites, &BTreeMap::new(), &[]);
        let second = ranker().rank(&composites, &BTreeMap::new(), &[]);

        let first_json = serde_json::to_vec(&(first.0, first.1)).unwrap();
        let second_json = serde_json::to_vec(&(second.0, second.1)).unwrap();
        assert_eq!(first_json, second_json);
    }
}
