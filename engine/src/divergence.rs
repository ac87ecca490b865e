//! Cross-category divergence detection.
//!
//! Compares composite scores across source categories for the same entity
//! and flags gaps exceeding the configured threshold. Contradiction
//! requires opposite signs with both magnitudes clear of the significance
//! floor; large same-direction gaps are still reported as confirming
//! divergence, since they are informative too.

use std::collections::BTreeMap;
use tracing::debug;

use common::{CompositeScore, DivergenceDirection, DivergenceFlag, EntityId};

pub struct DivergenceDetector {
    threshold: f64,
    significance_floor: f64,
}

impl DivergenceDetector {
    pub fn new(threshold: f64, significance_floor: f64) -> Self {
        Self {
            threshold,
            significance_floor,
        }
    }

    pub fn detect(&self, composites: &[CompositeScore]) -> Vec<DivergenceFlag> {
        // Category composites per entity; input order is already the stable
        // (entity, category) order, so pairs come out deterministic.
        let mut by_entity: BTreeMap<&EntityId, Vec<&CompositeScore>> = BTreeMap::new();
        for composite in composites {
            by_entity.entry(&composite.entity_id).or_default().push(composite);
        }

        let mut flags = Vec::new();
        for (entity_id, scores) in by_entity {
            // An entity seen by one category cannot diverge from nothing.
            if scores.len() < 2 {
                continue;
            }
            for i in 0..scores.len() {
                for j in (i + 1)..scores.len() {
                    let a = scores[i];
                    let b = scores[j];
                    let score_a = a.weighted_average_sentiment;
                    let score_b = b.weighted_average_sentiment;
                    let magnitude = (score_a - score_b).abs();
                    if magnitude < self.threshold {
                        continue;
                    }

                    let contradicting = score_a * score_b < 0.0
                        && score_a.abs() >= self.significance_floor
                        && score_b.abs() >= self.significance_floor;
                    let direction = if contradicting {
                        DivergenceDirection::Contradicting
                    } else {
                        DivergenceDirection::Confirming
                    };

                    debug!(
                        entity = %entity_id,
                        category_a = %a.source_category,
                        category_b = %b.source_category,
                        magnitude,
                        ?direction,
                        "divergence flagged"
                    );

                    flags.push(DivergenceFlag {
                        entity_id: entity_id.clone(),
                        category_a: a.source_category,
                        category_b: b.source_category,
                        score_a,
                        score_b,
                        magnitude,
                        direction,
                    });
                }
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{SourceCategory, TimeWindow};

    fn make_composite(entity: &str, category: SourceCategory, score: f64) -> CompositeScore {
        let window = TimeWindow {
            start: "2025-04-09T16:00:00Z".parse().unwrap(),
            end: "2025-04-10T16:00:00Z".parse().unwrap(),
        };
        CompositeScore {
            entity_id: entity.to_string(),
            source_category: category,
            weighted_average_sentiment: score,
            signal_count: 3,
            weight_sum: 3.0,
            window,
        }
    }

    fn detector() -> DivergenceDetector {
        DivergenceDetector::new(0.4, 0.15)
    }

    #[test]
    fn test_contradicting_divergence() {
        // news +0.6 vs social -0.5: magnitude 1.1, opposite signs, both
        // clear of the floor.
        let composites = vec![
            make_composite("AAPL", SourceCategory::News, 0.6),
            make_composite("AAPL", SourceCategory::Social, -0.5),
        ];
        let flags = detector().detect(&composites);
        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.category_a, SourceCategory::News);
        assert_eq!(flag.category_b, SourceCategory::Social);
        assert!((flag.magnitude - 1.1).abs() < 1e-12);
        assert_eq!(flag.direction, DivergenceDirection::Contradicting);
    }

    #[test]
    fn test_confirming_divergence_same_direction() {
        let composites = vec![
            make_composite("NVDA", SourceCategory::News, 0.9),
            make_composite("NVDA", SourceCategory::Social, 0.3),
        ];
        let flags = detector().detect(&composites);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].direction, DivergenceDirection::Confirming);
    }

    #[test]
    fn test_near_zero_noise_is_not_contradiction() {
        // Opposite signs but one side sits inside the significance floor.
        let composites = vec![
            make_composite("SPY", SourceCategory::News, 0.5),
            make_composite("SPY", SourceCategory::Social, -0.05),
        ];
        let flags = detector().detect(&composites);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].direction, DivergenceDirection::Confirming);
    }

    #[test]
    fn test_below_threshold_no_flag() {
        let composites = vec![
            make_composite("MSFT", SourceCategory::News, 0.3),
            make_composite("MSFT", SourceCategory::Social, 0.1),
        ];
        assert!(detector().detect(&composites).is_empty());
    }

    #[test]
    fn test_single_category_never_flags() {
        let composites = vec![
            make_composite("TSLA", SourceCategory::News, 1.0),
            make_composite("BTC", SourceCategory::Social, -1.0),
        ];
        assert!(detector().detect(&composites).is_empty());
    }

    #[test]
    fn test_three_categories_pairwise() {
        let composites = vec![
            make_composite("QQQ", SourceCategory::News, 0.8),
            make_composite("QQQ", SourceCategory::Social, -0.4),
            make_composite("QQQ", SourceCategory::Macro, 0.0),
        ];
        let flags = detector().detect(&composites);
        // news/social (1.2), news/macro (0.8), social/macro (0.4).
        assert_eq!(flags.len(), 3);
        assert_eq!(flags[0].direction, DivergenceDirection::Contradicting);
        assert_eq!(flags[1].direction, DivergenceDirection::Confirming);
        assert_eq!(flags[2].direction, DivergenceDirection::Confirming);
    }
}
