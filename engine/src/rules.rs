//! Declarative macro environment rating.
//!
//! The rating logic is an ordered list of (condition, rating) rules
//! evaluated first-match-wins against the indicator snapshot, so the
//! mapping from indicator state to rating is fully deterministic,
//! auditable, and testable without any I/O. A rule whose indicator is
//! absent from the snapshot never matches.

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::indicators::names;
use common::{
    BiasConfidence, BiasDirection, FuturesBias, IndicatorSnapshot, MacroAssessment, MacroRating,
};

use crate::config::IndicatorBands;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    Above { indicator: String, threshold: f64 },
    Below { indicator: String, threshold: f64 },
    AllOf(Vec<RuleCondition>),
}

impl RuleCondition {
    pub fn matches(&self, snapshot: &IndicatorSnapshot) -> bool {
        match self {
            RuleCondition::Above { indicator, threshold } => snapshot
                .value(indicator)
                .map(|v| v > *threshold)
                .unwrap_or(false),
            RuleCondition::Below { indicator, threshold } => snapshot
                .value(indicator)
                .map(|v| v < *threshold)
                .unwrap_or(false),
            RuleCondition::AllOf(conditions) => {
                conditions.iter().all(|c| c.matches(snapshot))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroRule {
    pub name: String,
    pub condition: RuleCondition,
    pub rating: MacroRating,
}

/// The ordered rule list. Declaration order is evaluation priority.
#[derive(Debug, Clone)]
pub struct MacroRuleTable {
    rules: Vec<MacroRule>,
}

impl MacroRuleTable {
    pub fn new(rules: Vec<MacroRule>) -> Self {
        Self { rules }
    }

    /// The default table built from the configured indicator bands.
    /// Volatility and curve inversion outrank the inflation rules; the
    /// final catch-all keeps the table total.
    pub fn from_bands(bands: &IndicatorBands) -> Self {
        let rule = |name: &str, condition: RuleCondition, rating: MacroRating| MacroRule {
            name: name.to_string(),
            condition,
            rating,
        };
        Self::new(vec![
            rule(
                "vix-elevated",
                RuleCondition::Above {
                    indicator: names::VIX.to_string(),
                    threshold: bands.vix_high,
                },
                MacroRating::RiskOff,
            ),
            rule(
                "yield-curve-inverted",
                RuleCondition::Below {
                    indicator: names::YIELD_SPREAD_10Y_2Y.to_string(),
                    threshold: bands.curve_inversion,
                },
                MacroRating::RiskOff,
            ),
            rule(
                "inflation-above-band",
                RuleCondition::Above {
                    indicator: names::CPI_YOY.to_string(),
                    threshold: bands.inflation_high,
                },
                MacroRating::Inflationary,
            ),
            rule(
                "inflation-below-band",
                RuleCondition::Below {
                    indicator: names::CPI_YOY.to_string(),
                    threshold: bands.inflation_low,
                },
                MacroRating::Deflationary,
            ),
            rule(
                "calm-tape",
                RuleCondition::AllOf(vec![
                    RuleCondition::Below {
                        indicator: names::VIX.to_string(),
                        threshold: bands.vix_low,
                    },
                    RuleCondition::Above {
                        indicator: names::YIELD_SPREAD_10Y_2Y.to_string(),
                        threshold: bands.curve_inversion,
                    },
                ]),
                MacroRating::RiskOn,
            ),
            // Vacuously true catch-all.
            rule("default-neutral", RuleCondition::AllOf(vec![]), MacroRating::Neutral),
        ])
    }

    /// First matching rule wins.
    pub fn assess(&self, snapshot: &IndicatorSnapshot) -> MacroAssessment {
        for rule in &self.rules {
            if rule.condition.matches(snapshot) {
                debug!(rule = %rule.name, rating = %rule.rating, "macro rule matched");
                return MacroAssessment {
                    rating: rule.rating,
                    rule: rule.name.clone(),
                    indicators: snapshot.clone(),
                };
            }
        }
        MacroAssessment {
            rating: MacroRating::Neutral,
            rule: "no-rule-matched".to_string(),
            indicators: snapshot.clone(),
        }
    }

    pub fn rules(&self) -> &[MacroRule] {
        &self.rules
    }
}

/// Directional equity-futures bias implied by the winning macro rating.
pub fn suggest_bias(assessment: &MacroAssessment) -> FuturesBias {
    let (direction, confidence, reason) = match assessment.rating {
        MacroRating::RiskOn => (
            BiasDirection::Long,
            BiasConfidence::High,
            "macro environment is risk-on",
        ),
        MacroRating::RiskOff => (
            BiasDirection::Short,
            BiasConfidence::High,
            "macro environment is risk-off",
        ),
        MacroRating::Inflationary => (
            BiasDirection::Short,
            BiasConfidence::Medium,
            "inflation running above band pressures multiples",
        ),
        MacroRating::Deflationary => (
            BiasDirection::Long,
            BiasConfidence::Low,
            "disinflation leaves room for easier policy",
        ),
        MacroRating::Neutral => (
            BiasDirection::Flat,
            BiasConfidence::Low,
            "no macro rule fired decisively",
        ),
    };
    FuturesBias {
        direction,
        confidence,
        rationale: vec![
            reason.to_string(),
            format!("rule: {}", assessment.rule),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::IndicatorReading;

    fn snapshot(values: &[(&str, f64)]) -> IndicatorSnapshot {
        let mut snap = IndicatorSnapshot::new();
        for (name, value) in values {
            snap.insert(IndicatorReading {
                name: name.to_string(),
                value: *value,
                observed_at: Utc::now(),
            });
        }
        snap
    }

    fn table() -> MacroRuleTable {
        MacroRuleTable::from_bands(&IndicatorBands::default())
    }

    #[test]
    fn test_high_vix_wins_first() {
        // VIX 28 with high band 25: the first rule fires even though the
        // inflation rule would also match.
        let snap = snapshot(&[(names::VIX, 28.0), (names::CPI_YOY, 3.4)]);
        let assessment = table().assess(&snap);
        assert_eq!(assessment.rating, MacroRating::RiskOff);
        assert_eq!(assessment.rule, "vix-elevated");
    }

    #[test]
    fn test_inverted_curve_is_risk_off() {
        let snap = snapshot(&[(names::VIX, 18.0), (names::YIELD_SPREAD_10Y_2Y, -0.3)]);
        let assessment = table().assess(&snap);
        assert_eq!(assessment.rating, MacroRating::RiskOff);
        assert_eq!(assessment.rule, "yield-curve-inverted");
    }

    #[test]
    fn test_inflation_band_classification() {
        let hot = snapshot(&[(names::VIX, 18.0), (names::CPI_YOY, 3.2)]);
        assert_eq!(table().assess(&hot).rating, MacroRating::Inflationary);

        let cold = snapshot(&[(names::VIX, 18.0), (names::CPI_YOY, 0.4)]);
        assert_eq!(table().assess(&cold).rating, MacroRating::Deflationary);
    }

    #[test]
    fn test_calm_tape_is_risk_on() {
        let snap = snapshot(&[
            (names::VIX, 13.0),
            (names::YIELD_SPREAD_10Y_2Y, 0.6),
            (names::CPI_YOY, 2.1),
        ]);
        let assessment = table().assess(&snap);
        assert_eq!(assessment.rating, MacroRating::RiskOn);
    }

    #[test]
    fn test_missing_indicators_fall_through_to_neutral() {
        let assessment = table().assess(&IndicatorSnapshot::new());
        assert_eq!(assessment.rating, MacroRating::Neutral);
        assert_eq!(assessment.rule, "default-neutral");
    }

    #[test]
    fn test_bias_follows_rating() {
        let risk_off = table().assess(&snapshot(&[(names::VIX, 30.0)]));
        let bias = suggest_bias(&risk_off);
        assert_eq!(bias.direction, BiasDirection::Short);
        assert_eq!(bias.confidence, BiasConfidence::High);
        assert!(bias.rationale.iter().any(|r| r.contains("vix-elevated")));
    }
}
