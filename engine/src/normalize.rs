//! Signal normalization.
//!
//! Maps each source category's raw scorer output onto the canonical
//! [-1, 1] scale with a confidence weight in (0, 1]. Pure transform: no
//! side effects, no state beyond the configured rules.

use tracing::debug;

use common::{RawSignal, SignalError};

use crate::config::NormalizationConfig;

pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    /// Score one raw signal, returning `(sentiment_score, confidence_weight)`.
    ///
    /// Numeric scores take precedence over labels when both are present.
    /// Fails with `UnscoredSignal` when neither is usable.
    pub fn score(&self, signal: &RawSignal) -> Result<(f64, f64), SignalError> {
        let rule = self.config.rule(signal.source_category);

        let score = if let Some(raw) = signal.payload.raw_score {
            if !raw.is_finite() {
                return Err(self.unscored(signal, "raw score is not finite"));
            }
            let span = rule.raw_max - rule.raw_min;
            let mapped = -1.0 + 2.0 * (raw - rule.raw_min) / span;
            mapped.clamp(-1.0, 1.0)
        } else if let Some(label) = &signal.payload.label {
            match rule.labels.get(&label.to_lowercase()) {
                Some(score) => *score,
                None => {
                    return Err(self.unscored(signal, &format!("unknown label {:?}", label)));
                }
            }
        } else {
            return Err(self.unscored(signal, "no score or label in payload"));
        };

        let weight = match signal.payload.confidence {
            Some(c) if c.is_finite() && c > 0.0 => c.min(1.0),
            Some(_) => {
                return Err(self.unscored(signal, "reported confidence is not positive"));
            }
            None => 1.0,
        };

        debug!(
            source = %signal.source_name,
            category = %signal.source_category,
            score,
            weight,
            "normalized signal"
        );

        Ok((score, weight))
    }

    fn unscored(&self, signal: &RawSignal, reason: &str) -> SignalError {
        SignalError::UnscoredSignal {
            source: signal.source_name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{SignalPayload, SourceCategory};
    use uuid::Uuid;

    fn make_signal(
        category: SourceCategory,
        raw_score: Option<f64>,
        label: Option<&str>,
        confidence: Option<f64>,
    ) -> RawSignal {
        RawSignal {
            id: Uuid::new_v4(),
            source_category: category,
            source_name: "test-source".to_string(),
            payload: SignalPayload {
                text: "some headline".to_string(),
                raw_score,
                label: label.map(|l| l.to_string()),
                confidence,
            },
            timestamp: Some(Utc::now()),
            raw_entities: vec![],
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(NormalizationConfig::default())
    }

    #[test]
    fn test_linear_mapping_news_tone() {
        // News tone 50 on [-100, 100] maps to 0.5.
        let signal = make_signal(SourceCategory::News, Some(50.0), None, None);
        let (score, weight) = normalizer().score(&signal).unwrap();
        assert!((score - 0.5).abs() < 1e-12);
        assert_eq!(weight, 1.0);
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let signal = make_signal(SourceCategory::News, Some(250.0), None, None);
        let (score, _) = normalizer().score(&signal).unwrap();
        assert_eq!(score, 1.0);

        let signal = make_signal(SourceCategory::Social, Some(-3.0), None, None);
        let (score, _) = normalizer().score(&signal).unwrap();
        assert_eq!(score, -1.0);
    }

    #[test]
    fn test_label_lookup_is_case_insensitive() {
        let signal = make_signal(SourceCategory::Social, None, Some("Bullish"), None);
        let (score, _) = normalizer().score(&signal).unwrap();
        assert_eq!(score, 0.6);

        let signal = make_signal(SourceCategory::Social, None, Some("bearish"), None);
        let (score, _) = normalizer().score(&signal).unwrap();
        assert_eq!(score, -0.6);
    }

    #[test]
    fn test_unknown_label_is_unscored() {
        let signal = make_signal(SourceCategory::Social, None, Some("rocket"), None);
        let err = normalizer().score(&signal).unwrap_err();
        assert!(matches!(err, SignalError::UnscoredSignal { .. }));
    }

    #[test]
    fn test_empty_payload_is_unscored() {
        let signal = make_signal(SourceCategory::News, None, None, None);
        assert!(normalizer().score(&signal).is_err());
    }

    #[test]
    fn test_confidence_passthrough_and_clamp() {
        let signal = make_signal(SourceCategory::Social, None, Some("bullish"), Some(0.85));
        let (_, weight) = normalizer().score(&signal).unwrap();
        assert_eq!(weight, 0.85);

        // Over-unity confidence clamps to 1.0.
        let signal = make_signal(SourceCategory::Social, None, Some("bullish"), Some(1.7));
        let (_, weight) = normalizer().score(&signal).unwrap();
        assert_eq!(weight, 1.0);

        // Non-positive confidence cannot land in (0, 1].
        let signal = make_signal(SourceCategory::Social, None, Some("bullish"), Some(0.0));
        assert!(normalizer().score(&signal).is_err());
    }
}
