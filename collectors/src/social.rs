//! Social sentiment collectors.
//!
//! Social sources deliver categorical calls ("bullish"/"bearish"/
//! "neutral") with a model confidence rather than a numeric tone, so the
//! payload carries a label plus confidence and no raw score.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use common::{RawSignal, SignalPayload, SourceCategory};

use crate::SignalCollector;

/// Sentiment mix for one community.
#[derive(Debug, Clone, Copy)]
struct SentimentProfile {
    bullish: f64,
    bearish: f64,
}

fn profile_for(community: &str) -> SentimentProfile {
    match community {
        // WSB runs hotter and more bullish than the broader tape.
        "wallstreetbets" => SentimentProfile {
            bullish: 0.6,
            bearish: 0.3,
        },
        // r/investing is more balanced and conservative.
        "investing" => SentimentProfile {
            bullish: 0.4,
            bearish: 0.3,
        },
        _ => SentimentProfile {
            bullish: 0.5,
            bearish: 0.3,
        },
    }
}

const BULLISH_POSTS: [&str; 4] = [
    "{ticker} is going to the moon",
    "Why {ticker} is undervalued right now",
    "Just bought more {ticker}, here's why",
    "The bull case for {ticker} that no one is talking about",
];

const BEARISH_POSTS: [&str; 4] = [
    "{ticker} is overvalued, change my mind",
    "Why I'm shorting {ticker}",
    "The bear case for {ticker} that everyone is ignoring",
    "Just sold all my {ticker}, here's why",
];

const NEUTRAL_POSTS: [&str; 3] = [
    "Thoughts on {ticker}?",
    "{ticker} analysis - what am I missing?",
    "DD on {ticker} - mixed signals",
];

/// Mock social collector: one community per instance, posts labeled by the
/// community's sentiment profile.
pub struct MockSocialCollector {
    community: String,
    tickers: Vec<String>,
    posts: usize,
    seed: u64,
}

impl MockSocialCollector {
    pub fn new(
        community: impl Into<String>,
        tickers: Vec<String>,
        posts: usize,
        seed: u64,
    ) -> Self {
        Self {
            community: community.into(),
            tickers,
            posts,
            seed,
        }
    }
}

#[async_trait]
impl SignalCollector for MockSocialCollector {
    fn name(&self) -> &str {
        &self.community
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Social
    }

    async fn collect(&self) -> Result<Vec<RawSignal>> {
        let profile = profile_for(&self.community);
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let now = Utc::now();
        let mut signals = Vec::with_capacity(self.posts);

        for _ in 0..self.posts {
            if self.tickers.is_empty() {
                break;
            }
            let ticker = &self.tickers[rng.usize(..self.tickers.len())];

            let roll = rng.f64();
            let (label, templates): (&str, &[&str]) = if roll < profile.bullish {
                ("bullish", &BULLISH_POSTS)
            } else if roll < profile.bullish + profile.bearish {
                ("bearish", &BEARISH_POSTS)
            } else {
                ("neutral", &NEUTRAL_POSTS)
            };
            let template = templates[rng.usize(..templates.len())];

            signals.push(RawSignal {
                id: Uuid::new_v4(),
                source_category: SourceCategory::Social,
                source_name: self.community.clone(),
                payload: SignalPayload {
                    text: template.replace("{ticker}", ticker),
                    raw_score: None,
                    label: Some(label.to_string()),
                    // Classifier probability; never exactly zero.
                    confidence: Some(0.55 + rng.f64() * 0.44),
                },
                timestamp: Some(now - Duration::minutes(rng.i64(0..1440))),
                raw_entities: vec![format!("${}", ticker)],
            });
        }

        debug!(
            community = %self.community,
            count = signals.len(),
            "generated mock social posts"
        );
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers() -> Vec<String> {
        ["GME", "TSLA", "NVDA", "SPY"].iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_social_labels_and_confidence() {
        let collector = MockSocialCollector::new("wallstreetbets", tickers(), 20, 11);
        let signals = collector.collect().await.unwrap();
        assert_eq!(signals.len(), 20);
        for signal in &signals {
            assert_eq!(signal.source_category, SourceCategory::Social);
            let label = signal.payload.label.as_deref().unwrap();
            assert!(["bullish", "bearish", "neutral"].contains(&label));
            let confidence = signal.payload.confidence.unwrap();
            assert!(confidence > 0.0 && confidence <= 1.0);
            assert!(signal.raw_entities[0].starts_with('$'));
        }
    }

    #[tokio::test]
    async fn test_wsb_leans_bullish() {
        let signals = MockSocialCollector::new("wallstreetbets", tickers(), 300, 5)
            .collect()
            .await
            .unwrap();
        let bullish = signals
            .iter()
            .filter(|s| s.payload.label.as_deref() == Some("bullish"))
            .count();
        let bearish = signals
            .iter()
            .filter(|s| s.payload.label.as_deref() == Some("bearish"))
            .count();
        assert!(bullish > bearish);
    }
}
