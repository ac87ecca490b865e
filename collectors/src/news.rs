//! Professional news collectors.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::{RawSignal, SignalPayload, SourceCategory};

use crate::SignalCollector;

/// GDELT news collector.
/// GDELT provides free global news data with a document tone score on a
/// [-100, 100] scale, which travels as the signal's raw score.
pub struct GdeltNewsCollector {
    api_url: String,
    client: Client,
    lookback_hours: i64,
    max_records: usize,
}

#[derive(Debug, Deserialize)]
struct GdeltArticle {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Themes")]
    themes: String,
    #[serde(rename = "Tone")]
    tone: f64,
}

impl GdeltNewsCollector {
    pub fn new(lookback_hours: i64, max_records: usize) -> Self {
        Self {
            api_url: "https://api.gdeltproject.org/api/v2/doc/doc".to_string(),
            client: Client::new(),
            lookback_hours,
            max_records,
        }
    }

    async fn fetch_articles(&self) -> Result<Vec<GdeltArticle>> {
        let end_time = Utc::now();
        let start_time = end_time - Duration::hours(self.lookback_hours);

        // GDELT query format: mode query start end maxrecords format
        let query = format!(
            "{} {} {} {} {} json",
            "artlist",
            "*:*",
            start_time.format("%Y%m%d%H%M%S"),
            end_time.format("%Y%m%d%H%M%S"),
            self.max_records,
        );

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("query", &query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("GDELT API error: {}", response.status()));
        }

        let articles: Vec<GdeltArticle> = response.json().await?;
        info!("fetched {} articles from GDELT", articles.len());
        Ok(articles)
    }
}

#[async_trait]
impl SignalCollector for GdeltNewsCollector {
    fn name(&self) -> &str {
        "gdelt"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::News
    }

    async fn collect(&self) -> Result<Vec<RawSignal>> {
        let articles = self.fetch_articles().await?;
        let now = Utc::now();
        Ok(articles
            .into_iter()
            .map(|article| RawSignal {
                id: Uuid::new_v4(),
                source_category: SourceCategory::News,
                source_name: "gdelt".to_string(),
                payload: SignalPayload {
                    text: format!("{} {}", article.title, article.themes),
                    raw_score: Some(article.tone),
                    label: None,
                    confidence: None,
                },
                timestamp: Some(now),
                // Mentions are mined from the title/themes text downstream;
                // GDELT does not pre-extract tickers.
                raw_entities: vec![],
            })
            .collect())
    }
}

/// Mock professional-news collector: synthesizes toned headlines over the
/// watchlist the way the live wires read on an average day.
pub struct MockNewsCollector {
    source: String,
    tickers: Vec<String>,
    articles: usize,
    seed: u64,
}

const BULLISH_HEADLINES: [&str; 5] = [
    "{ticker} rallies as guidance tops expectations",
    "Analysts raise {ticker} price targets after strong quarter",
    "{ticker} gains on upbeat demand outlook",
    "Institutional buyers step into {ticker} ahead of earnings",
    "{ticker} breaks out to new highs on heavy volume",
];

const BEARISH_HEADLINES: [&str; 5] = [
    "{ticker} slides on margin pressure warning",
    "Downgrades pile up for {ticker} as growth slows",
    "{ticker} falls after soft guidance",
    "Profit taking hits {ticker} following weak data",
    "{ticker} under pressure as costs climb",
];

const NEUTRAL_HEADLINES: [&str; 3] = [
    "{ticker} little changed ahead of results",
    "Mixed session for {ticker} as traders await catalysts",
    "{ticker} consolidates after recent move",
];

impl MockNewsCollector {
    pub fn new(source: impl Into<String>, tickers: Vec<String>, articles: usize, seed: u64) -> Self {
        Self {
            source: source.into(),
            tickers,
            articles,
            seed,
        }
    }
}

#[async_trait]
impl SignalCollector for MockNewsCollector {
    fn name(&self) -> &str {
        &self.source
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::News
    }

    async fn collect(&self) -> Result<Vec<RawSignal>> {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let now = Utc::now();
        let mut signals = Vec::with_capacity(self.articles);

        for _ in 0..self.articles {
            if self.tickers.is_empty() {
                break;
            }
            let ticker = &self.tickers[rng.usize(..self.tickers.len())];

            // Roughly balanced tape with a mild bullish tilt, tone drawn
            // from the bucket's band.
            let roll = rng.f64();
            let (template, tone) = if roll < 0.45 {
                (
                    BULLISH_HEADLINES[rng.usize(..BULLISH_HEADLINES.len())],
                    20.0 + rng.f64() * 60.0,
                )
            } else if roll < 0.80 {
                (
                    BEARISH_HEADLINES[rng.usize(..BEARISH_HEADLINES.len())],
                    -(20.0 + rng.f64() * 60.0),
                )
            } else {
                (
                    NEUTRAL_HEADLINES[rng.usize(..NEUTRAL_HEADLINES.len())],
                    -5.0 + rng.f64() * 10.0,
                )
            };

            signals.push(RawSignal {
                id: Uuid::new_v4(),
                source_category: SourceCategory::News,
                source_name: self.source.clone(),
                payload: SignalPayload {
                    text: template.replace("{ticker}", ticker),
                    raw_score: Some(tone),
                    label: None,
                    confidence: None,
                },
                timestamp: Some(now - Duration::minutes(rng.i64(0..720))),
                raw_entities: vec![ticker.clone()],
            });
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers() -> Vec<String> {
        ["AAPL", "MSFT", "TSLA"].iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_news_emits_requested_count() {
        let collector = MockNewsCollector::new("cnbc", tickers(), 12, 7);
        let signals = collector.collect().await.unwrap();
        assert_eq!(signals.len(), 12);
        for signal in &signals {
            assert_eq!(signal.source_category, SourceCategory::News);
            assert!(signal.timestamp.is_some());
            assert!(signal.payload.raw_score.is_some());
            assert!(!signal.raw_entities.is_empty());
        }
    }

    #[tokio::test]
    async fn test_mock_news_is_seed_deterministic() {
        let a = MockNewsCollector::new("cnbc", tickers(), 8, 42)
            .collect()
            .await
            .unwrap();
        let b = MockNewsCollector::new("cnbc", tickers(), 8, 42)
            .collect()
            .await
            .unwrap();
        let scores_a: Vec<f64> = a.iter().filter_map(|s| s.payload.raw_score).collect();
        let scores_b: Vec<f64> = b.iter().filter_map(|s| s.payload.raw_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[tokio::test]
    async fn test_mock_news_tone_stays_on_native_scale() {
        let signals = MockNewsCollector::new("wsj", tickers(), 50, 3)
            .collect()
            .await
            .unwrap();
        for signal in signals {
            let tone = signal.payload.raw_score.unwrap();
            assert!((-100.0..=100.0).contains(&tone));
        }
    }
}
