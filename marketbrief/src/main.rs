use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, Level};

use collectors::{
    fetch_indicators, fetch_series, fetch_signals, GdeltNewsCollector, MockFuturesFeed,
    MockIndicatorFeed, MockNewsCollector, MockSocialCollector, SignalCollector,
};
use engine::{Engine, RunInput};
use report::ReportFormat;

mod config;

use config::AppConfig;

const NEWS_SOURCES: [&str; 4] = ["cnbc", "bloomberg", "coindesk", "wsj"];
const COMMUNITIES: [&str; 4] = ["wallstreetbets", "investing", "stocks", "options"];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config_path = std::env::args().nth(1);
    let config = config::load(config_path.as_deref())?;

    // Fail fast on bad thresholds before touching any source.
    let engine = Engine::new(config.engine.clone())?;

    info!(
        mock = config.use_mock_data,
        timeout_secs = config.fetch_timeout_secs,
        "starting marketbrief run"
    );

    let signal_collectors = build_collectors(&config);
    let indicator_feed = MockIndicatorFeed::default();
    let futures_feed = MockFuturesFeed::new(
        config.contracts.clone(),
        30,
        config.mock_seed,
        config.simulate_event_spike,
    );

    // Fetch phase: every source polled concurrently, each under its own
    // timeout. Aggregation only starts once the snapshot is complete.
    let timeout = Duration::from_secs(config.fetch_timeout_secs);
    let (signal_result, indicator_result, series_result) = tokio::join!(
        fetch_signals(&signal_collectors, timeout),
        fetch_indicators(&indicator_feed, timeout),
        fetch_series(&futures_feed, timeout),
    );

    let (mut raw_signals, mut unavailable) = signal_result;
    let (indicators, macro_signals, indicators_unavailable) = indicator_result;
    let (contract_series, series_unavailable) = series_result;

    let sources_polled = signal_collectors.len() + 2;
    raw_signals.extend(macro_signals);
    unavailable.extend(indicators_unavailable);
    unavailable.extend(series_unavailable);

    let run_at = Utc::now();
    let synthesis = engine.run(
        run_at,
        RunInput {
            raw_signals,
            indicators,
            contract_series,
            sources_polled,
            sources_unavailable: unavailable,
        },
    );

    // Emit the rendered brief plus the machine-readable snapshot.
    std::fs::create_dir_all(&config.reports_dir)?;
    let date = run_at.format("%Y-%m-%d");
    let extension = match config.report.format {
        ReportFormat::Markdown => "md",
        ReportFormat::Html => "html",
    };
    let report_path = format!("{}/brief-{}.{}", config.reports_dir, date, extension);
    std::fs::write(&report_path, report::render(&synthesis, &config.report))?;

    let snapshot_path = format!("{}/brief-{}.json", config.reports_dir, date);
    std::fs::write(&snapshot_path, serde_json::to_string_pretty(&synthesis)?)?;

    info!(
        report = %report_path,
        snapshot = %snapshot_path,
        bullish = synthesis.bullish.len(),
        bearish = synthesis.bearish.len(),
        rating = %synthesis.macro_assessment.rating,
        divergences = synthesis.divergences.len(),
        spikes = synthesis.spike_alerts.len(),
        "run complete"
    );
    if !synthesis.coverage.sources_unavailable.is_empty() {
        info!(
            unavailable = synthesis.coverage.sources_unavailable.join(", "),
            "run degraded: some sources contributed nothing"
        );
    }

    Ok(())
}

/// Mock and live collectors implement the same trait; composition happens
/// here and nowhere downstream.
fn build_collectors(config: &AppConfig) -> Vec<Box<dyn SignalCollector>> {
    let watchlist = &config.engine.watchlist;
    let mut tickers = watchlist.stocks.clone();
    tickers.extend(watchlist.indices.iter().cloned());
    tickers.extend(watchlist.crypto.iter().cloned());

    let mut collectors: Vec<Box<dyn SignalCollector>> = Vec::new();

    if config.use_mock_data {
        for (i, source) in NEWS_SOURCES.iter().enumerate() {
            collectors.push(Box::new(MockNewsCollector::new(
                *source,
                tickers.clone(),
                config.max_articles_per_source,
                config.mock_seed + i as u64,
            )));
        }
    } else {
        collectors.push(Box::new(GdeltNewsCollector::new(
            config.engine.lookback_hours,
            250,
        )));
    }

    // Social APIs need per-user credentials; the mock communities stand in
    // for them in both modes.
    for (i, community) in COMMUNITIES.iter().enumerate() {
        collectors.push(Box::new(MockSocialCollector::new(
            *community,
            tickers.clone(),
            config.posts_per_community,
            config.mock_seed + 100 + i as u64,
        )));
    }

    collectors
}
