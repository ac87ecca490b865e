//! The aggregation engine.
//!
//! One invocation consumes a fixed, immutable snapshot of raw signals,
//! indicator readings and futures series, and produces one `Synthesis`.
//! Every per-signal failure is absorbed here and reported as coverage
//! metadata; only configuration errors are fatal, and those are rejected
//! in `Engine::new` before any signal is touched.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use common::{
    ContractSeries, IndicatorSnapshot, NormalizedSignal, RawSignal, RunCoverage, SignalError,
    Synthesis,
};

use crate::aggregate::Aggregator;
use crate::config::EngineConfig;
use crate::divergence::DivergenceDetector;
use crate::entities::EntityRegistry;
use crate::normalize::Normalizer;
use crate::rank::Ranker;
use crate::rules::{suggest_bias, MacroRuleTable};
use crate::spikes::SpikeDetector;

/// The bounded snapshot one run operates on. Assembled by the caller after
/// the fetch phase completes; the engine never reaches out itself.
#[derive(Debug, Default)]
pub struct RunInput {
    pub raw_signals: Vec<RawSignal>,
    pub indicators: IndicatorSnapshot,
    pub contract_series: Vec<ContractSeries>,
    pub sources_polled: usize,
    pub sources_unavailable: Vec<String>,
}

pub struct Engine {
    config: EngineConfig,
    rule_table: MacroRuleTable,
}

impl Engine {
    /// Fails fast on invalid configuration, before any signal processing.
    pub fn new(config: EngineConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let rule_table = MacroRuleTable::from_bands(&config.bands);
        Ok(Self { config, rule_table })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full aggregation pass over one input snapshot.
    pub fn run(&self, run_at: DateTime<Utc>, input: RunInput) -> Synthesis {
        let mut coverage = RunCoverage {
            sources_polled: input.sources_polled,
            sources_unavailable: input.sources_unavailable.clone(),
            ..RunCoverage::default()
        };

        // Ingestion boundary: malformed records are dropped, not fatal.
        let total = input.raw_signals.len();
        let sane: Vec<RawSignal> = input
            .raw_signals
            .into_iter()
            .filter(|s| s.timestamp.is_some() && !s.payload.is_empty())
            .collect();
        coverage.dropped_malformed = total - sane.len();
        coverage.signals_ingested = sane.len();

        // Fresh registry per run; entities never persist across runs.
        let mut registry = EntityRegistry::from_watchlist(&self.config.watchlist);
        let normalizer = Normalizer::new(self.config.normalization.clone());

        let mut normalized: Vec<NormalizedSignal> = Vec::new();
        for signal in &sane {
            let timestamp = match signal.timestamp {
                Some(ts) => ts,
                None => continue,
            };
            let (score, weight) = match normalizer.score(signal) {
                Ok(scored) => scored,
                Err(err) => {
                    debug!(%err, "dropping unscored signal");
                    coverage.dropped_unscored += 1;
                    continue;
                }
            };

            let mentions = if signal.raw_entities.is_empty() {
                registry.extract_mentions(&signal.payload.text)
            } else {
                signal.raw_entities.clone()
            };
            let (entity_ids, misses) = registry.resolve_all(&mentions);
            coverage.unresolved_mentions += misses;

            // Fan-out: every resolved entity receives an independent copy.
            for entity_id in entity_ids {
                normalized.push(NormalizedSignal {
                    entity_id,
                    source_category: signal.source_category,
                    source_name: signal.source_name.clone(),
                    sentiment_score: score,
                    confidence_weight: weight,
                    timestamp,
                });
            }
        }

        let aggregator = Aggregator::new(self.config.lookback_hours);
        let aggregation = aggregator.aggregate(run_at, normalized);
        coverage.dropped_stale = aggregation.dropped_stale;

        let divergences = DivergenceDetector::new(
            self.config.divergence_threshold,
            self.config.significance_floor,
        )
        .detect(&aggregation.composites);

        let mut series = input.contract_series;
        series.sort_by(|a, b| {
            a.contract
                .cmp(&b.contract)
                .then_with(|| a.metric.cmp(&b.metric))
        });
        let spike_alerts = SpikeDetector::new(
            self.config.volume_spike_threshold,
            self.config.oi_change_threshold,
            self.config.baseline_window,
        )
        .detect(&series);

        let macro_assessment = self.rule_table.assess(&input.indicators);
        let futures_bias = suggest_bias(&macro_assessment);

        let (bullish, bearish) = Ranker::new(
            self.config.bullish_threshold,
            self.config.bearish_threshold,
        )
        .rank(&aggregation.composites, &aggregation.signals_by_entity, &divergences);

        info!(
            entities = registry.len(),
            composites = aggregation.composites.len(),
            bullish = bullish.len(),
            bearish = bearish.len(),
            divergences = divergences.len(),
            spikes = spike_alerts.len(),
            rating = %macro_assessment.rating,
            "synthesis complete"
        );

        Synthesis {
            run_at,
            bullish,
            bearish,
            macro_assessment,
            futures_bias,
            divergences,
            spike_alerts,
            coverage,
        }
    }
}
