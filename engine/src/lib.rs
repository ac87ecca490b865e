//! Cross-source sentiment aggregation and divergence detection.
//!
//! The engine consumes a fixed snapshot of raw signals, macro indicator
//! readings and futures series for one batch run and produces a ranked,
//! explainable `Synthesis`. Data flows strictly one direction:
//! raw signals -> normalized signals -> per-entity composites ->
//! divergence/spike flags -> ranked synthesis.

pub mod aggregate;
pub mod config;
pub mod divergence;
pub mod entities;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod rules;
pub mod spikes;

pub use aggregate::{AggregationResult, Aggregator};
pub use config::{
    create_config_template, load_config, save_config, EngineConfig, IndicatorBands,
    NormalizationConfig, NormalizationRule, Watchlist,
};
pub use divergence::DivergenceDetector;
pub use entities::EntityRegistry;
pub use normalize::Normalizer;
pub use pipeline::{Engine, RunInput};
pub use rank::Ranker;
pub use rules::{suggest_bias, MacroRule, MacroRuleTable, RuleCondition};
pub use spikes::SpikeDetector;
