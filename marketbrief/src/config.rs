//! Application configuration: composition concerns only. Everything the
//! aggregation algorithms read lives in `engine::EngineConfig`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use engine::EngineConfig;
use report::ReportConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mock and live sources are two implementations of the same collector
    /// traits; this flag picks the set at composition time.
    #[serde(default = "default_use_mock_data")]
    pub use_mock_data: bool,

    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Per-source fetch timeout. A slow source degrades, never blocks.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_max_articles")]
    pub max_articles_per_source: usize,

    #[serde(default = "default_posts_per_community")]
    pub posts_per_community: usize,

    #[serde(default = "default_contracts")]
    pub contracts: Vec<String>,

    #[serde(default = "default_mock_seed")]
    pub mock_seed: u64,

    /// Have the mock futures feed print an institutional burst on the
    /// latest session so spike alerts exercise end to end.
    #[serde(default = "default_simulate_event_spike")]
    pub simulate_event_spike: bool,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_mock_data: default_use_mock_data(),
            reports_dir: default_reports_dir(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_articles_per_source: default_max_articles(),
            posts_per_community: default_posts_per_community(),
            contracts: default_contracts(),
            mock_seed: default_mock_seed(),
            simulate_event_spike: default_simulate_event_spike(),
            engine: EngineConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

fn default_use_mock_data() -> bool {
    true
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_articles() -> usize {
    10
}

fn default_posts_per_community() -> usize {
    30
}

fn default_contracts() -> Vec<String> {
    ["ES", "NQ", "YM"].iter().map(|s| s.to_string()).collect()
}

fn default_mock_seed() -> u64 {
    7
}

fn default_simulate_event_spike() -> bool {
    true
}

/// Load the app config. A missing file falls back to defaults; a present
/// but malformed file is fatal.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) if std::path::Path::new(path).exists() => {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        }
        Some(path) => {
            warn!(path, "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        None => Ok(AppConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.use_mock_data);
        assert_eq!(config.contracts, vec!["ES", "NQ", "YM"]);
        assert!(config.engine.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            use_mock_data = false

            [engine]
            divergence_threshold = 0.5
            "#,
        )
        .unwrap();
        assert!(!config.use_mock_data);
        assert_eq!(config.engine.divergence_threshold, 0.5);
        assert_eq!(config.fetch_timeout_secs, 30);
    }
}
