//! Engine configuration.
//!
//! Loaded once at startup, validated before any signal processing, then
//! passed by reference and never mutated. A malformed or missing threshold
//! is fatal: a partial report beats no report, but a silently wrong report
//! beats neither.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use common::{SignalError, SourceCategory};

/// Mapping from one source category's raw scorer output onto the canonical
/// [-1, 1] scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationRule {
    /// Lower bound of the source's native numeric scale.
    pub raw_min: f64,
    /// Upper bound of the source's native numeric scale.
    pub raw_max: f64,
    /// Categorical labels the source may emit instead of a number, already
    /// on the canonical scale. Matched case-insensitively.
    #[serde(default)]
    pub labels: BTreeMap<String, f64>,
}

impl NormalizationRule {
    fn with_range(raw_min: f64, raw_max: f64) -> Self {
        Self {
            raw_min,
            raw_max,
            labels: default_labels(),
        }
    }
}

fn default_labels() -> BTreeMap<String, f64> {
    let mut labels = BTreeMap::new();
    labels.insert("bullish".to_string(), 0.6);
    labels.insert("bearish".to_string(), -0.6);
    labels.insert("neutral".to_string(), 0.0);
    labels
}

/// Per-category normalization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    pub news: NormalizationRule,
    pub social: NormalizationRule,
    #[serde(rename = "macro")]
    pub macro_rule: NormalizationRule,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            // Professional news tone arrives on the GDELT-style [-100, 100]
            // scale; social and macro sources are already unit-scaled.
            news: NormalizationRule::with_range(-100.0, 100.0),
            social: NormalizationRule::with_range(-1.0, 1.0),
            macro_rule: NormalizationRule::with_range(-1.0, 1.0),
        }
    }
}

impl NormalizationConfig {
    pub fn rule(&self, category: SourceCategory) -> &NormalizationRule {
        match category {
            SourceCategory::News => &self.news,
            SourceCategory::Social => &self.social,
            SourceCategory::Macro => &self.macro_rule,
        }
    }
}

/// Alias tables for entity resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    pub stocks: Vec<String>,
    pub indices: Vec<String>,
    pub sectors: Vec<String>,
    pub crypto: Vec<String>,
    pub macro_themes: Vec<String>,
    /// Free-form alias -> canonical id ("Tesla Motors" -> "TSLA").
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Default for Watchlist {
    fn default() -> Self {
        let stocks = ["AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA"];
        let indices = ["SPY", "QQQ", "IWM", "DIA"];
        let sectors = ["Technology", "Finance", "Energy", "Healthcare", "Consumer"];
        let crypto = ["BTC", "ETH", "SOL", "XRP", "ADA", "DOGE", "AVAX"];
        let macro_themes = [
            "inflation",
            "recession",
            "fed",
            "rate hike",
            "rate cut",
            "unemployment",
            "gdp",
        ];

        let mut aliases = HashMap::new();
        for (alias, id) in [
            ("Apple", "AAPL"),
            ("Microsoft", "MSFT"),
            ("Alphabet", "GOOGL"),
            ("Google", "GOOGL"),
            ("Amazon", "AMZN"),
            ("Meta Platforms", "META"),
            ("Facebook", "META"),
            ("Tesla", "TSLA"),
            ("Tesla Motors", "TSLA"),
            ("Nvidia", "NVDA"),
            ("bitcoin", "BTC"),
            ("ethereum", "ETH"),
            ("solana", "SOL"),
            ("ripple", "XRP"),
            ("cardano", "ADA"),
            ("dogecoin", "DOGE"),
            ("avalanche", "AVAX"),
            ("federal reserve", "fed"),
            ("tech sector", "Technology"),
        ] {
            aliases.insert(alias.to_string(), id.to_string());
        }

        Self {
            stocks: stocks.iter().map(|s| s.to_string()).collect(),
            indices: indices.iter().map(|s| s.to_string()).collect(),
            sectors: sectors.iter().map(|s| s.to_string()).collect(),
            crypto: crypto.iter().map(|s| s.to_string()).collect(),
            macro_themes: macro_themes.iter().map(|s| s.to_string()).collect(),
            aliases,
        }
    }
}

/// Indicator bands feeding the macro rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorBands {
    #[serde(default = "default_vix_low")]
    pub vix_low: f64,
    #[serde(default = "default_vix_high")]
    pub vix_high: f64,
    /// 10y-2y spread below this is treated as inverted.
    #[serde(default = "default_curve_inversion")]
    pub curve_inversion: f64,
    #[serde(default = "default_inflation_low")]
    pub inflation_low: f64,
    #[serde(default = "default_inflation_high")]
    pub inflation_high: f64,
}

impl Default for IndicatorBands {
    fn default() -> Self {
        Self {
            vix_low: default_vix_low(),
            vix_high: default_vix_high(),
            curve_inversion: default_curve_inversion(),
            inflation_low: default_inflation_low(),
            inflation_high: default_inflation_high(),
        }
    }
}

fn default_vix_low() -> f64 {
    15.0
}

fn default_vix_high() -> f64 {
    25.0
}

fn default_curve_inversion() -> f64 {
    -0.1
}

fn default_inflation_low() -> f64 {
    1.0
}

fn default_inflation_high() -> f64 {
    3.0
}

/// Everything the aggregation engine reads. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Signals older than this (relative to the run instant) are excluded
    /// before grouping. Hard filter, not a decay weight.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,

    /// Minimum |composite_a - composite_b| to flag a divergence.
    #[serde(default = "default_divergence_threshold")]
    pub divergence_threshold: f64,

    /// Both composites must clear this magnitude for a divergence to count
    /// as contradicting rather than near-zero noise.
    #[serde(default = "default_significance_floor")]
    pub significance_floor: f64,

    /// Overall composite at or above this ranks bullish.
    #[serde(default = "default_bullish_threshold")]
    pub bullish_threshold: f64,

    /// Overall composite at or below this ranks bearish.
    #[serde(default = "default_bearish_threshold")]
    pub bearish_threshold: f64,

    /// current/baseline volume ratio at or above this flags a spike.
    #[serde(default = "default_volume_spike_threshold")]
    pub volume_spike_threshold: f64,

    /// |current/baseline - 1| open-interest change at or above this
    /// fraction flags a positioning shift.
    #[serde(default = "default_oi_change_threshold")]
    pub oi_change_threshold: f64,

    /// Trailing observations (excluding the latest) behind the spike
    /// baseline.
    #[serde(default = "default_baseline_window")]
    pub baseline_window: usize,

    #[serde(default)]
    pub normalization: NormalizationConfig,

    #[serde(default)]
    pub watchlist: Watchlist,

    #[serde(default)]
    pub bands: IndicatorBands,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            divergence_threshold: default_divergence_threshold(),
            significance_floor: default_significance_floor(),
            bullish_threshold: default_bullish_threshold(),
            bearish_threshold: default_bearish_threshold(),
            volume_spike_threshold: default_volume_spike_threshold(),
            oi_change_threshold: default_oi_change_threshold(),
            baseline_window: default_baseline_window(),
            normalization: NormalizationConfig::default(),
            watchlist: Watchlist::default(),
            bands: IndicatorBands::default(),
        }
    }
}

fn default_lookback_hours() -> i64 {
    24
}

fn default_divergence_threshold() -> f64 {
    0.4
}

fn default_significance_floor() -> f64 {
    0.15
}

fn default_bullish_threshold() -> f64 {
    0.2
}

fn default_bearish_threshold() -> f64 {
    -0.2
}

fn default_volume_spike_threshold() -> f64 {
    1.5
}

fn default_oi_change_threshold() -> f64 {
    0.10
}

fn default_baseline_window() -> usize {
    10
}

impl EngineConfig {
    /// Fail-fast validation, run before any signal processing.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.lookback_hours <= 0 {
            return Err(SignalError::invalid_config("lookback_hours must be positive"));
        }
        if !self.divergence_threshold.is_finite() || self.divergence_threshold <= 0.0 {
            return Err(SignalError::invalid_config(
                "divergence_threshold must be a positive finite number",
            ));
        }
        if !self.significance_floor.is_finite() || self.significance_floor < 0.0 {
            return Err(SignalError::invalid_config(
                "significance_floor must be a non-negative finite number",
            ));
        }
        if !self.bullish_threshold.is_finite() || !self.bearish_threshold.is_finite() {
            return Err(SignalError::invalid_config(
                "ranking thresholds must be finite",
            ));
        }
        if self.bearish_threshold >= self.bullish_threshold {
            return Err(SignalError::invalid_config(
                "bearish_threshold must be below bullish_threshold",
            ));
        }
        if !self.volume_spike_threshold.is_finite() || self.volume_spike_threshold <= 0.0 {
            return Err(SignalError::invalid_config(
                "volume_spike_threshold must be a positive finite number",
            ));
        }
        if !self.oi_change_threshold.is_finite() || self.oi_change_threshold <= 0.0 {
            return Err(SignalError::invalid_config(
                "oi_change_threshold must be a positive finite number",
            ));
        }
        if self.baseline_window == 0 {
            return Err(SignalError::invalid_config("baseline_window must be at least 1"));
        }
        for category in SourceCategory::ALL {
            let rule = self.normalization.rule(category);
            if !rule.raw_min.is_finite() || !rule.raw_max.is_finite() || rule.raw_max <= rule.raw_min
            {
                return Err(SignalError::invalid_config(format!(
                    "normalization range for {} is degenerate ({} .. {})",
                    category, rule.raw_min, rule.raw_max
                )));
            }
            for (label, score) in &rule.labels {
                if !score.is_finite() || score.abs() > 1.0 {
                    return Err(SignalError::invalid_config(format!(
                        "label {:?} for {} maps outside [-1, 1]",
                        label, category
                    )));
                }
            }
        }
        if self.bands.vix_low >= self.bands.vix_high {
            return Err(SignalError::invalid_config("vix_low must be below vix_high"));
        }
        if self.bands.inflation_low >= self.bands.inflation_high {
            return Err(SignalError::invalid_config(
                "inflation_low must be below inflation_high",
            ));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &str) -> anyhow::Result<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a TOML file.
pub fn save_config(config: &EngineConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a default configuration file template.
pub fn create_config_template(path: &str) -> anyhow::Result<()> {
    let template = "# Aggregation Engine Configuration
# Thresholds and tables read by the daily brief engine

# Signals older than this many hours are excluded before grouping
lookback_hours = 24

# Minimum |composite_a - composite_b| to flag a divergence
divergence_threshold = 0.4

# Both composites must clear this magnitude for a divergence to count
# as contradicting rather than near-zero noise
significance_floor = 0.15

# Overall composite at or above this ranks bullish
bullish_threshold = 0.2

# Overall composite at or below this ranks bearish
bearish_threshold = -0.2

# current/baseline volume ratio at or above this flags a spike
volume_spike_threshold = 1.5

# Fractional open-interest change against baseline that flags a
# positioning shift (0.10 = 10%)
oi_change_threshold = 0.10

# Trailing sessions (excluding the latest) behind the spike baseline
baseline_window = 10

# Raw scorer scale per source category; labels map categorical calls
# straight onto the canonical [-1, 1] scale
[normalization.news]
raw_min = -100.0
raw_max = 100.0

[normalization.news.labels]
bullish = 0.6
bearish = -0.6
neutral = 0.0

[normalization.social]
raw_min = -1.0
raw_max = 1.0

[normalization.social.labels]
bullish = 0.6
bearish = -0.6
neutral = 0.0

[normalization.macro]
raw_min = -1.0
raw_max = 1.0

[normalization.macro.labels]
bullish = 0.6
bearish = -0.6
neutral = 0.0

[watchlist]
stocks = [\"AAPL\", \"MSFT\", \"GOOGL\", \"AMZN\", \"META\", \"TSLA\", \"NVDA\"]
indices = [\"SPY\", \"QQQ\", \"IWM\", \"DIA\"]
sectors = [\"Technology\", \"Finance\", \"Energy\", \"Healthcare\", \"Consumer\"]
crypto = [\"BTC\", \"ETH\", \"SOL\", \"XRP\", \"ADA\", \"DOGE\", \"AVAX\"]
macro_themes = [\"inflation\", \"recession\", \"fed\", \"rate hike\", \"rate cut\", \"unemployment\", \"gdp\"]

# Free-form alias -> canonical id
[watchlist.aliases]
\"Apple\" = \"AAPL\"
\"Tesla Motors\" = \"TSLA\"
\"bitcoin\" = \"BTC\"
\"federal reserve\" = \"fed\"

# Indicator bands feeding the macro rule table
[bands]
vix_low = 15.0
vix_high = 25.0

# 10y-2y spread below this is treated as inverted
curve_inversion = -0.1

inflation_low = 1.0
inflation_high = 3.0
";

    std::fs::write(path, template)?;
    Ok(())
}
