//! Daily brief rendering.
//!
//! A thin consumer of the synthesis snapshot: section-by-section string
//! building into Markdown or HTML, capped table rows, no scoring logic of
//! any kind. Delivery (email or otherwise) stays outside this crate.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use common::{DivergenceDirection, RankedEntry, Synthesis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Markdown,
    Html,
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Markdown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default = "default_max_entries")]
    pub max_entries_per_section: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            max_entries_per_section: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    5
}

pub fn render(synthesis: &Synthesis, config: &ReportConfig) -> String {
    match config.format {
        ReportFormat::Markdown => render_markdown(synthesis, config),
        ReportFormat::Html => render_html(synthesis, config),
    }
}

pub fn render_markdown(synthesis: &Synthesis, config: &ReportConfig) -> String {
    let mut out = String::new();
    let date = synthesis.run_at.format("%Y-%m-%d");
    let _ = writeln!(out, "# Daily Market Brief - {}\n", date);

    // Macro outlook
    let assessment = &synthesis.macro_assessment;
    let _ = writeln!(out, "## Macro Outlook\n");
    let _ = writeln!(
        out,
        "Rating: **{}** (rule: `{}`)",
        assessment.rating, assessment.rule
    );
    let bias = &synthesis.futures_bias;
    let _ = writeln!(
        out,
        "ES bias: **{:?}** ({:?} confidence) - {}\n",
        bias.direction,
        bias.confidence,
        bias.rationale.join("; ")
    );
    if !assessment.indicators.is_empty() {
        let _ = writeln!(out, "| Indicator | Value |");
        let _ = writeln!(out, "|---|---|");
        for reading in assessment.indicators.iter() {
            let _ = writeln!(out, "| {} | {:.2} |", reading.name, reading.value);
        }
        let _ = writeln!(out);
    }

    // Ranked lists
    render_ranked_md(&mut out, "Top Bullish", &synthesis.bullish, config);
    render_ranked_md(&mut out, "Top Bearish", &synthesis.bearish, config);

    // Divergences
    let _ = writeln!(out, "## Sentiment Divergences\n");
    if synthesis.divergences.is_empty() {
        let _ = writeln!(out, "No significant divergences today.\n");
    } else {
        for flag in &synthesis.divergences {
            let marker = match flag.direction {
                DivergenceDirection::Contradicting => "contradicting",
                DivergenceDirection::Confirming => "confirming",
            };
            let _ = writeln!(
                out,
                "- **{}**: {} {:+.2} vs {} {:+.2} (gap {:.2}, {})",
                flag.entity_id,
                flag.category_a,
                flag.score_a,
                flag.category_b,
                flag.score_b,
                flag.magnitude,
                marker
            );
        }
        let _ = writeln!(out);
    }

    // Institutional activity
    let _ = writeln!(out, "## Institutional Activity\n");
    if synthesis.spike_alerts.is_empty() {
        let _ = writeln!(out, "No volume or open-interest anomalies.\n");
    } else {
        for spike in &synthesis.spike_alerts {
            let _ = writeln!(
                out,
                "- {} {} on {}: {:.0} vs {:.0} baseline ({:.1}x over {} sessions)",
                spike.contract,
                spike.metric,
                spike.date,
                spike.current_value,
                spike.baseline_value,
                spike.ratio,
                spike.period
            );
        }
        let _ = writeln!(out);
    }

    // Coverage
    let coverage = &synthesis.coverage;
    let _ = writeln!(out, "## Run Coverage\n");
    let _ = writeln!(
        out,
        "{} signals from {} sources; dropped {} malformed, {} unscored, {} stale; {} unresolved mentions.",
        coverage.signals_ingested,
        coverage.sources_polled,
        coverage.dropped_malformed,
        coverage.dropped_unscored,
        coverage.dropped_stale,
        coverage.unresolved_mentions
    );
    if !coverage.sources_unavailable.is_empty() {
        let _ = writeln!(
            out,
            "\nUnavailable sources: {}.",
            coverage.sources_unavailable.join(", ")
        );
    }

    out
}

fn render_ranked_md(out: &mut String, title: &str, entries: &[RankedEntry], config: &ReportConfig) {
    let _ = writeln!(out, "## {}\n", title);
    if entries.is_empty() {
        let _ = writeln!(out, "Nothing cleared the threshold.\n");
        return;
    }
    let _ = writeln!(out, "| Symbol | Composite | Signals | Flags |");
    let _ = writeln!(out, "|---|---|---|---|");
    for entry in entries.iter().take(config.max_entries_per_section) {
        let _ = writeln!(
            out,
            "| **{}** | {:+.2} | {} | {} |",
            entry.entity_id,
            entry.composite_sentiment,
            entry.supporting_signal_count,
            entry.divergences.len()
        );
    }
    let _ = writeln!(out);
}

pub fn render_html(synthesis: &Synthesis, config: &ReportConfig) -> String {
    let mut out = String::new();
    let date = synthesis.run_at.format("%Y-%m-%d");
    let _ = writeln!(out, "<html><head><title>Daily Market Brief - {}</title></head><body>", date);
    let _ = writeln!(out, "<h1>Daily Market Brief - {}</h1>", date);

    let assessment = &synthesis.macro_assessment;
    let _ = writeln!(out, "<h2>Macro Outlook</h2>");
    let _ = writeln!(
        out,
        "<p>Rating: <b>{}</b> (rule: {})</p>",
        assessment.rating, assessment.rule
    );
    let bias = &synthesis.futures_bias;
    let _ = writeln!(
        out,
        "<p>ES bias: <b>{:?}</b> ({:?} confidence) - {}</p>",
        bias.direction,
        bias.confidence,
        bias.rationale.join("; ")
    );

    render_ranked_html(&mut out, "Top Bullish", &synthesis.bullish, config);
    render_ranked_html(&mut out, "Top Bearish", &synthesis.bearish, config);

    let _ = writeln!(out, "<h2>Sentiment Divergences</h2>");
    if synthesis.divergences.is_empty() {
        let _ = writeln!(out, "<p>No significant divergences today.</p>");
    } else {
        let _ = writeln!(out, "<ul>");
        for flag in &synthesis.divergences {
            let _ = writeln!(
                out,
                "<li><b>{}</b>: {} {:+.2} vs {} {:+.2} (gap {:.2}, {:?})</li>",
                flag.entity_id,
                flag.category_a,
                flag.score_a,
                flag.category_b,
                flag.score_b,
                flag.magnitude,
                flag.direction
            );
        }
        let _ = writeln!(out, "</ul>");
    }

    let _ = writeln!(out, "<h2>Institutional Activity</h2>");
    if synthesis.spike_alerts.is_empty() {
        let _ = writeln!(out, "<p>No volume or open-interest anomalies.</p>");
    } else {
        let _ = writeln!(out, "<ul>");
        for spike in &synthesis.spike_alerts {
            let _ = writeln!(
                out,
                "<li>{} {} on {}: {:.0} vs {:.0} baseline ({:.1}x)</li>",
                spike.contract,
                spike.metric,
                spike.date,
                spike.current_value,
                spike.baseline_value,
                spike.ratio
            );
        }
        let _ = writeln!(out, "</ul>");
    }

    let coverage = &synthesis.coverage;
    let _ = writeln!(out, "<h2>Run Coverage</h2>");
    let _ = writeln!(
        out,
        "<p>{} signals from {} sources; dropped {} malformed, {} unscored, {} stale; {} unresolved mentions.</p>",
        coverage.signals_ingested,
        coverage.sources_polled,
        coverage.dropped_malformed,
        coverage.dropped_unscored,
        coverage.dropped_stale,
        coverage.unresolved_mentions
    );
    if !coverage.sources_unavailable.is_empty() {
        let _ = writeln!(
            out,
            "<p>Unavailable sources: {}.</p>",
            coverage.sources_unavailable.join(", ")
        );
    }

    let _ = writeln!(out, "</body></html>");
    out
}

fn render_ranked_html(
    out: &mut String,
    title: &str,
    entries: &[RankedEntry],
    config: &ReportConfig,
) {
    let _ = writeln!(out, "<h2>{}</h2>", title);
    if entries.is_empty() {
        let _ = writeln!(out, "<p>Nothing cleared the threshold.</p>");
        return;
    }
    let _ = writeln!(out, "<table border='1' cellpadding='5' cellspacing='0'>");
    let _ = writeln!(
        out,
        "<tr><th>Symbol</th><th>Composite</th><th>Signals</th><th>Flags</th></tr>"
    );
    for entry in entries.iter().take(config.max_entries_per_section) {
        let _ = writeln!(
            out,
            "<tr><td><b>{}</b></td><td>{:+.2}</td><td>{}</td><td>{}</td></tr>",
            entry.entity_id,
            entry.composite_sentiment,
            entry.supporting_signal_count,
            entry.divergences.len()
        );
    }
    let _ = writeln!(out, "</table>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        BiasConfidence, BiasDirection, FuturesBias, IndicatorSnapshot, MacroAssessment,
        MacroRating, RunCoverage,
    };

    fn make_synthesis() -> Synthesis {
        Synthesis {
            run_at: "2025-04-10T16:00:00Z".parse().unwrap(),
            bullish: vec![RankedEntry {
                entity_id: "AAPL".to_string(),
                composite_sentiment: 0.62,
                supporting_signal_count: 7,
                rationale: vec![],
                divergences: vec![],
            }],
            bearish: vec![],
            macro_assessment: MacroAssessment {
                rating: MacroRating::RiskOff,
                rule: "vix-elevated".to_string(),
                indicators: IndicatorSnapshot::new(),
            },
            futures_bias: FuturesBias {
                direction: BiasDirection::Short,
                confidence: BiasConfidence::High,
                rationale: vec!["macro environment is risk-off".to_string()],
            },
            divergences: vec![],
            spike_alerts: vec![],
            coverage: RunCoverage {
                sources_polled: 4,
                sources_unavailable: vec!["bloomberg".to_string()],
                signals_ingested: 120,
                ..RunCoverage::default()
            },
        }
    }

    #[test]
    fn test_markdown_sections() {
        let report = render_markdown(&make_synthesis(), &ReportConfig::default());
        assert!(report.contains("# Daily Market Brief - 2025-04-10"));
        assert!(report.contains("risk-off"));
        assert!(report.contains("**AAPL**"));
        assert!(report.contains("Nothing cleared the threshold."));
        assert!(report.contains("Unavailable sources: bloomberg."));
    }

    #[test]
    fn test_html_sections() {
        let config = ReportConfig {
            format: ReportFormat::Html,
            ..ReportConfig::default()
        };
        let report = render(&make_synthesis(), &config);
        assert!(report.starts_with("<html>"));
        assert!(report.contains("<h2>Top Bullish</h2>"));
        assert!(report.contains("<td><b>AAPL</b></td>"));
    }

    #[test]
    fn test_section_cap() {
        let mut synthesis = make_synthesis();
        synthesis.bullish = (0..10)
            .map(|i| RankedEntry {
                entity_id: format!("T{:02}", i),
                composite_sentiment: 0.5,
                supporting_signal_count: 2,
                rationale: vec![],
                divergences: vec![],
            })
            .collect();
        let config = ReportConfig {
            max_entries_per_section: 3,
            ..ReportConfig::default()
        };
        let report = render_markdown(&synthesis, &config);
        assert!(report.contains("T02"));
        assert!(!report.contains("T03"));
    }
}
