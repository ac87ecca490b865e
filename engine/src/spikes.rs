//! Volume and open-interest spike detection.
//!
//! Structurally parallel to the divergence detector but over numeric time
//! series: the latest observation is compared against a trailing baseline
//! (mean of the preceding window). A missing or zero baseline fails
//! closed: no flag, no error. A first observation is an expected edge
//! case, not a fault.

use statrs::statistics::Statistics;
use tracing::debug;

use common::{ContractMetric, ContractSeries, SpikeFlag};

pub struct SpikeDetector {
    volume_spike_threshold: f64,
    oi_change_threshold: f64,
    baseline_window: usize,
}

impl SpikeDetector {
    pub fn new(
        volume_spike_threshold: f64,
        oi_change_threshold: f64,
        baseline_window: usize,
    ) -> Self {
        Self {
            volume_spike_threshold,
            oi_change_threshold,
            baseline_window,
        }
    }

    pub fn detect(&self, series: &[ContractSeries]) -> Vec<SpikeFlag> {
        let mut flags = Vec::new();
        for s in series {
            if let Some(flag) = self.check_series(s) {
                flags.push(flag);
            }
        }
        flags
    }

    fn check_series(&self, series: &ContractSeries) -> Option<SpikeFlag> {
        let current = series.points.last()?;
        let history = &series.points[..series.points.len() - 1];
        if history.is_empty() {
            return None;
        }

        let start = history.len().saturating_sub(self.baseline_window);
        let window = &history[start..];
        let baseline = window.iter().map(|p| p.value).mean();
        if !baseline.is_finite() || baseline <= 0.0 {
            debug!(
                contract = %series.contract,
                metric = %series.metric,
                "no usable baseline, skipping"
            );
            return None;
        }

        let ratio = current.value / baseline;
        let spiking = match series.metric {
            ContractMetric::Volume => ratio >= self.volume_spike_threshold,
            ContractMetric::OpenInterest => (ratio - 1.0).abs() >= self.oi_change_threshold,
        };
        if !spiking {
            return None;
        }

        debug!(
            contract = %series.contract,
            metric = %series.metric,
            ratio,
            baseline,
            "spike flagged"
        );

        Some(SpikeFlag {
            contract: series.contract.clone(),
            metric: series.metric,
            date: current.date,
            current_value: current.value,
            baseline_value: baseline,
            ratio,
            period: window.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::SeriesPoint;

    fn make_series(contract: &str, metric: ContractMetric, values: &[f64]) -> ContractSeries {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        ContractSeries {
            contract: contract.to_string(),
            metric,
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| SeriesPoint {
                    date: start + chrono::Days::new(i as u64),
                    value: *v,
                })
                .collect(),
        }
    }

    fn detector() -> SpikeDetector {
        SpikeDetector::new(1.5, 0.10, 10)
    }

    #[test]
    fn test_volume_spike_at_threshold() {
        // baseline 100, current 150: ratio exactly 1.5 flags.
        let series = make_series("ES", ContractMetric::Volume, &[100.0, 100.0, 100.0, 150.0]);
        let flags = detector().detect(&[series]);
        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.contract, "ES");
        assert_eq!(flag.ratio, 1.5);
        assert_eq!(flag.baseline_value, 100.0);
        assert_eq!(flag.period, 3);
    }

    #[test]
    fn test_volume_below_threshold_no_flag() {
        let series = make_series("ES", ContractMetric::Volume, &[100.0, 100.0, 100.0, 140.0]);
        assert!(detector().detect(&[series]).is_empty());
    }

    #[test]
    fn test_oi_change_both_directions() {
        let build = make_series("NQ", ContractMetric::OpenInterest, &[1000.0, 1000.0, 1120.0]);
        let unwind = make_series("NQ", ContractMetric::OpenInterest, &[1000.0, 1000.0, 880.0]);
        let steady = make_series("NQ", ContractMetric::OpenInterest, &[1000.0, 1000.0, 1050.0]);

        assert_eq!(detector().detect(&[build]).len(), 1);
        assert_eq!(detector().detect(&[unwind]).len(), 1);
        assert!(detector().detect(&[steady]).is_empty());
    }

    #[test]
    fn test_first_observation_fails_closed() {
        let series = make_series("ES", ContractMetric::Volume, &[5_000_000.0]);
        assert!(detector().detect(&[series]).is_empty());
    }

    #[test]
    fn test_zero_baseline_fails_closed() {
        let series = make_series("YM", ContractMetric::Volume, &[0.0, 0.0, 900.0]);
        assert!(detector().detect(&[series]).is_empty());
    }

    #[test]
    fn test_empty_series_fails_closed() {
        let series = make_series("ES", ContractMetric::Volume, &[]);
        assert!(detector().detect(&[series]).is_empty());
    }

    #[test]
    fn test_baseline_excludes_current_and_respects_window() {
        // 12 quiet days then a burst; only the last `baseline_window`
        // observations before the burst feed the baseline.
        let mut values = vec![50.0, 50.0];
        values.extend(std::iter::repeat(100.0).take(10));
        values.push(200.0);
        let series = make_series("ES", ContractMetric::Volume, &values);
        let flags = detector().detect(&[series]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].baseline_value, 100.0);
        assert_eq!(flags[0].ratio, 2.0);
        assert_eq!(flags[0].period, 10);
    }
}
