//! CME futures volume/open-interest feed.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc, Weekday};
use tracing::debug;

use common::{ContractMetric, ContractSeries, SeriesPoint};

use crate::FuturesFeed;

/// Mock futures feed: business-day volume and open-interest series per
/// contract, with an optional institutional burst on the latest session.
pub struct MockFuturesFeed {
    contracts: Vec<String>,
    days: usize,
    seed: u64,
    /// Multiply the latest session's volume by 1.8, the way the tape moves
    /// around FOMC days.
    event_spike: bool,
}

impl MockFuturesFeed {
    pub fn new(contracts: Vec<String>, days: usize, seed: u64, event_spike: bool) -> Self {
        Self {
            contracts,
            days,
            seed,
            event_spike,
        }
    }

    fn base_volume(contract: &str) -> f64 {
        match contract {
            "ES" => 2_000_000.0,
            "NQ" => 1_500_000.0,
            _ => 1_000_000.0,
        }
    }

    fn base_open_interest(contract: &str) -> f64 {
        match contract {
            "ES" => 3_000_000.0,
            "NQ" => 2_000_000.0,
            _ => 1_500_000.0,
        }
    }

    /// Most recent `days` business days, oldest first.
    fn business_days(days: usize) -> Vec<chrono::NaiveDate> {
        let mut dates = Vec::with_capacity(days);
        let mut cursor = Utc::now().date_naive();
        while dates.len() < days {
            if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(cursor);
            }
            cursor = cursor - Duration::days(1);
        }
        dates.reverse();
        dates
    }
}

/// Approximate a standard normal draw (sum of 12 uniforms, centered).
fn noise(rng: &mut fastrand::Rng) -> f64 {
    (0..12).map(|_| rng.f64()).sum::<f64>() - 6.0
}

#[async_trait]
impl FuturesFeed for MockFuturesFeed {
    fn name(&self) -> &str {
        "cme-mock"
    }

    async fn series(&self) -> Result<Vec<ContractSeries>> {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let dates = Self::business_days(self.days);
        let mut all = Vec::with_capacity(self.contracts.len() * 2);

        for contract in &self.contracts {
            let base_volume = Self::base_volume(contract);
            let mut volume_points = Vec::with_capacity(dates.len());
            for (i, date) in dates.iter().enumerate() {
                // Mild drift with daily noise, floored so the series never
                // goes negative.
                let mut value =
                    base_volume * (1.0 + 0.3 * noise(&mut rng) + 0.01 * i as f64);
                value = value.max(base_volume * 0.2);
                if self.event_spike && i == dates.len() - 1 {
                    value *= 1.8;
                }
                volume_points.push(SeriesPoint { date: *date, value });
            }
            all.push(ContractSeries {
                contract: contract.clone(),
                metric: ContractMetric::Volume,
                points: volume_points,
            });

            let base_oi = Self::base_open_interest(contract);
            let mut current = base_oi;
            let mut oi_points = Vec::with_capacity(dates.len());
            for date in &dates {
                current += base_oi * 0.02 * noise(&mut rng);
                current = current.max(base_oi * 0.8);
                oi_points.push(SeriesPoint {
                    date: *date,
                    value: current,
                });
            }
            all.push(ContractSeries {
                contract: contract.clone(),
                metric: ContractMetric::OpenInterest,
                points: oi_points,
            });
        }

        debug!(series = all.len(), "generated mock futures series");
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contracts() -> Vec<String> {
        ["ES", "NQ", "YM"].iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_series_shape() {
        let feed = MockFuturesFeed::new(contracts(), 30, 9, false);
        let series = feed.series().await.unwrap();
        assert_eq!(series.len(), 6);
        for s in &series {
            assert_eq!(s.points.len(), 30);
            for point in &s.points {
                assert!(point.value > 0.0);
                assert!(!matches!(
                    point.date.weekday(),
                    Weekday::Sat | Weekday::Sun
                ));
            }
            // Oldest first.
            for pair in s.points.windows(2) {
                assert!(pair[0].date < pair[1].date);
            }
        }
    }

    #[tokio::test]
    async fn test_event_spike_lands_on_latest_session() {
        let quiet = MockFuturesFeed::new(vec!["ES".to_string()], 20, 4, false)
            .series()
            .await
            .unwrap();
        let spiked = MockFuturesFeed::new(vec!["ES".to_string()], 20, 4, true)
            .series()
            .await
            .unwrap();

        let quiet_last = quiet[0].points.last().unwrap().value;
        let spiked_last = spiked[0].points.last().unwrap().value;
        assert!((spiked_last / quiet_last - 1.8).abs() < 1e-9);
    }
}
