use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::{Bar, PriceSeries};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory price source.
///
/// Serves inserted series as-is. Unknown symbols get a seeded random walk
/// when synthetic generation is enabled, an empty series otherwise.
#[derive(Clone)]
pub struct MockMarketDataService {
    series: Arc<RwLock<HashMap<String, PriceSeries>>>,
    synthetic_seed: Option<u64>,
    failure: Option<String>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self {
            series: Arc::new(RwLock::new(HashMap::new())),
            synthetic_seed: None,
            failure: None,
        }
    }

    pub fn with_synthetic(seed: u64) -> Self {
        Self {
            synthetic_seed: Some(seed),
            ..Self::new()
        }
    }

    /// Every fetch fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new()
        }
    }

    pub async fn insert(&self, series: PriceSeries) {
        self.series
            .write()
            .await
            .insert(series.symbol().to_string(), series);
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_daily_bars(&self, symbol: &str, days: u32) -> Result<PriceSeries> {
        if let Some(reason) = &self.failure {
            anyhow::bail!("{}", reason);
        }

        if let Some(series) = self.series.read().await.get(symbol) {
            return Ok(series.clone());
        }

        match self.synthetic_seed {
            Some(seed) => {
                let end = Utc::now().date_naive();
                let start = end - Duration::days(i64::from(days));
                let sessions = weekdays_between(start, end);
                info!(
                    "MockMarketDataService: generating {} synthetic sessions for {}",
                    sessions, symbol
                );
                synthetic_series(symbol, start, sessions, seed ^ symbol_salt(symbol))
            }
            None => Ok(PriceSeries::empty(symbol)),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}

/// Seeded random walk over consecutive weekdays starting at `start`.
pub fn synthetic_series(
    symbol: &str,
    start: NaiveDate,
    sessions: usize,
    seed: u64,
) -> Result<PriceSeries> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(sessions);
    let mut date = next_weekday(start);
    let mut prev_close = 100.0_f64;

    for _ in 0..sessions {
        let open = prev_close * (1.0 + rng.random_range(-0.005..0.005));
        let close = open * (1.0 + rng.random_range(-0.02..0.021));
        let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
        let volume = (1_000_000.0_f64 * (1.0 + rng.random_range(-0.5..0.5))).round();

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
        prev_close = close;
        date = next_weekday(date + Duration::days(1));
    }

    Ok(PriceSeries::new(symbol, bars)?)
}

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

fn weekdays_between(start: NaiveDate, end: NaiveDate) -> usize {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count()
}

fn symbol_salt(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_series_is_seeded() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(); // Saturday
        let a = synthetic_series("AAPL", start, 30, 42).unwrap();
        let b = synthetic_series("AAPL", start, 30, 42).unwrap();
        let c = synthetic_series("AAPL", start, 30, 43).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 30);
        assert_eq!(a.bars()[0].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert!(
            a.bars()
                .iter()
                .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun))
        );
        assert!(a.bars().iter().all(|b| b.low <= b.open.min(b.close)));
        assert!(a.bars().iter().all(|b| b.high >= b.open.max(b.close)));
        assert!(a.bars().iter().all(|b| b.volume > 0.0 && b.volume.fract() == 0.0));
    }

    #[test]
    fn test_weekdays_between_counts_sessions() {
        let mon = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let next_mon = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(weekdays_between(mon, next_mon), 6);
    }

    #[tokio::test]
    async fn test_inserted_series_served_verbatim() {
        let mock = MockMarketDataService::new();
        let start = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let series = synthetic_series("MSFT", start, 15, 1).unwrap();
        mock.insert(series.clone()).await;

        assert_eq!(mock.get_daily_bars("MSFT", 30).await.unwrap(), series);
        assert!(mock.get_daily_bars("OTHER", 30).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_synthetic_mode_fills_unknown_symbols() {
        let mock = MockMarketDataService::with_synthetic(42);
        let series = mock.get_daily_bars("NVDA", 182).await.unwrap();
        assert!(series.len() > 100);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockMarketDataService::failing("provider down");
        let err = mock.get_daily_bars("AAPL", 30).await.unwrap_err();
        assert_eq!(err.to_string(), "provider down");
    }
}
