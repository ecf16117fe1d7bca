use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::{Bar, PriceSeries};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Reads `<data_dir>/<SYMBOL>.csv` with a `date,open,high,low,close,volume`
/// header. The history window is measured back from the newest bar in the
/// file, not from today, so archived files stay usable.
pub struct CsvMarketDataService {
    data_dir: PathBuf,
}

impl CsvMarketDataService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The symbol must name a file directly inside `data_dir`.
    fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        if symbol.is_empty()
            || symbol.contains("..")
            || symbol.contains(['/', '\\'])
            || Path::new(symbol).is_absolute()
        {
            anyhow::bail!("Invalid symbol for CSV lookup: {:?}", symbol);
        }
        Ok(self.data_dir.join(format!("{}.csv", symbol)))
    }
}

#[async_trait]
impl MarketDataService for CsvMarketDataService {
    async fn get_daily_bars(&self, symbol: &str, days: u32) -> Result<PriceSeries> {
        let path = self.path_for(symbol)?;
        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("No price file for {} at {:?}", symbol, path))?;

        let series = parse_csv(symbol, &raw, days)
            .with_context(|| format!("Failed to parse price file {:?}", path))?;
        debug!(
            "CsvMarketDataService: {} bars for {} from {:?}",
            series.len(),
            symbol,
            path
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "CSV files"
    }
}

fn parse_csv(symbol: &str, raw: &[u8], days: u32) -> Result<PriceSeries> {
    let mut rdr = csv::Reader::from_reader(raw);
    let mut bars = Vec::new();
    for result in rdr.deserialize() {
        let record: CsvBar = result?;
        bars.push(Bar {
            date: record.date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }
    bars.sort_by_key(|b| b.date);

    if let Some(newest) = bars.last().map(|b| b.date) {
        let cutoff = newest - Duration::days(i64::from(days));
        bars.retain(|b| b.date >= cutoff);
    }

    Ok(PriceSeries::new(symbol, bars)?)
}
