//! Daily bars from the Yahoo Finance chart API.
//!
//! Sessions with any missing OHLCV field are skipped. Timestamps are shifted
//! by the exchange GMT offset reported in the response before taking the
//! date, so a bar is dated by its local trading day.

use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::{Bar, PriceSeries};
use crate::infrastructure::core::{HttpClientFactory, build_url_with_query, percent_encode};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::debug;

pub struct YahooMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooMarketDataService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(HttpClientFactory::create_client(), base_url)
    }

    pub fn with_client(client: ClientWithMiddleware, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MarketDataService for YahooMarketDataService {
    async fn get_daily_bars(&self, symbol: &str, days: u32) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(days));
        let base = format!("{}/v8/finance/chart/{}", self.base_url, percent_encode(symbol));

        let query_params = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", "1d".to_string()),
        ];
        let url = build_url_with_query(&base, &query_params);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Request failed: {}", e))?;

        let status = response.status();
        // Yahoo answers unknown symbols with 404 and an error body
        let body: ChartResponse = if status.is_success() || status.as_u16() == 404 {
            response
                .json()
                .await
                .context("Failed to parse Yahoo chart response")?
        } else {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo chart fetch failed ({}): {}", status, error_text);
        };

        let series = parse_chart(symbol, body)?;
        debug!(
            "YahooMarketDataService: {} daily bars for {} ({} days)",
            series.len(),
            symbol,
            days
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn parse_chart(symbol: &str, body: ChartResponse) -> Result<PriceSeries> {
    if let Some(err) = body.chart.error {
        anyhow::bail!("Yahoo error for {}: {} ({})", symbol, err.description, err.code);
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(symbol));
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::empty(symbol));
    };

    let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open, i),
            field(&quote.high, i),
            field(&quote.low, i),
            field(&quote.close, i),
            field(&quote.volume, i),
        ) else {
            continue;
        };

        let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .with_context(|| format!("Invalid timestamp {} for {}", ts, symbol))?
            .date_naive();

        let bar = Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        };

        // A live session can repeat the last date; keep the newer quote
        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    Ok(PriceSeries::new(symbol, bars)?)
}

fn field(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}
