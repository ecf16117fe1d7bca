use crate::domain::trading::types::PriceSeries;
use anyhow::Result;
use async_trait::async_trait;

/// Source of daily OHLCV history.
///
/// Implementations return an empty series (not an error) when the symbol is
/// known but has no bars in the window.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Daily bars covering roughly the last `days` calendar days, oldest first.
    async fn get_daily_bars(&self, symbol: &str, days: u32) -> Result<PriceSeries>;

    fn name(&self) -> &str;
}
