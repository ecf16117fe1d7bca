//! Price data source configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Where daily bars come from and how much history a prediction uses
#[derive(Debug, Clone)]
pub struct DataSourceEnvConfig {
    pub yahoo_base_url: String,
    pub csv_data_dir: PathBuf,
    /// Calendar days of history fetched for a prediction (~6 months)
    pub history_days: u32,
    pub mock_seed: u64,
}

impl DataSourceEnvConfig {
    pub fn from_env() -> Result<Self> {
        let history_days = env::var("HISTORY_DAYS")
            .unwrap_or_else(|_| "182".to_string())
            .parse::<u32>()
            .context("Failed to parse HISTORY_DAYS")?;
        if history_days == 0 {
            anyhow::bail!("HISTORY_DAYS must be positive");
        }

        Ok(Self {
            yahoo_base_url: env::var("YAHOO_BASE_URL")
                .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
            csv_data_dir: PathBuf::from(
                env::var("CSV_DATA_DIR").unwrap_or_else(|_| "data/prices".to_string()),
            ),
            history_days,
            mock_seed: env::var("MOCK_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse::<u64>()
                .context("Failed to parse MOCK_SEED")?,
        })
    }
}
