//! Configuration module for Trendcast.
//!
//! Structured configuration loading from environment variables, organized
//! by concern: data source, model and persistence. Every key has a default;
//! a key that is present but malformed is an error.

mod data_source_config;
mod model_config;
mod persistence_config;

pub use data_source_config::DataSourceEnvConfig;
pub use model_config::ModelEnvConfig;
pub use persistence_config::PersistenceEnvConfig;

use crate::application::ml::trend_predictor::ForestParams;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Where daily price history is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Yahoo,
    Csv,
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(Mode::Yahoo),
            "csv" => Ok(Mode::Csv),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'yahoo', 'csv', or 'mock'", s),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub data_source: DataSourceEnvConfig,
    pub model: ModelEnvConfig,
    pub persistence: PersistenceEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("MODE").unwrap_or_else(|_| "yahoo".to_string());
        let mode = Mode::from_str(&mode_str)?;

        let data_source =
            DataSourceEnvConfig::from_env().context("Failed to load data source config")?;
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let persistence =
            PersistenceEnvConfig::from_env().context("Failed to load persistence config")?;

        Ok(Self {
            mode,
            data_source,
            model,
            persistence,
        })
    }

    pub fn forest_params(&self) -> ForestParams {
        self.model.to_forest_params()
    }
}
