//! Prediction history storage configuration.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct PersistenceEnvConfig {
    pub database_url: String,
    pub persist_predictions: bool,
}

impl Default for PersistenceEnvConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/trendcast.db".to_string(),
            persist_predictions: true,
        }
    }
}

impl PersistenceEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            persist_predictions: env::var("PERSIST_PREDICTIONS")
                .unwrap_or_else(|_| "true".to_string())
                .trim()
                .to_lowercase()
                .parse::<bool>()
                .context("Failed to parse PERSIST_PREDICTIONS")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_config_defaults() {
        let config = PersistenceEnvConfig::default();
        assert!(config.persist_predictions);
        assert!(config.database_url.starts_with("sqlite://"));
    }
}
