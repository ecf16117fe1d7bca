//! Model configuration parsing from environment variables.
//!
//! Forest size, seed and holdout share. Defaults reproduce a 100-tree
//! forest with seed 42 scored on the trailing 20% of rows.

use crate::application::ml::trend_predictor::ForestParams;
use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub n_trees: u16,
    pub seed: u64,
    pub holdout_fraction: f64,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let n_trees = env::var("MODEL_N_TREES")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u16>()
            .context("Failed to parse MODEL_N_TREES")?;
        if n_trees == 0 {
            anyhow::bail!("MODEL_N_TREES must be at least 1");
        }

        let holdout_fraction = env::var("MODEL_HOLDOUT_FRACTION")
            .unwrap_or_else(|_| "0.2".to_string())
            .parse::<f64>()
            .context("Failed to parse MODEL_HOLDOUT_FRACTION")?;
        if !(holdout_fraction > 0.0 && holdout_fraction < 1.0) {
            anyhow::bail!(
                "MODEL_HOLDOUT_FRACTION must be strictly between 0 and 1, got {}",
                holdout_fraction
            );
        }

        let max_depth = match env::var("MODEL_MAX_DEPTH") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<u16>()
                    .context("Failed to parse MODEL_MAX_DEPTH")?,
            ),
            _ => None,
        };

        Ok(Self {
            n_trees,
            seed: env::var("MODEL_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse::<u64>()
                .context("Failed to parse MODEL_SEED")?,
            holdout_fraction,
            max_depth,
            min_samples_split: env::var("MODEL_MIN_SAMPLES_SPLIT")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<usize>()
                .context("Failed to parse MODEL_MIN_SAMPLES_SPLIT")?,
        })
    }

    pub fn to_forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            seed: self.seed,
            holdout_fraction: self.holdout_fraction,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        }
    }
}
