//! Repository Pattern Abstractions
//!
//! Persistence of prediction history sits behind `PredictionRepository` so the
//! prediction flow never depends on a storage engine.
//!
//! # Implementations
//!
//! - `SqlitePredictionRepository`: durable, used by the CLI.
//! - `InMemoryPredictionRepository`: tests and throwaway runs.

use crate::domain::trading::types::PredictionRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Repository for storing and retrieving past predictions
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Save a prediction
    async fn save(&self, record: &PredictionRecord) -> Result<()>;

    /// Most recent predictions for a ticker, newest first
    async fn find_by_ticker(&self, ticker: &str, limit: usize) -> Result<Vec<PredictionRecord>>;

    /// Count stored predictions
    async fn count(&self) -> Result<usize>;
}
