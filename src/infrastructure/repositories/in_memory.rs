//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementation of `PredictionRepository`.
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - No persistence across multiple instances
//!
//! For durable history use `SqlitePredictionRepository`.

use crate::domain::repositories::PredictionRepository;
use crate::domain::trading::types::PredictionRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of PredictionRepository
/// Suitable for testing and throwaway runs
pub struct InMemoryPredictionRepository {
    records: Arc<RwLock<Vec<PredictionRecord>>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryPredictionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn save(&self, record: &PredictionRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_ticker(&self, ticker: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<PredictionRecord> = records
            .iter()
            .filter(|r| r.ticker == ticker)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse after
        matching.sort_by_key(|r| r.created_at);
        Ok(matching.into_iter().rev().take(limit).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::types::{LatestSnapshot, Trend};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(ticker: &str, trend: Trend) -> PredictionRecord {
        PredictionRecord {
            id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            trend,
            confidence: Some(0.5),
            snapshot: LatestSnapshot {
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1,
            },
            timezone: "America/New_York".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_newest_first_per_ticker() {
        let repo = InMemoryPredictionRepository::new();
        repo.save(&record("AAPL", Trend::Down)).await.unwrap();
        repo.save(&record("MSFT", Trend::Down)).await.unwrap();
        repo.save(&record("AAPL", Trend::Up)).await.unwrap();

        let found = repo.find_by_ticker("AAPL", 10).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].trend, Trend::Up);
        assert_eq!(repo.count().await.unwrap(), 3);

        assert_eq!(repo.find_by_ticker("AAPL", 1).await.unwrap().len(), 1);
    }
}
