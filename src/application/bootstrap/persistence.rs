use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::PersistenceEnvConfig;
use crate::domain::repositories::PredictionRepository;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::persistence::SqlitePredictionRepository;

pub struct PersistenceHandle {
    pub db: Database,
    pub prediction_repository: Arc<dyn PredictionRepository>,
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    /// `None` when prediction history is switched off.
    pub async fn init(config: &PersistenceEnvConfig) -> Result<Option<PersistenceHandle>> {
        if !config.persist_predictions {
            info!("Prediction history disabled (PERSIST_PREDICTIONS=false)");
            return Ok(None);
        }

        info!("Initializing Database at {}", config.database_url);
        let db = Database::new(&config.database_url)
            .await
            .context("Failed to initialize database")?;

        let prediction_repository = Arc::new(SqlitePredictionRepository::new(db.pool.clone()));

        Ok(Some(PersistenceHandle {
            db,
            prediction_repository,
        }))
    }
}
