use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::bootstrap::persistence::{PersistenceBootstrap, PersistenceHandle};
use crate::application::market_status::MarketStatusEvaluator;
use crate::application::ml::trend_predictor::TrendPredictor;
use crate::application::prediction_service::PredictionService;
use crate::config::{Config, Mode};
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::ports::MarketDataService;
use crate::infrastructure::csv_source::CsvMarketDataService;
use crate::infrastructure::mock::MockMarketDataService;
use crate::infrastructure::yahoo::YahooMarketDataService;

pub struct ServicesBootstrap;

impl ServicesBootstrap {
    pub fn market_data(config: &Config) -> Arc<dyn MarketDataService> {
        match config.mode {
            Mode::Yahoo => Arc::new(YahooMarketDataService::new(
                config.data_source.yahoo_base_url.clone(),
            )),
            Mode::Csv => Arc::new(CsvMarketDataService::new(
                config.data_source.csv_data_dir.clone(),
            )),
            Mode::Mock => Arc::new(MockMarketDataService::with_synthetic(
                config.data_source.mock_seed,
            )),
        }
    }

    /// Builds the prediction service plus the database handle backing it, if any.
    pub async fn build(config: &Config) -> Result<(PredictionService, Option<PersistenceHandle>)> {
        let market_data = Self::market_data(config);
        info!("Market data source: {}", market_data.name());

        let persistence = PersistenceBootstrap::init(&config.persistence).await?;
        let repository = persistence
            .as_ref()
            .map(|handle| handle.prediction_repository.clone());

        let params = config.forest_params();
        info!(
            "Model: {} trees, seed {}, holdout {:.0}%",
            params.n_trees,
            params.seed,
            params.holdout_fraction * 100.0
        );

        let service = PredictionService::new(
            market_data,
            repository,
            TrendPredictor::new(FeatureSchema::next_day(), params),
            MarketStatusEvaluator::default(),
            config.data_source.history_days,
        );

        Ok((service, persistence))
    }
}
