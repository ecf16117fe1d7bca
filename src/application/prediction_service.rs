//! Request-scoped prediction flow.
//!
//! Each call fetches history, builds features, trains a fresh forest and
//! composes the response with the exchange status. Nothing is cached between
//! calls; the only shared state is the injected data source and repository.

use crate::application::feature_engineering_service::FeatureBuilder;
use crate::application::market_status::MarketStatusEvaluator;
use crate::application::ml::trend_predictor::TrendPredictor;
use crate::domain::errors::PredictionError;
use crate::domain::market::exchange::MarketStatus;
use crate::domain::ports::MarketDataService;
use crate::domain::repositories::PredictionRepository;
use crate::domain::trading::types::{LatestSnapshot, PredictionRecord, PriceSeries, Trend};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Response payload of a prediction request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionReport {
    pub ticker: String,
    pub trend: Trend,
    /// Holdout accuracy, not a calibrated probability
    pub confidence: Option<f64>,
    pub as_of: NaiveDate,
    pub latest: LatestSnapshot,
    pub market_status: MarketStatus,
}

pub struct PredictionService {
    market_data: Arc<dyn MarketDataService>,
    repository: Option<Arc<dyn PredictionRepository>>,
    feature_builder: FeatureBuilder,
    predictor: TrendPredictor,
    evaluator: MarketStatusEvaluator,
    history_days: u32,
}

impl PredictionService {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        repository: Option<Arc<dyn PredictionRepository>>,
        predictor: TrendPredictor,
        evaluator: MarketStatusEvaluator,
        history_days: u32,
    ) -> Self {
        Self {
            market_data,
            repository,
            feature_builder: FeatureBuilder::default(),
            predictor,
            evaluator,
            history_days,
        }
    }

    /// Trimmed, upper-cased ticker.
    pub fn normalize_ticker(ticker: &str) -> String {
        ticker.trim().to_uppercase()
    }

    pub async fn predict(&self, ticker: &str) -> Result<PredictionReport, PredictionError> {
        self.predict_at(ticker, Utc::now()).await
    }

    /// Like [`predict`](Self::predict) with the market status taken at `now`.
    pub async fn predict_at(
        &self,
        ticker: &str,
        now: DateTime<Utc>,
    ) -> Result<PredictionReport, PredictionError> {
        let ticker = Self::normalize_ticker(ticker);
        let series = self.fetch(&ticker, self.history_days).await?;
        info!(
            "PredictionService: {} bars for {} from {}",
            series.len(),
            ticker,
            self.market_data.name()
        );

        let builder = self.feature_builder.clone();
        let predictor = self.predictor.clone();
        let result = tokio::task::spawn_blocking(move || {
            let table = builder.build(&series)?;
            predictor.predict(&table)
        })
        .await
        .map_err(|e| PredictionError::TrainingFailure {
            reason: format!("training task aborted: {}", e),
        })??;

        let market_status = self.evaluator.evaluate(&ticker, now);

        if let Some(repository) = &self.repository {
            let record = PredictionRecord::new(&ticker, &result, &market_status.timezone);
            repository
                .save(&record)
                .await
                .map_err(|e| PredictionError::Persistence {
                    reason: format!("{:#}", e),
                })?;
        }

        Ok(PredictionReport {
            ticker,
            trend: result.trend,
            confidence: result.confidence,
            as_of: result.as_of,
            latest: result.latest,
            market_status,
        })
    }

    pub fn market_status(&self, ticker: &str) -> MarketStatus {
        self.evaluator.evaluate_now(&Self::normalize_ticker(ticker))
    }

    /// Stored predictions for `ticker`, newest first.
    pub async fn history(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, PredictionError> {
        let Some(repository) = &self.repository else {
            return Err(PredictionError::Persistence {
                reason: "prediction history is disabled".to_string(),
            });
        };

        repository
            .find_by_ticker(&Self::normalize_ticker(ticker), limit)
            .await
            .map_err(|e| PredictionError::Persistence {
                reason: format!("{:#}", e),
            })
    }

    /// Raw daily bars for roughly the last `days` calendar days.
    pub async fn historical(&self, ticker: &str, days: u32) -> Result<PriceSeries, PredictionError> {
        let ticker = Self::normalize_ticker(ticker);
        let series = self.fetch(&ticker, days).await?;
        if series.is_empty() {
            return Err(PredictionError::DataFetchFailure {
                symbol: ticker,
                reason: "no bars returned".to_string(),
            });
        }
        Ok(series)
    }

    async fn fetch(&self, ticker: &str, days: u32) -> Result<PriceSeries, PredictionError> {
        self.market_data
            .get_daily_bars(ticker, days)
            .await
            .map_err(|e| {
                warn!("PredictionService: fetch failed for {}: {:#}", ticker, e);
                PredictionError::DataFetchFailure {
                    symbol: ticker.to_string(),
                    reason: format!("{:#}", e),
                }
            })
    }
}
