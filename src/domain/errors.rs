use thiserror::Error;

/// Errors raised by the prediction pipeline.
///
/// All variants are local decisions, not transient faults: the core never
/// retries and never substitutes a default trend when one of these occurs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Insufficient data for {stage}: need at least {required}, got {available}")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Could not fetch price data for {symbol}: {reason}")]
    DataFetchFailure { symbol: String, reason: String },

    #[error("Training failed: {reason}")]
    TrainingFailure { reason: String },

    #[error("Invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("Failed to persist prediction: {reason}")]
    Persistence { reason: String },
}

impl PredictionError {
    /// True when more history would fix the failure.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, PredictionError::InsufficientData { .. })
    }
}
