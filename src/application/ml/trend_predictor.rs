use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::trading::types::{
    FeatureRow, LabeledTable, LatestSnapshot, PredictionResult, Trend,
};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{debug, info};

type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Random forest hyperparameters. The seed feeds every bootstrap draw and
/// feature subset, so identical inputs give identical forests.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_trees: u16,
    pub seed: u64,
    /// Share of the table (trailing rows) held out for scoring
    pub holdout_fraction: f64,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            holdout_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Sizes of the chronological train/holdout partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldoutSplit {
    pub train_len: usize,
    pub holdout_len: usize,
}

impl HoldoutSplit {
    /// `ceil(fraction * n)` trailing rows, clamped so both sides keep at
    /// least one row.
    pub fn for_rows(n: usize, fraction: f64) -> Result<Self, PredictionError> {
        if n < 2 {
            return Err(PredictionError::InsufficientData {
                stage: "train/holdout split",
                required: 2,
                available: n,
            });
        }

        let wanted = (fraction * n as f64).ceil();
        let holdout_len = if wanted.is_finite() && wanted > 0.0 {
            (wanted as usize).clamp(1, n - 1)
        } else {
            1
        };

        Ok(Self {
            train_len: n - holdout_len,
            holdout_len,
        })
    }
}

/// Trains a fresh forest per call and predicts the next-session direction
/// of the latest row.
#[derive(Debug, Clone, Default)]
pub struct TrendPredictor {
    schema: FeatureSchema,
    params: ForestParams,
}

impl TrendPredictor {
    pub fn new(schema: FeatureSchema, params: ForestParams) -> Self {
        Self { schema, params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn predict(&self, table: &LabeledTable) -> Result<PredictionResult, PredictionError> {
        let split = HoldoutSplit::for_rows(table.len(), self.params.holdout_fraction)?;
        let (train, holdout) = table.split_at(split.train_len);

        let model = self.fit(train)?;

        let holdout_predictions = self.classify(&model, holdout)?;
        let confidence = accuracy(holdout, &holdout_predictions);

        let latest = table.latest();
        let label = self
            .classify(&model, std::slice::from_ref(latest))?
            .first()
            .copied()
            .ok_or_else(|| PredictionError::TrainingFailure {
                reason: "model returned no prediction for the latest row".to_string(),
            })?;
        let trend = Trend::from_label(label);

        info!(
            "TrendPredictor: {} as of {} (holdout accuracy {:.3}, train={}, holdout={})",
            trend, latest.date, confidence, split.train_len, split.holdout_len
        );

        Ok(PredictionResult {
            trend,
            confidence: Some(confidence),
            latest: LatestSnapshot::from(latest),
            as_of: latest.date,
            training_rows: split.train_len,
            holdout_rows: split.holdout_len,
        })
    }

    fn fit(&self, train: &[FeatureRow]) -> Result<Forest, PredictionError> {
        let labels: Vec<i32> = train.iter().map(FeatureRow::label).collect();
        if let Some(&first) = labels.first()
            && labels.iter().all(|&l| l == first)
        {
            return Err(PredictionError::TrainingFailure {
                reason: format!(
                    "training segment of {} rows has a single class ({})",
                    labels.len(),
                    Trend::from_label(first)
                ),
            });
        }

        let x = DenseMatrix::from_2d_vec(&self.schema.matrix(train)).map_err(|e| {
            PredictionError::TrainingFailure {
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;

        let mut params = RandomForestClassifierParameters::default()
            .with_n_trees(self.params.n_trees)
            .with_min_samples_split(self.params.min_samples_split)
            .with_seed(self.params.seed);
        if let Some(depth) = self.params.max_depth {
            params = params.with_max_depth(depth);
        }

        debug!(
            "TrendPredictor: fitting {} trees on {} rows x {} features (seed {})",
            self.params.n_trees,
            train.len(),
            self.schema.len(),
            self.params.seed
        );

        RandomForestClassifier::fit(&x, &labels, params).map_err(|e| {
            PredictionError::TrainingFailure {
                reason: format!("Random forest fit failed: {}", e),
            }
        })
    }

    fn classify(&self, model: &Forest, rows: &[FeatureRow]) -> Result<Vec<i32>, PredictionError> {
        let x = DenseMatrix::from_2d_vec(&self.schema.matrix(rows)).map_err(|e| {
            PredictionError::TrainingFailure {
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;

        model
            .predict(&x)
            .map_err(|e| PredictionError::TrainingFailure {
                reason: format!("Prediction failed: {}", e),
            })
    }
}

/// Fraction of rows whose label matches the prediction.
fn accuracy(rows: &[FeatureRow], predictions: &[i32]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let hits = rows
        .iter()
        .zip(predictions)
        .filter(|(row, pred)| row.label() == **pred)
        .count();
    hits as f64 / rows.len() as f64
}
