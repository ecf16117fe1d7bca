use crate::domain::trading::types::FeatureRow;

/// A single model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Close,
    High,
    Low,
    Open,
    Volume,
    PriceChange,
    HighLow,
    Ma5,
    Ma10,
    VolumeChange,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Close => "close",
            Feature::High => "high",
            Feature::Low => "low",
            Feature::Open => "open",
            Feature::Volume => "volume",
            Feature::PriceChange => "price_change",
            Feature::HighLow => "high_low",
            Feature::Ma5 => "ma5",
            Feature::Ma10 => "ma10",
            Feature::VolumeChange => "volume_change",
        }
    }

    /// Number of sessions (including the current one) needed before the
    /// value is defined.
    pub fn lookback(&self) -> usize {
        match self {
            Feature::Ma5 => 5,
            Feature::Ma10 => 10,
            Feature::VolumeChange => 2,
            _ => 1,
        }
    }

    pub fn extract(&self, row: &FeatureRow) -> f64 {
        match self {
            Feature::Close => row.close,
            Feature::High => row.high,
            Feature::Low => row.low,
            Feature::Open => row.open,
            Feature::Volume => row.volume,
            Feature::PriceChange => row.price_change,
            Feature::HighLow => row.high_low,
            Feature::Ma5 => row.ma5,
            Feature::Ma10 => row.ma10,
            Feature::VolumeChange => row.volume_change,
        }
    }
}

/// Model input order. Changing it changes every trained model's meaning.
const NEXT_DAY_FEATURES: &[Feature] = &[
    Feature::Close,
    Feature::High,
    Feature::Low,
    Feature::Open,
    Feature::Volume,
    Feature::PriceChange,
    Feature::HighLow,
    Feature::Ma5,
    Feature::Ma10,
    Feature::VolumeChange,
];

/// Named, ordered feature list shared by table construction and training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    features: &'static [Feature],
}

impl FeatureSchema {
    pub fn next_day() -> Self {
        Self {
            features: NEXT_DAY_FEATURES,
        }
    }

    pub fn features(&self) -> &'static [Feature] {
        self.features
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(Feature::name).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Longest warm-up any feature in the schema requires.
    pub fn max_lookback(&self) -> usize {
        self.features
            .iter()
            .map(Feature::lookback)
            .max()
            .unwrap_or(1)
    }

    pub fn vector(&self, row: &FeatureRow) -> Vec<f64> {
        self.features.iter().map(|f| f.extract(row)).collect()
    }

    pub fn matrix(&self, rows: &[FeatureRow]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.vector(r)).collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::next_day()
    }
}
