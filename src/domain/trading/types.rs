use crate::domain::errors::PredictionError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One trading session's OHLCV record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Daily bars for one symbol, strictly increasing by date.
///
/// Missing sessions are simply absent. An empty series is valid and signals
/// that the upstream source had nothing to offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, PredictionError> {
        if let Some(bad) = bars.iter().find(|b| !b.is_finite()) {
            return Err(PredictionError::InvalidSeries {
                reason: format!("non-finite value in bar dated {}", bad.date),
            });
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(PredictionError::InvalidSeries {
                reason: format!(
                    "bars out of order: {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

/// A bar plus every derived feature and its next-session label.
///
/// Only constructed when all fields are defined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub price_change: f64,
    pub high_low: f64,
    pub ma5: f64,
    pub ma10: f64,
    pub volume_change: f64,
    /// 1 if the next session closed strictly higher, else 0.
    pub target: u8,
}

impl FeatureRow {
    pub fn label(&self) -> i32 {
        i32::from(self.target)
    }
}

/// Chronological, fully-defined feature rows. Never empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabeledTable {
    rows: Vec<FeatureRow>,
}

impl LabeledTable {
    pub fn new(rows: Vec<FeatureRow>) -> Result<Self, PredictionError> {
        if rows.is_empty() {
            return Err(PredictionError::InsufficientData {
                stage: "labeled table",
                required: 1,
                available: 0,
            });
        }
        if rows.windows(2).any(|w| w[1].date <= w[0].date) {
            return Err(PredictionError::InvalidSeries {
                reason: "labeled rows are not strictly chronological".to_string(),
            });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent observation.
    pub fn latest(&self) -> &FeatureRow {
        // Non-empty by construction.
        &self.rows[self.rows.len() - 1]
    }

    /// Chronological split into a leading and a trailing segment.
    pub fn split_at(&self, train_len: usize) -> (&[FeatureRow], &[FeatureRow]) {
        self.rows.split_at(train_len.min(self.rows.len()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn from_label(label: i32) -> Self {
        if label == 1 { Trend::Up } else { Trend::Down }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "UP",
            Trend::Down => "DOWN",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UP" => Ok(Trend::Up),
            "DOWN" => Ok(Trend::Down),
            _ => anyhow::bail!("Invalid trend: {}. Must be 'UP' or 'DOWN'", s),
        }
    }
}

/// Raw OHLCV of the row the prediction was made from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatestSnapshot {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&FeatureRow> for LatestSnapshot {
    fn from(row: &FeatureRow) -> Self {
        Self {
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.max(0.0).round() as u64,
        }
    }
}

/// Outcome of one train-and-predict pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub trend: Trend,
    /// Holdout accuracy of the freshly trained model. Not a probability.
    pub confidence: Option<f64>,
    pub latest: LatestSnapshot,
    pub as_of: NaiveDate,
    pub training_rows: usize,
    pub holdout_rows: usize,
}

/// A stored prediction, as kept in the history table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub ticker: String,
    pub trend: Trend,
    pub confidence: Option<f64>,
    pub snapshot: LatestSnapshot,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(ticker: &str, result: &PredictionResult, timezone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            trend: result.trend,
            confidence: result.confidence,
            snapshot: result.latest,
            timezone: timezone.to_string(),
            created_at: Utc::now(),
        }
    }
}
