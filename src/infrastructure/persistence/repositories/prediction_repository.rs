use crate::domain::repositories::PredictionRepository;
use crate::domain::trading::types::{LatestSnapshot, PredictionRecord, Trend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &SqliteRow) -> Result<PredictionRecord> {
    let id: String = row.try_get("id")?;
    let trend: String = row.try_get("trend")?;
    let volume: i64 = row.try_get("volume")?;
    let created_at: i64 = row.try_get("created_at")?;

    Ok(PredictionRecord {
        id: Uuid::parse_str(&id).with_context(|| format!("Invalid prediction id {}", id))?,
        ticker: row.try_get("ticker")?,
        trend: trend.parse::<Trend>()?,
        confidence: row.try_get("confidence")?,
        snapshot: LatestSnapshot {
            open: row.try_get("open")?,
            high: row.try_get("high")?,
            low: row.try_get("low")?,
            close: row.try_get("close")?,
            volume: volume.max(0) as u64,
        },
        timezone: row.try_get("timezone")?,
        created_at: DateTime::from_timestamp_millis(created_at)
            .with_context(|| format!("Invalid created_at {}", created_at))?,
    })
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn save(&self, record: &PredictionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO predictions
            (id, ticker, trend, confidence, open, high, low, close, volume, timezone, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.ticker)
        .bind(record.trend.as_str())
        .bind(record.confidence)
        .bind(record.snapshot.open)
        .bind(record.snapshot.high)
        .bind(record.snapshot.low)
        .bind(record.snapshot.close)
        .bind(i64::try_from(record.snapshot.volume).unwrap_or(i64::MAX))
        .bind(&record.timezone)
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("Failed to save prediction")?;

        Ok(())
    }

    async fn find_by_ticker(&self, ticker: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM predictions WHERE ticker = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(ticker)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load predictions")?;

        rows.iter().map(record_from_row).collect()
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM predictions")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n.max(0) as usize)
    }
}
