use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::{Feature, FeatureSchema};
use crate::domain::trading::types::{Bar, FeatureRow, LabeledTable, PriceSeries};
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::debug;

/// Turns a daily price series into a labeled feature table.
///
/// Rows whose moving averages, volume change or next-day target are undefined
/// are dropped, so the output starts at the first fully warmed-up session and
/// ends one session before the last bar.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    schema: FeatureSchema,
}

impl FeatureBuilder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Bars needed for one labeled row: the longest warm-up plus the
    /// session that supplies the target.
    pub fn min_bars(&self) -> usize {
        self.schema.max_lookback() + 1
    }

    pub fn build(&self, series: &PriceSeries) -> Result<LabeledTable, PredictionError> {
        let bars = series.bars();
        let required = self.min_bars();
        if bars.len() < required {
            return Err(PredictionError::InsufficientData {
                stage: "price series",
                required,
                available: bars.len(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let ma5 = trailing_mean(&closes, Feature::Ma5.lookback())?;
        let ma10 = trailing_mean(&closes, Feature::Ma10.lookback())?;

        let rows: Vec<FeatureRow> = bars
            .iter()
            .enumerate()
            .filter_map(|(t, bar)| {
                Some(FeatureRow {
                    date: bar.date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                    price_change: bar.close - bar.open,
                    high_low: bar.high - bar.low,
                    ma5: ma5[t]?,
                    ma10: ma10[t]?,
                    volume_change: volume_change(bars, t)?,
                    target: next_close_higher(bars, t)?,
                })
            })
            .collect();

        debug!(
            "FeatureBuilder: {} bars -> {} labeled rows for {}",
            bars.len(),
            rows.len(),
            series.symbol()
        );

        LabeledTable::new(rows)
    }
}

/// Trailing simple mean of `values`, `None` until `period` values exist.
fn trailing_mean(values: &[f64], period: usize) -> Result<Vec<Option<f64>>, PredictionError> {
    let mut sma = SimpleMovingAverage::new(period).map_err(|e| PredictionError::InvalidSeries {
        reason: format!("moving average period {} rejected: {:?}", period, e),
    })?;

    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mean = sma.next(v);
            (i + 1 >= period).then_some(mean)
        })
        .collect())
}

/// Fractional volume change against the previous session.
/// Undefined on the first bar and when the previous volume is zero.
fn volume_change(bars: &[Bar], t: usize) -> Option<f64> {
    let prev = bars.get(t.checked_sub(1)?)?.volume;
    if prev == 0.0 {
        return None;
    }
    Some((bars[t].volume - prev) / prev)
}

/// 1 if the following session closes strictly higher, 0 otherwise.
fn next_close_higher(bars: &[Bar], t: usize) -> Option<u8> {
    let next = bars.get(t + 1)?;
    Some(u8::from(next.close > bars[t].close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + Duration::days(i as i64),
                open: c - 0.5,
                high: c + 1.0,
                low: c - 1.5,
                close: c,
                volume: 1_000.0 + i as f64 * 10.0,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_output_length_boundaries() {
        let builder = FeatureBuilder::default();
        for n in [11, 12, 13, 30] {
            let table = builder.build(&series_from_closes(&ramp(n))).unwrap();
            assert_eq!(table.len(), n - 10, "series of {} bars", n);
        }
    }

    #[test]
    fn test_too_short_series_is_insufficient() {
        let builder = FeatureBuilder::default();
        let err = builder.build(&series_from_closes(&ramp(10))).unwrap_err();
        assert_eq!(
            err,
            PredictionError::InsufficientData {
                stage: "price series",
                required: 11,
                available: 10,
            }
        );
    }

    #[test]
    fn test_empty_and_single_bar_series() {
        let builder = FeatureBuilder::default();
        assert!(
            builder
                .build(&PriceSeries::empty("TEST"))
                .unwrap_err()
                .is_insufficient_data()
        );
        assert!(
            builder
                .build(&series_from_closes(&[42.0]))
                .unwrap_err()
                .is_insufficient_data()
        );
    }

    #[test]
    fn test_ma10_matches_hand_computed_mean() {
        // Ten known closes then one more bar so the first row gets a target.
        let closes = [10.0, 12.0, 11.0, 15.0, 14.0, 13.0, 17.0, 16.0, 18.0, 20.0, 19.0];
        let table = FeatureBuilder::default()
            .build(&series_from_closes(&closes))
            .unwrap();

        let row = table.rows()[0];
        // (10+12+11+15+14+13+17+16+18+20) / 10
        assert!((row.ma10 - 14.6).abs() < 1e-9);
        // (13+17+16+18+20) / 5
        assert!((row.ma5 - 16.8).abs() < 1e-9);
        assert_eq!(row.close, 20.0);
    }

    #[test]
    fn test_rolling_means_on_later_rows() {
        let closes = ramp(15);
        let table = FeatureBuilder::default()
            .build(&series_from_closes(&closes))
            .unwrap();

        for row in table.rows() {
            let t = closes.iter().position(|&c| c == row.close).unwrap();
            let expected10: f64 = closes[t - 9..=t].iter().sum::<f64>() / 10.0;
            let expected5: f64 = closes[t - 4..=t].iter().sum::<f64>() / 5.0;
            assert!((row.ma10 - expected10).abs() < 1e-9);
            assert!((row.ma5 - expected5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_target_uses_strict_inequality() {
        // Row 9 sees an equal close next, row 10 sees a higher one,
        // row 11 sees a lower one.
        let mut closes = ramp(10);
        closes.extend([109.0, 110.0, 105.0, 106.0]);
        let table = FeatureBuilder::default()
            .build(&series_from_closes(&closes))
            .unwrap();

        let targets: Vec<u8> = table.rows().iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_derived_bar_features() {
        let table = FeatureBuilder::default()
            .build(&series_from_closes(&ramp(12)))
            .unwrap();
        let row = table.rows()[0];
        assert!((row.price_change - 0.5).abs() < 1e-12);
        assert!((row.high_low - 2.5).abs() < 1e-12);
        // volume 1090 vs 1080
        assert!((row.volume_change - 10.0 / 1080.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_previous_volume_drops_row() {
        let mut series = series_from_closes(&ramp(13)).into_bars();
        // Row at index 10 would divide by the zero volume at index 9
        series[9].volume = 0.0;
        let series = PriceSeries::new("TEST", series).unwrap();

        let table = FeatureBuilder::default().build(&series).unwrap();
        let dates: Vec<_> = table.rows().iter().map(|r| r.date).collect();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            dates,
            vec![start + Duration::days(9), start + Duration::days(11)]
        );
    }

    #[test]
    fn test_all_rows_dropped_is_insufficient() {
        let mut bars = series_from_closes(&ramp(11)).into_bars();
        bars[8].volume = 0.0;
        let series = PriceSeries::new("TEST", bars).unwrap();

        let err = FeatureBuilder::default().build(&series).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::InsufficientData {
                stage: "labeled table",
                ..
            }
        ));
    }

    #[test]
    fn test_caller_series_untouched() {
        let series = series_from_closes(&ramp(20));
        let before = series.clone();
        let _ = FeatureBuilder::default().build(&series).unwrap();
        assert_eq!(series, before);
    }
}
