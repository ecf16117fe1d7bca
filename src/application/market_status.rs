use crate::domain::market::exchange::{ClosedReason, ExchangeCalendar, MarketStatus};
use chrono::{DateTime, Datelike, Utc, Weekday};

/// Decides whether a ticker's exchange is open at a given instant.
///
/// Pure: the verdict depends only on the instant and the calendar.
#[derive(Debug, Clone, Default)]
pub struct MarketStatusEvaluator {
    calendar: ExchangeCalendar,
}

impl MarketStatusEvaluator {
    pub fn new(calendar: ExchangeCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &ExchangeCalendar {
        &self.calendar
    }

    pub fn evaluate_now(&self, ticker: &str) -> MarketStatus {
        self.evaluate(ticker, Utc::now())
    }

    pub fn evaluate(&self, ticker: &str, now: DateTime<Utc>) -> MarketStatus {
        let profile = self.calendar.resolve(ticker);
        let local = now.with_timezone(&profile.timezone);

        let closed_reason = if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            Some(ClosedReason::Weekend)
        } else if local.naive_local().time() >= profile.close_time {
            Some(ClosedReason::AfterClose)
        } else {
            None
        };

        let message = match closed_reason {
            Some(ClosedReason::Weekend) => format!("{} is closed (Weekend)", profile.name),
            Some(ClosedReason::AfterClose) => format!("{} has closed for the day", profile.name),
            None => format!("{} is open", profile.name),
        };

        MarketStatus {
            is_open: closed_reason.is_none(),
            exchange: profile.name.clone(),
            timezone: profile.timezone_name().to_string(),
            message,
            closed_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_monday_morning_is_open() {
        // Monday 2024-03-11 10:00 EDT = 14:00 UTC
        let status = MarketStatusEvaluator::default().evaluate("AAPL", utc(2024, 3, 11, 14, 0));
        assert!(status.is_open);
        assert_eq!(status.closed_reason, None);
        assert_eq!(status.message, "NYSE/NASDAQ is open");
        assert_eq!(status.timezone, "America/New_York");
    }

    #[test]
    fn test_saturday_is_weekend() {
        let status = MarketStatusEvaluator::default().evaluate("AAPL", utc(2024, 3, 9, 15, 0));
        assert!(!status.is_open);
        assert_eq!(status.closed_reason, Some(ClosedReason::Weekend));
        assert_eq!(status.message, "NYSE/NASDAQ is closed (Weekend)");
    }

    #[test]
    fn test_weekday_after_close() {
        // Tuesday 17:30 EDT
        let status = MarketStatusEvaluator::default().evaluate("MSFT", utc(2024, 3, 12, 21, 30));
        assert!(!status.is_open);
        assert_eq!(status.closed_reason, Some(ClosedReason::AfterClose));
        assert_eq!(status.message, "NYSE/NASDAQ has closed for the day");
    }

    #[test]
    fn test_close_time_is_inclusive() {
        let evaluator = MarketStatusEvaluator::default();
        // 16:00 EDT exactly
        let at_close = evaluator.evaluate("AAPL", utc(2024, 3, 12, 20, 0));
        assert_eq!(at_close.closed_reason, Some(ClosedReason::AfterClose));
        // One minute earlier
        let before = evaluator.evaluate("AAPL", utc(2024, 3, 12, 19, 59));
        assert!(before.is_open);
    }

    #[test]
    fn test_nse_uses_kolkata_close() {
        let evaluator = MarketStatusEvaluator::default();
        // Wednesday 15:30 IST = 10:00 UTC
        let at_close = evaluator.evaluate("INFY.NS", utc(2024, 3, 13, 10, 0));
        assert!(!at_close.is_open);
        assert_eq!(at_close.timezone, "Asia/Kolkata");
        assert_eq!(at_close.message, "NSE has closed for the day");

        // 15:29 IST
        let before = evaluator.evaluate("INFY.NS", utc(2024, 3, 13, 9, 59));
        assert!(before.is_open);
        assert_eq!(before.message, "NSE is open");
    }

    #[test]
    fn test_weekday_is_taken_in_exchange_timezone() {
        // Friday 20:00 UTC is already Saturday 01:30 in Kolkata
        let evaluator = MarketStatusEvaluator::default();
        let status = evaluator.evaluate("TCS.NS", utc(2024, 3, 15, 20, 0));
        assert_eq!(status.closed_reason, Some(ClosedReason::Weekend));

        // Same instant in New York is Friday 16:00 EDT
        let us = evaluator.evaluate("AAPL", utc(2024, 3, 15, 20, 0));
        assert_eq!(us.closed_reason, Some(ClosedReason::AfterClose));
    }

    #[test]
    fn test_daylight_saving_shift() {
        let evaluator = MarketStatusEvaluator::default();
        // 20:30 UTC is 15:30 EST in January but 16:30 EDT in July
        let winter = evaluator.evaluate("AAPL", utc(2024, 1, 8, 20, 30));
        assert!(winter.is_open);
        let summer = evaluator.evaluate("AAPL", utc(2024, 7, 8, 20, 30));
        assert_eq!(summer.closed_reason, Some(ClosedReason::AfterClose));
    }

    #[test]
    fn test_evaluate_now_is_consistent() {
        let evaluator = MarketStatusEvaluator::default();
        for (ticker, tz) in [("AAPL", "America/New_York"), ("infy.ns", "Asia/Kolkata")] {
            let status = evaluator.evaluate_now(ticker);
            assert_eq!(status.is_open, status.closed_reason.is_none());
            assert_eq!(status.timezone, tz);
        }
    }
}
