//! Exchange profiles and the ticker-suffix convention that selects them.
//!
//! A ticker ending in a registered suffix (case-insensitive) trades on that
//! suffix's exchange; anything else falls back to the default profile.
//! Holidays are not modelled, only weekends and the daily close.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timezone, local close time and display name of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeProfile {
    pub name: String,
    pub timezone: Tz,
    pub close_time: NaiveTime,
}

impl ExchangeProfile {
    pub fn new(name: impl Into<String>, timezone: Tz, close_time: NaiveTime) -> Self {
        Self {
            name: name.into(),
            timezone,
            close_time,
        }
    }

    /// National Stock Exchange of India, closes 15:30 Kolkata time.
    pub fn nse() -> Self {
        Self::new(
            "NSE",
            chrono_tz::Asia::Kolkata,
            NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        )
    }

    /// US equities, close 16:00 New York time.
    pub fn us_equities() -> Self {
        Self::new(
            "NYSE/NASDAQ",
            chrono_tz::America::New_York,
            NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
        )
    }

    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }
}

/// Suffix-keyed exchange table with a default profile.
#[derive(Debug, Clone)]
pub struct ExchangeCalendar {
    suffixes: Vec<(String, ExchangeProfile)>,
    default_profile: ExchangeProfile,
}

impl ExchangeCalendar {
    pub fn new(default_profile: ExchangeProfile) -> Self {
        Self {
            suffixes: Vec::new(),
            default_profile,
        }
    }

    /// Registers `suffix` (e.g. ".NS"). Later registrations win on overlap.
    pub fn with_suffix(mut self, suffix: &str, profile: ExchangeProfile) -> Self {
        self.suffixes.insert(0, (suffix.to_uppercase(), profile));
        self
    }

    pub fn resolve(&self, ticker: &str) -> &ExchangeProfile {
        let ticker = ticker.trim().to_uppercase();
        self.suffixes
            .iter()
            .find(|(suffix, _)| ticker.ends_with(suffix.as_str()))
            .map(|(_, profile)| profile)
            .unwrap_or(&self.default_profile)
    }
}

impl Default for ExchangeCalendar {
    fn default() -> Self {
        Self::new(ExchangeProfile::us_equities()).with_suffix(".NS", ExchangeProfile::nse())
    }
}

/// Why an exchange is shut at the evaluated instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    Weekend,
    AfterClose,
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosedReason::Weekend => write!(f, "weekend"),
            ClosedReason::AfterClose => write!(f, "closed for the day"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketStatus {
    pub is_open: bool,
    pub exchange: String,
    pub timezone: String,
    pub message: String,
    pub closed_reason: Option<ClosedReason>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ns_suffix_resolves_to_nse() {
        let calendar = ExchangeCalendar::default();
        let profile = calendar.resolve("INFY.NS");
        assert_eq!(profile.name, "NSE");
        assert_eq!(profile.timezone_name(), "Asia/Kolkata");
        assert_eq!(profile.close_time, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
    }

    #[test]
    fn test_suffix_match_is_case_insensitive() {
        let calendar = ExchangeCalendar::default();
        assert_eq!(calendar.resolve(" tcs.ns ").name, "NSE");
    }

    #[test]
    fn test_other_tickers_use_default() {
        let calendar = ExchangeCalendar::default();
        assert_eq!(calendar.resolve("AAPL").timezone_name(), "America/New_York");
        // Suffix must be at the end
        assert_eq!(calendar.resolve("NS.AAPL").name, "NYSE/NASDAQ");
    }

    #[test]
    fn test_custom_suffix_registration() {
        let lse = ExchangeProfile::new(
            "LSE",
            chrono_tz::Europe::London,
            NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
        );
        let calendar = ExchangeCalendar::default().with_suffix(".L", lse);
        assert_eq!(calendar.resolve("VOD.L").name, "LSE");
        assert_eq!(calendar.resolve("INFY.NS").name, "NSE");
    }

    #[test]
    fn test_closed_reason_display() {
        assert_eq!(ClosedReason::Weekend.to_string(), "weekend");
        assert_eq!(ClosedReason::AfterClose.to_string(), "closed for the day");
    }
}
