//! Clock-time helpers shared by the configuration and the strategy.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime};

const HHMM: &str = "%H:%M";

/// Parses a 24h `HH:MM` clock time.
///
/// # Errors
///
/// Returns an error if the string is not a valid `HH:MM` time.
pub fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), HHMM)
        .with_context(|| format!("invalid clock time '{value}', expected HH:MM"))
}

/// True when the time-of-day of `now` is at or past `clock`.
#[must_use]
pub fn is_at_or_after(now: NaiveDateTime, clock: NaiveTime) -> bool {
    now.time() >= clock
}

/// Serde adapter storing a [`NaiveTime`] as an `HH:MM` string.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(super::HHMM).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn parses_clock_times() {
        assert_eq!(parse_hhmm("09:17").unwrap(), NaiveTime::from_hms_opt(9, 17, 0).unwrap());
        assert_eq!(parse_hhmm(" 15:00 ").unwrap(), NaiveTime::from_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_clock_times() {
        assert!(parse_hhmm("9h17").is_err());
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("").is_err());
    }

    #[test]
    fn at_or_after_is_inclusive() {
        let entry = NaiveTime::from_hms_opt(9, 17, 0).unwrap();
        assert!(!is_at_or_after(at(9, 16), entry));
        assert!(is_at_or_after(at(9, 17), entry));
        assert!(is_at_or_after(at(9, 18), entry));
    }
}
