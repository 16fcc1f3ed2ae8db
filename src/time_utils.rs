// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for time-of-day parsing and formatting.

use chrono::NaiveTime;

/// Parse a time of day, with or without seconds (`10:00` or `10:00:00`).
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f").or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
}

/// Format a time of day as `HH:MM:SS`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Serde adapter for `NaiveTime` fields on the wire.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time_of_day(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid time of day {raw:?}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_seconds() {
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(parse_time_of_day("10:00").unwrap(), ten);
        assert_eq!(parse_time_of_day("10:00:00").unwrap(), ten);
        assert_eq!(
            parse_time_of_day("23:59:30").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 30).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("ten o'clock").is_err());
        assert!(parse_time_of_day("").is_err());
    }

    #[test]
    fn formats_with_seconds() {
        let t = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(format_time_of_day(t), "07:05:00");
    }
}
