//! Timestamp and duration literal decoding.
//!
//! Timestamp literals are either a raw tick count at the configured
//! precision or a calendar datetime resolved in the local timezone (which is
//! where daylight handling lives). Duration literals are `<digits><unit>`;
//! fixed-width units decode to ticks at the configured precision, while
//! months and years stay calendar-relative.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::ast::expr::DurationUnit;
use crate::error::{Result, TranslateError};
use crate::types::TimePrecision;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a timestamp literal into ticks at `precision`.
pub fn parse_timestamp(literal: &str, precision: TimePrecision) -> Result<i64> {
    let trimmed = literal.trim();
    if !trimmed.is_empty()
        && trimmed
            .strip_prefix('-')
            .unwrap_or(trimmed)
            .bytes()
            .all(|b| b.is_ascii_digit())
    {
        return trimmed
            .parse::<i64>()
            .map_err(|_| TranslateError::WrongValueType(literal.to_string()));
    }

    let naive = parse_naive_datetime(trimmed)
        .ok_or_else(|| TranslateError::WrongValueType(literal.to_string()))?;
    let local = chrono::Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TranslateError::WrongValueType(literal.to_string()))?;

    let tps = precision.ticks_per_second();
    let subsec = i64::from(local.timestamp_subsec_nanos()) / (1_000_000_000 / tps);
    Ok(local.timestamp() * tps + subsec)
}

fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Decodes a duration literal into `(value, unit)`.
///
/// Sub-day units are converted to ticks at `precision`; months and years
/// keep their raw count since their length depends on the anchor date.
pub fn parse_duration(literal: &str, precision: TimePrecision) -> Result<(i64, DurationUnit)> {
    static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = DURATION_REGEX
        .get_or_init(|| Regex::new(r"^\s*(\d+)([a-zA-Z])\s*$").expect("Invalid regex pattern"));

    let caps = re
        .captures(literal)
        .ok_or_else(|| TranslateError::WrongValueType(literal.to_string()))?;
    let value: i64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| TranslateError::WrongValueType(literal.to_string()))?;
    let suffix = caps
        .get(2)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
        .ok_or_else(|| TranslateError::WrongValueType(literal.to_string()))?;
    let unit = DurationUnit::from_suffix(suffix)
        .ok_or_else(|| TranslateError::WrongValueType(literal.to_string()))?;

    let tps = precision.ticks_per_second();
    let ticks = match unit {
        DurationUnit::Micros => value * tps / 1_000_000,
        DurationUnit::Millis => value * tps / 1_000,
        DurationUnit::Months | DurationUnit::Years => value,
        _ => {
            // fixed_seconds covers the remaining units
            value * unit.fixed_seconds().unwrap_or(1) * tps
        }
    };
    Ok((ticks, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_tick_literal_passes_through() {
        assert_eq!(parse_timestamp("1648791213000", TimePrecision::Millis).unwrap(), 1_648_791_213_000);
        assert_eq!(parse_timestamp("-5", TimePrecision::Millis).unwrap(), -5);
    }

    #[test]
    fn datetime_literal_resolves_to_epoch_ticks() {
        let ms = parse_timestamp("1970-01-02 00:00:00", TimePrecision::Millis).unwrap();
        // one day at millisecond precision, shifted by the local UTC offset
        let offset_ms = i64::from(
            chrono::Local
                .timestamp_opt(86_400, 0)
                .unwrap()
                .offset()
                .local_minus_utc(),
        ) * 1_000;
        assert_eq!(ms, 86_400_000 - offset_ms);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("not a time", TimePrecision::Millis).is_err());
    }

    #[test]
    fn seconds_duration_scales_with_precision() {
        assert_eq!(
            parse_duration("10s", TimePrecision::Millis).unwrap(),
            (10_000, DurationUnit::Seconds)
        );
        assert_eq!(
            parse_duration("10s", TimePrecision::Nanos).unwrap(),
            (10_000_000_000, DurationUnit::Seconds)
        );
    }

    #[test]
    fn calendar_units_keep_raw_counts() {
        assert_eq!(
            parse_duration("3n", TimePrecision::Millis).unwrap(),
            (3, DurationUnit::Months)
        );
        assert_eq!(
            parse_duration("1y", TimePrecision::Micros).unwrap(),
            (1, DurationUnit::Years)
        );
    }

    #[test]
    fn malformed_durations_are_rejected() {
        assert!(parse_duration("10", TimePrecision::Millis).is_err());
        assert!(parse_duration("s10", TimePrecision::Millis).is_err());
        assert!(parse_duration("10x", TimePrecision::Millis).is_err());
    }
}
