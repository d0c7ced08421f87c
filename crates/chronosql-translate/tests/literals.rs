//! Literal decoding at the public surface: durations and timestamps.

use chronosql_translate::time::{parse_duration, parse_timestamp};
use chronosql_translate::{DurationUnit, TimePrecision};
use rstest::rstest;

#[rstest]
#[case("10s", TimePrecision::Millis, 10_000, DurationUnit::Seconds)]
#[case("10s", TimePrecision::Micros, 10_000_000, DurationUnit::Seconds)]
#[case("2m", TimePrecision::Millis, 120_000, DurationUnit::Minutes)]
#[case("1h", TimePrecision::Millis, 3_600_000, DurationUnit::Hours)]
#[case("1d", TimePrecision::Millis, 86_400_000, DurationUnit::Days)]
#[case("500a", TimePrecision::Millis, 500, DurationUnit::Millis)]
#[case("500a", TimePrecision::Nanos, 500_000_000, DurationUnit::Millis)]
#[case("3n", TimePrecision::Millis, 3, DurationUnit::Months)]
#[case("2y", TimePrecision::Millis, 2, DurationUnit::Years)]
fn durations_decode_to_precision_ticks(
    #[case] literal: &str,
    #[case] precision: TimePrecision,
    #[case] ticks: i64,
    #[case] unit: DurationUnit,
) {
    assert_eq!(parse_duration(literal, precision).unwrap(), (ticks, unit));
}

#[rstest]
#[case("10")]
#[case("s")]
#[case("10ss")]
#[case("10q")]
#[case("-5s")]
fn malformed_durations_are_rejected(#[case] literal: &str) {
    assert!(parse_duration(literal, TimePrecision::Millis).is_err());
}

#[rstest]
#[case("0", 0)]
#[case("1648791213000", 1_648_791_213_000)]
#[case("-1", -1)]
fn raw_timestamps_pass_through(#[case] literal: &str, #[case] ticks: i64) {
    assert_eq!(parse_timestamp(literal, TimePrecision::Millis).unwrap(), ticks);
}

#[test]
fn datetime_precision_scales_ticks() {
    let ms = parse_timestamp("2022-04-01 12:00:00", TimePrecision::Millis).unwrap();
    let us = parse_timestamp("2022-04-01 12:00:00", TimePrecision::Micros).unwrap();
    assert_eq!(us, ms * 1_000);
}
