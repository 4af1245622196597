//! Time-of-day and duration parsing/rendering
//!
//! Timestamps are `HH:MM:SS.mmm` with exactly three fractional digits. Durations
//! are rendered in the same shape after rounding to the millisecond.

use crate::types::{RaceError, Result, Timestamp};
use chrono::{Duration, NaiveTime};

/// chrono format used for every timestamp the engine reads or writes
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

const NANOS_PER_MILLI: i64 = 1_000_000;
const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// Parse a `HH:MM:SS.mmm` time of day
pub fn parse_timestamp(input: &str) -> Result<Timestamp> {
    // chrono treats the fractional part as optional; the wire format does not
    let has_millis = input
        .rsplit_once('.')
        .map(|(_, frac)| frac.len() == 3 && frac.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false);
    if !has_millis {
        return Err(RaceError::InvalidTime(input.to_string()));
    }

    NaiveTime::parse_from_str(input, TIME_FORMAT)
        .map_err(|_| RaceError::InvalidTime(input.to_string()))
}

/// Render a time of day as `HH:MM:SS.mmm`
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format(TIME_FORMAT).to_string()
}

/// Parse an `H:MM:SS` duration (three colon-separated non-negative integers)
///
/// A non-numeric component fails the whole parse rather than counting as zero.
pub fn parse_clock_duration(input: &str) -> Result<Duration> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(RaceError::InvalidDuration(input.to_string()));
    }

    let mut components = [0i64; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u32>()
            .map(i64::from)
            .map_err(|_| RaceError::InvalidDuration(input.to_string()))?;
    }

    let [hours, minutes, seconds] = components;
    Ok(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

/// Round a duration to the nearest millisecond (halves away from zero)
pub fn round_to_millis(duration: Duration) -> i64 {
    match duration.num_nanoseconds() {
        Some(nanos) => {
            let half = NANOS_PER_MILLI / 2;
            if nanos >= 0 {
                (nanos + half) / NANOS_PER_MILLI
            } else {
                (nanos - half) / NANOS_PER_MILLI
            }
        }
        None => duration.num_milliseconds(),
    }
}

/// Render a duration as `HH:MM:SS.mmm`, millisecond-rounded
///
/// Hours are not wrapped at 24. Negative durations (only possible with
/// out-of-order input) get a leading `-`.
pub fn format_duration(duration: Duration) -> String {
    let millis = round_to_millis(duration);
    let sign = if millis < 0 { "-" } else { "" };
    let mut rest = millis.abs();

    let hours = rest / MILLIS_PER_HOUR;
    rest %= MILLIS_PER_HOUR;
    let minutes = rest / MILLIS_PER_MINUTE;
    rest %= MILLIS_PER_MINUTE;
    let seconds = rest / MILLIS_PER_SECOND;
    let millis = rest % MILLIS_PER_SECOND;

    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, millis)
}

/// Duration as fractional seconds
pub fn as_seconds_f64(duration: Duration) -> f64 {
    match duration.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

/// `distance / duration`, or 0.0 when the duration is not positive
pub fn speed(distance: f64, duration: Duration) -> f64 {
    if duration > Duration::zero() {
        distance / as_seconds_f64(duration)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32, ms: u32) -> Timestamp {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("09:05:59.867").unwrap(), t(9, 5, 59, 867));
        assert_eq!(parse_timestamp("00:00:00.000").unwrap(), t(0, 0, 0, 0));
    }

    #[test]
    fn test_parse_timestamp_requires_millis() {
        assert!(parse_timestamp("09:30:00").is_err());
        assert!(parse_timestamp("09:30:00.5").is_err());
        assert!(parse_timestamp("09:30:00.5000").is_err());
        assert!(parse_timestamp("09:30:00.abc").is_err());
        assert!(parse_timestamp("25:00:00.000").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&t(9, 5, 59, 867)), "09:05:59.867");
        assert_eq!(format_timestamp(&t(13, 0, 0, 5)), "13:00:00.005");
    }

    #[test]
    fn test_parse_clock_duration() {
        assert_eq!(parse_clock_duration("00:00:30").unwrap(), Duration::seconds(30));
        assert_eq!(parse_clock_duration("1:02:03").unwrap(), Duration::seconds(3723));
        assert!(parse_clock_duration("00:30").is_err());
        assert!(parse_clock_duration("00:xx:30").is_err());
        assert!(parse_clock_duration("00:-1:30").is_err());
        assert!(parse_clock_duration("").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::milliseconds(1_743_872)), "00:29:03.872");
        assert_eq!(format_duration(Duration::zero()), "00:00:00.000");
        assert_eq!(format_duration(Duration::hours(25)), "25:00:00.000");
        assert_eq!(format_duration(Duration::milliseconds(-1_500)), "-00:00:01.500");
    }

    #[test]
    fn test_format_duration_rounds_to_millis() {
        assert_eq!(format_duration(Duration::nanoseconds(1_499_999)), "00:00:00.001");
        assert_eq!(format_duration(Duration::nanoseconds(1_500_000)), "00:00:00.002");
    }

    #[test]
    fn test_speed() {
        let lap = Duration::milliseconds(1_743_872);
        assert_eq!(format!("{:.3}", speed(3651.0, lap)), "2.094");
        assert_eq!(speed(50.0, Duration::zero()), 0.0);
        assert_eq!(speed(50.0, Duration::seconds(-5)), 0.0);
    }
}
