//! Wire formats for dates, times and monetary amounts.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};

/// Date format on the wire (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Time format on the wire (`HH:MM`, 24-hour).
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a `YYYY-MM-DD` string into a real calendar date.
///
/// The shape is checked strictly (4-2-2 digits) so that chrono's lenient
/// parsing of e.g. `2024-6-5` is not accepted.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let b = value.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Parse a `HH:MM` string into a real time of day.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let b = value.as_bytes();
    let shaped = b.len() == 5
        && b[2] == b':'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 2 || c.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

pub fn is_valid_time(value: &str) -> bool {
    parse_time(value).is_some()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Format a monetary amount with exactly two decimal places (half-up).
///
/// No exponent, no thousands separator, `.` as decimal point.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// True when `value` is exactly `len` ASCII digits.
pub fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
