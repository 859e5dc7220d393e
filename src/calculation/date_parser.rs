//! Date-time parsing for expense and period boundaries.
//!
//! Every date in the engine has the fixed shape `YYYY-MM-DD hh:mm:ss`.
//! Two policies read it:
//!
//! - [`parse_strict`] rejects impossible calendar values (`2023-11-31`). It
//!   is used for expense dates, which come from users.
//! - [`parse_lenient`] rolls overflowing fields into the next unit
//!   (`2023-11-31` becomes `2023-12-01`). It is used for override, addition
//!   and window boundaries, which come from trusted configuration.

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};

use crate::error::{EngineError, EngineResult};
use crate::models::DateRange;
use crate::models::date_format::DATE_TIME_FORMAT;

/// Numeric fields of a string that has the exact `YYYY-MM-DD hh:mm:ss` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateFields {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

/// Splits `text` into its six numeric fields if it has the exact shape.
fn split_fields(text: &str) -> Option<DateFields> {
    let bytes = text.as_bytes();
    if bytes.len() != 19 {
        return None;
    }

    let separators = [(4, b'-'), (7, b'-'), (10, b' '), (13, b':'), (16, b':')];
    if separators.iter().any(|&(i, sep)| bytes[i] != sep) {
        return None;
    }

    let number = |from: usize, to: usize| -> Option<u32> {
        bytes[from..to].iter().try_fold(0u32, |acc, &b| {
            b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
        })
    };

    Some(DateFields {
        year: i32::try_from(number(0, 4)?).ok()?,
        month: number(5, 7)?,
        day: number(8, 10)?,
        hour: number(11, 13)?,
        minute: number(14, 16)?,
        second: number(17, 19)?,
    })
}

/// Parses `text` strictly.
///
/// Returns `None` unless `text` has the exact shape and names a real
/// calendar instant.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::parse_strict;
///
/// assert!(parse_strict("2023-02-28 15:49:20").is_some());
/// assert!(parse_strict("2023-02-29 15:49:20").is_none());
/// assert!(parse_strict("2023-02-28T15:49:20").is_none());
/// ```
pub fn parse_strict(text: &str) -> Option<NaiveDateTime> {
    let f = split_fields(text)?;
    NaiveDate::from_ymd_opt(f.year, f.month, f.day)?.and_hms_opt(f.hour, f.minute, f.second)
}

/// Parses `text` leniently.
///
/// The shape must still match exactly, but out-of-range field values are
/// normalized by counting forward (or backward, for zero months or days)
/// from January 1st of the year.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::{parse_lenient, parse_strict};
///
/// assert_eq!(
///     parse_lenient("2023-11-31 23:59:59"),
///     parse_strict("2023-12-01 23:59:59")
/// );
/// assert!(parse_lenient("Nov 31").is_none());
/// ```
pub fn parse_lenient(text: &str) -> Option<NaiveDateTime> {
    let f = split_fields(text)?;

    let year_start = NaiveDate::from_ymd_opt(f.year, 1, 1)?;
    let month_start = match f.month {
        0 => year_start.checked_sub_months(Months::new(1))?,
        m => year_start.checked_add_months(Months::new(m - 1))?,
    };
    let day = month_start.checked_add_signed(Duration::days(i64::from(f.day) - 1))?;

    let seconds = i64::from(f.hour) * 3600 + i64::from(f.minute) * 60 + i64::from(f.second);
    day.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Formats `instant` in the fixed engine pattern.
pub(crate) fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(DATE_TIME_FORMAT).to_string()
}

/// Parses both boundaries of a rule period leniently.
///
/// `period` labels the period in the error (e.g. `"q[0]"`).
///
/// # Errors
///
/// Returns [`EngineError::InvalidPeriodDate`] if either boundary cannot be
/// parsed even leniently. A malformed rule fails the whole call.
pub fn parse_period(period: &str, start: &str, end: &str) -> EngineResult<DateRange> {
    let boundary = |field: &str, value: &str| {
        parse_lenient(value).ok_or_else(|| EngineError::InvalidPeriodDate {
            period: period.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
    };

    Ok(DateRange {
        start: boundary("start", start)?,
        end: boundary("end", end)?,
    })
}
