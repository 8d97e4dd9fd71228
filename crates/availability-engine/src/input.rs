//! Parsing of caller-supplied values at the request boundary.
//!
//! The engine only accepts already-parsed calendar values; these helpers are
//! what a boundary layer uses to get there, rejecting bad input as [`InputError`].

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::InputError;
use crate::model::YearMonth;

/// Parse a `dd-mm-yyyy` day, e.g. `17-03-2026`.
pub fn parse_day(raw: &str) -> Result<NaiveDate, InputError> {
    let trimmed = raw.trim();
    // chrono accepts single-digit fields; the wire format does not.
    let well_formed = trimmed.len() == 10
        && trimmed
            .char_indices()
            .all(|(i, c)| if i == 2 || i == 5 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(InputError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%d-%m-%Y").map_err(|_| InputError::InvalidDate(raw.to_string()))
}

/// Parse a `yyyy-mm` month, e.g. `2026-03`.
pub fn parse_year_month(raw: &str) -> Result<YearMonth, InputError> {
    let invalid = || InputError::InvalidYearMonth(raw.to_string());
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    // `str::parse` would also take a sign, as in `+202-03`.
    let digits =
        |field: &str, len: usize| field.len() == len && field.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(month, 2) {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    YearMonth::new(year, month).ok_or_else(invalid)
}

/// Parse an RFC 3339 instant, e.g. `2026-03-17T08:30:00+01:00`.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, InputError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| InputError::InvalidInstant(raw.to_string()))
}
