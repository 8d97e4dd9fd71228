//! RRULE evaluation -- does a recurrence rule produce an occurrence on a given day?
//!
//! Wraps the `rrule` crate (v0.13). The rule is anchored with a `DTSTART` at the
//! start of the target day in the organization timezone (local midnight, or the
//! first valid instant after it when midnight falls in a DST gap), so DST is
//! handled by `rrule`/`chrono-tz` rather than by offset arithmetic here.
//!
//! `UNTIL` is stripped from the rule text and checked against the first
//! occurrence directly: the `rrule` crate rejects an `UNTIL` earlier than
//! `DTSTART` and requires it to share `DTSTART`'s timezone, while stored rules
//! routinely carry expired or UTC-suffixed bounds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rrule::{RRule, Unvalidated};

use crate::dst::{resolve_local, DstPolicy, LocalDay};
use crate::error::RecurrenceError;

/// Whether `rrule` has at least one occurrence within `day`.
///
/// Accepts a bare `FREQ=...` string or one prefixed with `RRULE:`.
///
/// # Errors
/// Returns [`RecurrenceError`] if the string is empty, its `UNTIL` is not an
/// iCalendar date or date-time, or `rrule` rejects the remaining parts.
pub fn occurs_on(rrule: &str, day: &LocalDay) -> Result<bool, RecurrenceError> {
    let body = strip_rrule_prefix(rrule.trim());
    if body.is_empty() {
        return Err(RecurrenceError::Empty);
    }

    let (parts, until) = split_until(body)?;
    if parts.is_empty() {
        return Err(RecurrenceError::Empty);
    }
    let tz = day.timezone();
    let until = until.map(|raw| parse_until(raw, day)).transpose()?;

    // Expired rules cannot produce an occurrence on or after the anchor.
    if until.is_some_and(|u| u < day.start()) {
        return Ok(false);
    }

    // Anchor at the resolved start of the day rather than a literal 00:00, which
    // does not exist in zones whose DST change happens at midnight.
    let dt_start = day.start().with_timezone(&rrule::Tz::Tz(tz));
    let rule: RRule<Unvalidated> = parts
        .join(";")
        .parse()
        .map_err(|e| RecurrenceError::Parse(format!("{}", e)))?;
    let rrule_set = rule
        .build(dt_start)
        .map_err(|e| RecurrenceError::Parse(format!("{}", e)))?;

    // Occurrences never precede DTSTART, so the first one decides.
    let first = rrule_set
        .all(1)
        .dates
        .into_iter()
        .next()
        .map(|dt| dt.with_timezone(&Utc));

    Ok(first.is_some_and(|occurrence| {
        day.contains(occurrence) && until.is_none_or(|u| occurrence <= u)
    }))
}

fn strip_rrule_prefix(raw: &str) -> &str {
    match raw.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &raw[6..],
        _ => raw,
    }
}

/// Split the rule into its non-`UNTIL` parts and the raw `UNTIL` value, if any.
fn split_until(body: &str) -> Result<(Vec<&str>, Option<&str>), RecurrenceError> {
    let mut parts = Vec::new();
    let mut until = None;
    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("UNTIL") => {
                if until.replace(value.trim()).is_some() {
                    return Err(RecurrenceError::Parse("duplicate UNTIL".to_string()));
                }
            }
            _ => parts.push(part),
        }
    }
    Ok((parts, until))
}

/// Interpret an iCalendar `UNTIL` value.
///
/// `YYYYMMDD` and floating `YYYYMMDDTHHMMSS` are local to the day's timezone;
/// a trailing `Z` marks UTC.
fn parse_until(raw: &str, day: &LocalDay) -> Result<DateTime<Utc>, RecurrenceError> {
    let invalid = || RecurrenceError::InvalidUntil(raw.to_string());

    if let Some(utc) = raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| invalid());
    }

    let local = match NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S") {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(raw, "%Y%m%d")
            .map_err(|_| invalid())?
            .and_time(chrono::NaiveTime::MIN),
    };
    resolve_local(day.timezone(), local, DstPolicy::ShiftForward).ok_or_else(invalid)
}
