//! Month-view day disabling for calendar widgets.
//!
//! A coarse pre-filter in front of [`crate::engine`]: it never generates slots,
//! only rules out days that cannot possibly be booked.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::dst::local_date;
use crate::model::{DeliveryTypeConfig, DisabledDays, YearMonth};

/// Why a day is disabled. The first matching reason wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    Past,
    BeyondHorizon,
    NoTemplate,
    FullyBooked,
}

/// Classify one day. `booked` is the count of non-cancelled bookings on it.
pub fn disabled_reason(
    config: &DeliveryTypeConfig,
    date: NaiveDate,
    today: NaiveDate,
    booked: u32,
) -> Option<DisabledReason> {
    if date < today {
        return Some(DisabledReason::Past);
    }
    if let Some(limit) = config.settings.future_booking_limit_days {
        // A horizon past the last representable date does not limit anything.
        let horizon = today.checked_add_days(Days::new(u64::from(limit)));
        if horizon.is_some_and(|last| date > last) {
            return Some(DisabledReason::BeyondHorizon);
        }
    }
    let weekday = date.weekday();
    if !config.weekly_availability.iter().any(|entry| entry.matches(weekday)) {
        return Some(DisabledReason::NoTemplate);
    }
    if let Some(cap) = config.settings.max_bookings_per_day {
        if booked >= cap {
            return Some(DisabledReason::FullyBooked);
        }
    }
    None
}

/// Disabled day numbers of `month`, plus the weekdays that have a template entry.
///
/// `booking_counts` only needs entries for days that have bookings; missing days
/// count as zero.
pub fn compute_disabled_days(
    config: &DeliveryTypeConfig,
    month: YearMonth,
    now: DateTime<Utc>,
    booking_counts: &BTreeMap<NaiveDate, u32>,
) -> DisabledDays {
    let today = local_date(config.timezone, now);
    let disabled_days = month
        .days()
        .filter(|date| {
            let booked = booking_counts.get(date).copied().unwrap_or(0);
            disabled_reason(config, *date, today, booked).is_some()
        })
        .map(|date| date.day())
        .collect();

    DisabledDays {
        disabled_days,
        available_weekdays: config.available_weekdays(),
    }
}

/// Days of `month` whose booking count can still change the outcome.
///
/// Lets callers skip count queries for days already disabled by date or
/// template, and skip them entirely when no cap is enforced.
pub fn days_needing_counts(
    config: &DeliveryTypeConfig,
    month: YearMonth,
    now: DateTime<Utc>,
) -> Vec<NaiveDate> {
    if config.settings.max_bookings_per_day.is_none() {
        return Vec::new();
    }
    let today = local_date(config.timezone, now);
    month
        .days()
        .filter(|date| disabled_reason(config, *date, today, 0).is_none())
        .collect()
}
