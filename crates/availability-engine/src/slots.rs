//! Expand a working window into fixed-duration slots.
//!
//! The boundary test is strict: a slot is emitted only while
//! `cursor + duration < window end`, so a trailing slot ending exactly on the
//! window end is never produced.

use chrono::Duration;

use crate::dst::{DstPolicy, LocalDay};
use crate::model::{AvailabilityPeriod, TimeSlot};

/// Generate slots for the local window `[start_minute, end_minute)` of `day`.
///
/// The window start follows the day's [`DstPolicy`]; the end always shifts
/// forward out of a gap. Slots then advance by an exact absolute duration.
/// A zero duration or an empty window yields no slots.
pub fn generate_slots(
    day: &LocalDay,
    start_minute: u16,
    end_minute: u16,
    duration_minutes: u32,
) -> Vec<TimeSlot> {
    if duration_minutes == 0 || start_minute >= end_minute {
        return Vec::new();
    }
    let Some(window_start) = day.at_minute(start_minute, day.policy()) else {
        return Vec::new();
    };
    let Some(window_end) = day.at_minute(end_minute, DstPolicy::ShiftForward) else {
        return Vec::new();
    };

    let step = Duration::minutes(i64::from(duration_minutes));
    let mut slots = Vec::new();
    let mut cursor = window_start;
    while cursor + step < window_end {
        slots.push(TimeSlot {
            start: cursor,
            end: cursor + step,
        });
        cursor += step;
    }
    slots
}

/// Generate slots for one [`AvailabilityPeriod`] of `day`.
pub fn generate_period_slots(
    day: &LocalDay,
    period: &AvailabilityPeriod,
    duration_minutes: u32,
) -> Vec<TimeSlot> {
    generate_slots(
        day,
        period.start_time.minute_of_day(),
        period.end_time.minute_of_day(),
        duration_minutes,
    )
}
