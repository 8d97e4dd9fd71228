//! Domain types: delivery type configuration, rules, bookings and computed slots.
//!
//! Types in this module are the *validated* shapes the engine works with. The
//! untyped storage records they are built from live in [`crate::config`] and
//! [`crate::rule`].

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::InputError;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a caller-supplied id. Surrounding whitespace is trimmed.
            pub fn parse(raw: &str) -> Result<Self, InputError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(InputError::EmptyId($kind));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifies a bookable delivery category.
    DeliveryTypeId,
    "delivery type"
);
opaque_id!(
    /// Identifies the organization that owns delivery types and fixes their timezone.
    OrganizationId,
    "organization"
);

/// Minutes in a day; also the largest valid end minute (local midnight at day end).
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A recurring weekly working window with minute-of-day granularity.
///
/// `weekday` counts from Sunday: 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailability {
    pub weekday: u8,
    pub start_minute: u16,
    pub end_minute: u16,
}

impl WeeklyAvailability {
    pub fn matches(&self, weekday: Weekday) -> bool {
        u32::from(self.weekday) == weekday.num_days_from_sunday()
    }
}

/// A wall-clock time of day. `24:00` is only meaningful as a period end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn minute_of_day(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A sub-day working window used by [`Action::ReplaceSlots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPeriod {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl AvailabilityPeriod {
    pub const fn new(start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            start_time,
            end_time,
        }
    }
}

impl fmt::Display for AvailabilityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_time, self.end_time)
    }
}

/// When a rule applies. Dates are local calendar days in the organization timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    ExactDate(NaiveDate),
    /// Inclusive on both ends.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// RFC 5545 RRULE, anchored at the target day's local midnight.
    Recurrence(String),
}

/// What a matching rule does to the day's slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Terminal: the day has no slots and later rules are not consulted.
    MakeUnavailable,
    /// Non-terminal: replaces the current slots and evaluation continues.
    ReplaceSlots {
        periods: Vec<AvailabilityPeriod>,
        duration_override_minutes: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingRule {
    pub id: String,
    pub description: String,
    pub priority: i32,
    pub is_active: bool,
    pub condition: Condition,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Always positive once loaded.
    pub duration_minutes: u32,
    /// Bookable horizon in days from today; enforced iff present.
    pub future_booking_limit_days: Option<u32>,
    /// Daily cap on non-cancelled bookings; enforced iff present.
    pub max_bookings_per_day: Option<u32>,
}

/// A fully provisioned delivery type, ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryTypeConfig {
    pub id: DeliveryTypeId,
    pub organization_id: OrganizationId,
    pub timezone: Tz,
    pub dst_policy: DstPolicy,
    /// Never empty once loaded.
    pub weekly_availability: Vec<WeeklyAvailability>,
    /// In configured order; the engine sorts a copy by priority.
    pub rules: Vec<SchedulingRule>,
    pub settings: Settings,
}

impl DeliveryTypeConfig {
    /// Weekdays (0 = Sunday) with at least one template entry, sorted and deduplicated.
    pub fn available_weekdays(&self) -> Vec<u8> {
        let mut weekdays: Vec<u8> = self.weekly_availability.iter().map(|w| w.weekday).collect();
        weekdays.sort_unstable();
        weekdays.dedup();
        weekdays
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
}

/// An existing booking. Only its start instant matters for slot exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    pub fn confirmed(start: DateTime<Utc>) -> Self {
        Self {
            start,
            status: BookingStatus::Confirmed,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

/// A bookable interval. `end - start` equals the duration in effect when generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Computed availability for one local calendar day. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAvailability {
    pub date: NaiveDate,
    /// Chronological and non-overlapping.
    pub slots: Vec<TimeSlot>,
    pub is_unavailable_due_to_rule: bool,
    /// Ids of rules skipped because they could not be evaluated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_rules: Vec<String>,
}

/// Month-view pre-filter output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabledDays {
    /// Sorted day-of-month numbers (1-based).
    pub disabled_days: Vec<u32>,
    /// Sorted weekdays (0 = Sunday) with a template entry.
    pub available_weekdays: Vec<u8>,
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Returns `None` for a month outside 1..=12 or a year chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Every day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first.month();
        self.first
            .iter_days()
            .take_while(move |d| d.month() == month)
    }

    pub fn next(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}
