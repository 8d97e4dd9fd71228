//! Local-day arithmetic and DST transition policies.
//!
//! All weekday and calendar-day comparisons happen in the organization's IANA
//! timezone, which is carried explicitly in [`LocalDay`] rather than read from
//! any process-wide setting.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::model::MINUTES_PER_DAY;

/// Policy for window starts that fall into a DST gap (e.g. 02:30 on spring-forward day).
///
/// Ambiguous times (fall-back overlap) always resolve to the earliest instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DstPolicy {
    /// Drop windows whose start does not exist on that day.
    Skip,
    /// Move to the first valid instant after the gap.
    #[default]
    ShiftForward,
}

/// Resolve a local wall-clock time in `tz` to an instant.
///
/// Returns `None` only for a non-existent time under [`DstPolicy::Skip`].
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_valid_after(tz, local),
        },
    }
}

// Transitions happen on minute boundaries and gaps never exceed a day.
fn first_valid_after(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    (1..=i64::from(MINUTES_PER_DAY)).find_map(|m| {
        tz.from_local_datetime(&(local + Duration::minutes(m)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// The local calendar day of `instant` in `tz`.
pub fn local_date(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// A calendar day in a specific timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDay {
    date: NaiveDate,
    tz: Tz,
    policy: DstPolicy,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl LocalDay {
    pub fn new(date: NaiveDate, tz: Tz, policy: DstPolicy) -> Self {
        let start = midnight(tz, date);
        let end = date.succ_opt().map_or(start + Duration::days(1), |next| midnight(tz, next));
        Self {
            date,
            tz,
            policy,
            start,
            end,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn policy(&self) -> DstPolicy {
        self.policy
    }

    /// Local midnight starting the day.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Local midnight starting the next day (exclusive bound).
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Resolve a minute of this day (0..=1440) with the given policy.
    ///
    /// Minute 1440 is the next local midnight.
    pub fn at_minute(&self, minute: u16, policy: DstPolicy) -> Option<DateTime<Utc>> {
        if minute >= MINUTES_PER_DAY {
            return Some(self.end);
        }
        let local = self.date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
        resolve_local(self.tz, local, policy)
    }
}

fn midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    resolve_local(tz, local, DstPolicy::ShiftForward).unwrap_or_else(|| Utc.from_utc_datetime(&local))
}
