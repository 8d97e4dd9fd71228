//! RRULE condition vectors.
//!
//! Each rule is anchored at the start of the day under test (local midnight, or
//! the first instant after a midnight DST gap), so a rule applies iff its first
//! occurrence from that anchor falls on the same day.

use availability_engine::condition::condition_applies;
use availability_engine::error::RecurrenceError;
use availability_engine::{Condition, DstPolicy, LocalDay};
use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn applies_in(tz: Tz, rrule: &str, on: NaiveDate) -> bool {
    let day = LocalDay::new(on, tz, DstPolicy::default());
    condition_applies(&Condition::Recurrence(rrule.to_string()), &day)
        .unwrap_or_else(|e| panic!("{rrule} failed on {on}: {e}"))
}

fn applies(rrule: &str, on: NaiveDate) -> bool {
    applies_in(chrono_tz::Europe::Berlin, rrule, on)
}

/// All days of 2026-03-01 ..= 2026-05-31 on which `rrule` applies.
fn matching_days(rrule: &str) -> Vec<NaiveDate> {
    date(2026, 3, 1)
        .iter_days()
        .take_while(|d| *d <= date(2026, 5, 31))
        .filter(|d| applies(rrule, *d))
        .collect()
}

// ---------------------------------------------------------------------------
// FREQ / BYDAY
// ---------------------------------------------------------------------------

#[test]
fn weekly_monday_applies_on_mondays_only() {
    let days = matching_days("FREQ=WEEKLY;BYDAY=MO");
    assert_eq!(days.len(), 13, "March-May 2026 has 13 Mondays");
    assert!(days.iter().all(|d| d.weekday() == Weekday::Mon));
}

#[test]
fn weekly_multiple_weekdays() {
    let days = matching_days("FREQ=WEEKLY;BYDAY=SA,SU");
    assert!(days.iter().all(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    assert_eq!(days.len(), 27);
}

#[test]
fn daily_applies_every_day() {
    assert_eq!(matching_days("FREQ=DAILY").len(), 92);
}

#[test]
fn prefixed_rule_is_accepted() {
    assert!(applies("RRULE:FREQ=WEEKLY;BYDAY=TU", date(2026, 3, 17)));
}

// ---------------------------------------------------------------------------
// MONTHLY / YEARLY
// ---------------------------------------------------------------------------

#[test]
fn monthly_by_month_day() {
    let days = matching_days("FREQ=MONTHLY;BYMONTHDAY=1,15");
    assert_eq!(
        days,
        vec![
            date(2026, 3, 1),
            date(2026, 3, 15),
            date(2026, 4, 1),
            date(2026, 4, 15),
            date(2026, 5, 1),
            date(2026, 5, 15),
        ]
    );
}

#[test]
fn monthly_day_31_skips_short_months() {
    assert!(applies("FREQ=MONTHLY;BYMONTHDAY=31", date(2026, 3, 31)));
    assert!(!applies("FREQ=MONTHLY;BYMONTHDAY=31", date(2026, 4, 30)));
}

#[test]
fn monthly_first_monday() {
    let days = matching_days("FREQ=MONTHLY;BYDAY=1MO");
    assert_eq!(days, vec![date(2026, 3, 2), date(2026, 4, 6), date(2026, 5, 4)]);
}

#[test]
fn yearly_christmas() {
    let rule = "FREQ=YEARLY;BYMONTH=12;BYMONTHDAY=25";
    assert!(applies(rule, date(2026, 12, 25)));
    assert!(applies(rule, date(2027, 12, 25)));
    assert!(!applies(rule, date(2026, 12, 24)));
}

// ---------------------------------------------------------------------------
// INTERVAL / COUNT / UNTIL
// ---------------------------------------------------------------------------

#[test]
fn interval_counts_from_the_anchored_day() {
    // The anchor moves with the target day, so every Monday is the start of a
    // fresh two-week cycle.
    let days = matching_days("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO");
    assert_eq!(days.len(), 13);
}

#[test]
fn count_includes_the_anchor_occurrence() {
    assert!(applies("FREQ=WEEKLY;BYDAY=MO;COUNT=1", date(2026, 3, 16)));
    assert!(!applies("FREQ=WEEKLY;BYDAY=MO;COUNT=1", date(2026, 3, 17)));
}

#[test]
fn until_bounds_the_rule() {
    let rule = "FREQ=WEEKLY;BYDAY=MO;UNTIL=20260331T000000Z";
    assert!(applies(rule, date(2026, 3, 30)));
    assert!(!applies(rule, date(2026, 4, 6)));
}

#[test]
fn date_only_until_is_inclusive_of_that_day() {
    let rule = "FREQ=DAILY;UNTIL=20260320";
    assert!(applies(rule, date(2026, 3, 20)));
    assert!(!applies(rule, date(2026, 3, 21)));
}

#[test]
fn utc_until_is_compared_as_an_instant() {
    // Local midnight of 2026-03-20 in Berlin is 23:00Z on the 19th.
    let rule = "FREQ=DAILY;UNTIL=20260319T230000Z";
    assert!(applies(rule, date(2026, 3, 20)));
    let rule = "FREQ=DAILY;UNTIL=20260319T225959Z";
    assert!(!applies(rule, date(2026, 3, 20)));
}

// ---------------------------------------------------------------------------
// Timezones and DST
// ---------------------------------------------------------------------------

#[test]
fn weekday_is_local_to_the_organization() {
    for tz in [chrono_tz::Pacific::Auckland, chrono_tz::America::Los_Angeles, chrono_tz::UTC] {
        assert!(applies_in(tz, "FREQ=WEEKLY;BYDAY=FR", date(2026, 3, 20)), "{tz}");
        assert!(!applies_in(tz, "FREQ=WEEKLY;BYDAY=FR", date(2026, 3, 21)), "{tz}");
    }
}

#[test]
fn transition_days_are_still_matched() {
    // Spring forward and fall back in Europe/Berlin (both Sundays).
    assert!(applies("FREQ=WEEKLY;BYDAY=SU", date(2026, 3, 29)));
    assert!(applies("FREQ=WEEKLY;BYDAY=SU", date(2026, 10, 25)));
    // US spring forward.
    assert!(applies_in(
        chrono_tz::America::New_York,
        "FREQ=WEEKLY;BYDAY=SU",
        date(2026, 3, 8)
    ));
}

#[test]
fn days_without_a_local_midnight_are_matched() {
    // Clocks jump from 00:00 to 01:00 on these Sundays.
    let gap_days = [
        (chrono_tz::America::Santiago, date(2026, 9, 6)),
        (chrono_tz::America::Havana, date(2026, 3, 8)),
        (chrono_tz::Asia::Beirut, date(2026, 3, 29)),
    ];
    for (tz, on) in gap_days {
        assert!(applies_in(tz, "FREQ=DAILY", on), "{tz} {on}");
        assert!(applies_in(tz, "FREQ=WEEKLY;BYDAY=SU", on), "{tz} {on}");
        assert!(!applies_in(tz, "FREQ=WEEKLY;BYDAY=SA", on), "{tz} {on}");
        assert!(applies_in(tz, "FREQ=DAILY;UNTIL=20260930", on), "{tz} {on}");
    }
    // The day after still anchors at a real midnight.
    assert!(applies_in(chrono_tz::America::Santiago, "FREQ=WEEKLY;BYDAY=MO", date(2026, 9, 7)));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_rules_are_errors() {
    let day = LocalDay::new(date(2026, 3, 17), chrono_tz::UTC, DstPolicy::default());
    for rule in ["", "FREQ=FORTNIGHTLY", "FREQ=WEEKLY;BYDAY=XX", "FREQ=DAILY;UNTIL=soon", "BYDAY=MO"] {
        let result = condition_applies(&Condition::Recurrence(rule.to_string()), &day);
        assert!(result.is_err(), "{rule:?} should not evaluate");
    }
    assert_eq!(
        condition_applies(&Condition::Recurrence(String::new()), &day),
        Err(RecurrenceError::Empty)
    );
}
