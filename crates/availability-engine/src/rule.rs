//! Load stored rule records into typed [`SchedulingRule`]s.
//!
//! Rules are persisted as loosely shaped JSON:
//!
//! ```json
//! {
//!   "id": "xmas",
//!   "description": "Closed over Christmas",
//!   "priority": 100,
//!   "isActive": true,
//!   "conditions": { "dateRange": { "start": "2026-12-24", "end": "2026-12-26" } },
//!   "actions": { "makeUnavailable": true }
//! }
//! ```
//!
//! `conditions` must hold exactly one of `exactDate`, `dateRange`, `rrule`;
//! `actions` exactly one of `makeUnavailable`, `replaceSlots`. Anything else is
//! rejected here so the evaluator only ever sees well-formed rules. RRULE text is
//! deliberately not parsed at load; see [`crate::expander`].

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;

use crate::dst::local_date;
use crate::error::{RuleDefect, RuleLoadError};
use crate::model::{Action, AvailabilityPeriod, Condition, SchedulingRule, TimeOfDay, MINUTES_PER_DAY};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleRecord {
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: i32,
    #[serde(default = "active_by_default")]
    is_active: bool,
    #[serde(default)]
    conditions: ConditionsRecord,
    #[serde(default)]
    actions: ActionsRecord,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConditionsRecord {
    exact_date: Option<String>,
    date_range: Option<DateRangeRecord>,
    rrule: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DateRangeRecord {
    start: String,
    end: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ActionsRecord {
    make_unavailable: Option<bool>,
    replace_slots: Option<ReplaceSlotsRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceSlotsRecord {
    #[serde(default)]
    periods: Vec<AvailabilityPeriod>,
    duration_override_minutes: Option<u32>,
}

/// Convert one stored rule record into a typed rule.
///
/// Calendar dates may be stored as `YYYY-MM-DD` or as RFC 3339 instants; instants
/// are reduced to their local calendar day in `tz`.
pub fn load_rule(record: &Value, tz: Tz) -> Result<SchedulingRule, RuleLoadError> {
    let rule_id = record
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string();
    let fail = |defect| RuleLoadError {
        rule_id: rule_id.clone(),
        defect,
    };

    let parsed = RuleRecord::deserialize(record)
        .map_err(|e| fail(RuleDefect::Unreadable(e.to_string())))?;
    let condition = parsed.conditions.into_condition(tz).map_err(&fail)?;
    let action = parsed.actions.into_action().map_err(&fail)?;

    Ok(SchedulingRule {
        id: parsed.id,
        description: parsed.description,
        priority: parsed.priority,
        is_active: parsed.is_active,
        condition,
        action,
    })
}

/// Load every record, stopping at the first malformed one.
pub fn load_rules(records: &[Value], tz: Tz) -> Result<Vec<SchedulingRule>, RuleLoadError> {
    records.iter().map(|record| load_rule(record, tz)).collect()
}

impl ConditionsRecord {
    fn into_condition(self, tz: Tz) -> Result<Condition, RuleDefect> {
        let mut present = Vec::new();
        if self.exact_date.is_some() {
            present.push("exactDate");
        }
        if self.date_range.is_some() {
            present.push("dateRange");
        }
        if self.rrule.is_some() {
            present.push("rrule");
        }
        if present.len() > 1 {
            return Err(RuleDefect::MultipleConditions(present.join(", ")));
        }

        if let Some(raw) = self.exact_date {
            return parse_calendar_date(&raw, tz).map(Condition::ExactDate);
        }
        if let Some(range) = self.date_range {
            let start = parse_calendar_date(&range.start, tz)?;
            let end = parse_calendar_date(&range.end, tz)?;
            if start > end {
                return Err(RuleDefect::InvertedRange);
            }
            return Ok(Condition::DateRange { start, end });
        }
        self.rrule
            .map(Condition::Recurrence)
            .ok_or(RuleDefect::MissingCondition)
    }
}

impl ActionsRecord {
    fn into_action(self) -> Result<Action, RuleDefect> {
        match (self.make_unavailable, self.replace_slots) {
            (Some(_), Some(_)) => Err(RuleDefect::MultipleActions),
            (None, None) => Err(RuleDefect::MissingAction),
            (Some(true), None) => Ok(Action::MakeUnavailable),
            (Some(false), None) => Err(RuleDefect::DisabledMakeUnavailable),
            (None, Some(replace)) => {
                validate_periods(&replace.periods)?;
                if replace.duration_override_minutes == Some(0) {
                    return Err(RuleDefect::ZeroDurationOverride);
                }
                Ok(Action::ReplaceSlots {
                    periods: replace.periods,
                    duration_override_minutes: replace.duration_override_minutes,
                })
            }
        }
    }
}

fn parse_calendar_date(raw: &str, tz: Tz) -> Result<NaiveDate, RuleDefect> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| local_date(tz, instant.with_timezone(&Utc)))
        .map_err(|_| RuleDefect::InvalidDate(raw.to_string()))
}

fn valid_start(time: TimeOfDay) -> bool {
    time.hour < 24 && time.minute < 60
}

fn valid_end(time: TimeOfDay) -> bool {
    valid_start(time) || (time.minute_of_day() == MINUTES_PER_DAY && time.minute == 0)
}

fn validate_periods(periods: &[AvailabilityPeriod]) -> Result<(), RuleDefect> {
    if periods.is_empty() {
        return Err(RuleDefect::NoPeriods);
    }
    for period in periods {
        if !valid_start(period.start_time)
            || !valid_end(period.end_time)
            || period.start_time >= period.end_time
        {
            return Err(RuleDefect::InvalidPeriod(period.to_string()));
        }
    }

    let mut sorted = periods.to_vec();
    sorted.sort_by_key(|p| p.start_time);
    if sorted
        .windows(2)
        .any(|pair| pair[0].end_time > pair[1].start_time)
    {
        return Err(RuleDefect::OverlappingPeriods);
    }
    Ok(())
}
