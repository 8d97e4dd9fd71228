//! Decide whether a rule's condition applies to a local calendar day.

use crate::dst::LocalDay;
use crate::error::{InvalidRuleError, RecurrenceError};
use crate::expander;
use crate::model::{Condition, SchedulingRule};

/// Evaluate a bare condition against `day`.
pub fn condition_applies(condition: &Condition, day: &LocalDay) -> Result<bool, RecurrenceError> {
    let date = day.date();
    match condition {
        Condition::ExactDate(exact) => Ok(*exact == date),
        Condition::DateRange { start, end } => Ok(*start <= date && date <= *end),
        Condition::Recurrence(rrule) => expander::occurs_on(rrule, day),
    }
}

/// Evaluate `rule`'s condition, tagging failures with the rule id.
///
/// Activity is not considered here; callers filter inactive rules first.
pub fn rule_applies(rule: &SchedulingRule, day: &LocalDay) -> Result<bool, InvalidRuleError> {
    condition_applies(&rule.condition, day).map_err(|source| InvalidRuleError {
        rule_id: rule.id.clone(),
        source,
    })
}
