//! Compute the bookable slots of one local calendar day.
//!
//! The computation is a pure function of the delivery type configuration, the
//! day's bookings and the current instant:
//!
//! 1. Base slots come from every weekly template entry matching the weekday.
//! 2. Active rules are ordered by priority, highest first. The sort is stable,
//!    so equal priorities keep their configured order.
//! 3. The ordered rules are folded into a [`RuleOutcome`]. `MakeUnavailable` is
//!    terminal; `ReplaceSlots` overwrites and the fold continues, so the *last*
//!    matching replacement (the lowest priority one) is what survives.
//! 4. Slots starting exactly at a non-cancelled booking are dropped.
//! 5. On "today", slots not starting strictly after now are dropped.

use std::collections::HashSet;
use std::ops::ControlFlow;

use chrono::{DateTime, NaiveDate, Utc};

use crate::condition;
use crate::dst::{local_date, LocalDay};
use crate::model::{Action, Booking, DailyAvailability, DeliveryTypeConfig, SchedulingRule, TimeSlot};
use crate::slots;

/// Everything the engine reads for one computation.
#[derive(Debug, Clone, Copy)]
pub struct DayInputs<'a> {
    pub config: &'a DeliveryTypeConfig,
    /// Local calendar day in the configuration's timezone.
    pub date: NaiveDate,
    /// Bookings for this delivery type on `date`; cancelled ones are ignored.
    pub bookings: &'a [Booking],
    pub now: DateTime<Utc>,
}

/// State of the rule fold for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// No rule matched; the weekly template stands.
    Base,
    /// A `ReplaceSlots` rule matched; these slots replace the template.
    CustomSlots(Vec<TimeSlot>),
    /// A `MakeUnavailable` rule matched. Terminal.
    Unavailable,
}

impl RuleOutcome {
    /// Apply a matching rule's action.
    ///
    /// `Break` ends the fold (`MakeUnavailable`); `Continue` carries the new
    /// outcome to the next rule (`ReplaceSlots`, which discards whatever the
    /// previous outcome held).
    pub fn apply(
        self,
        action: &Action,
        day: &LocalDay,
        base_duration_minutes: u32,
    ) -> ControlFlow<RuleOutcome, RuleOutcome> {
        match action {
            Action::MakeUnavailable => ControlFlow::Break(RuleOutcome::Unavailable),
            Action::ReplaceSlots {
                periods,
                duration_override_minutes,
            } => {
                let duration = duration_override_minutes.unwrap_or(base_duration_minutes);
                let replaced = periods
                    .iter()
                    .flat_map(|period| slots::generate_period_slots(day, period, duration))
                    .collect();
                ControlFlow::Continue(RuleOutcome::CustomSlots(replaced))
            }
        }
    }
}

/// Result of folding the rule list over a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFold {
    pub outcome: RuleOutcome,
    /// Rules that failed to evaluate and were treated as not applying.
    pub skipped_rules: Vec<String>,
}

/// Active rules in evaluation order: priority descending, ties in configured order.
pub fn evaluation_order(rules: &[SchedulingRule]) -> Vec<&SchedulingRule> {
    let mut ordered: Vec<&SchedulingRule> = rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
    ordered
}

/// Fold the priority-ordered active rules over `day`.
///
/// A rule whose condition cannot be evaluated is logged, recorded in
/// [`RuleFold::skipped_rules`] and otherwise ignored.
pub fn apply_rules(rules: &[SchedulingRule], day: &LocalDay, base_duration_minutes: u32) -> RuleFold {
    let mut skipped_rules = Vec::new();

    let flow = evaluation_order(rules)
        .into_iter()
        .try_fold(RuleOutcome::Base, |outcome, rule| {
            match condition::rule_applies(rule, day) {
                Ok(true) => {
                    tracing::debug!(rule_id = %rule.id, priority = rule.priority, date = %day.date(), "rule applies");
                    outcome.apply(&rule.action, day, base_duration_minutes)
                }
                Ok(false) => ControlFlow::Continue(outcome),
                Err(err) => {
                    tracing::warn!(rule_id = %err.rule_id, error = %err.source, date = %day.date(), "skipping rule that cannot be evaluated");
                    skipped_rules.push(err.rule_id);
                    ControlFlow::Continue(outcome)
                }
            }
        });

    let outcome = match flow {
        ControlFlow::Continue(outcome) | ControlFlow::Break(outcome) => outcome,
    };
    RuleFold {
        outcome,
        skipped_rules,
    }
}

/// Slots from every template entry matching the day's weekday, chronological.
pub fn base_slots(config: &DeliveryTypeConfig, day: &LocalDay) -> Vec<TimeSlot> {
    let weekday = day.weekday();
    let mut base: Vec<TimeSlot> = config
        .weekly_availability
        .iter()
        .filter(|entry| entry.matches(weekday))
        .flat_map(|entry| {
            slots::generate_slots(
                day,
                entry.start_minute,
                entry.end_minute,
                config.settings.duration_minutes,
            )
        })
        .collect();
    base.sort();
    base
}

/// Compute the day's available slots.
pub fn compute_daily_availability(inputs: &DayInputs<'_>) -> DailyAvailability {
    let config = inputs.config;
    let day = LocalDay::new(inputs.date, config.timezone, config.dst_policy);

    let fold = apply_rules(&config.rules, &day, config.settings.duration_minutes);
    let (mut slots, is_unavailable_due_to_rule) = match fold.outcome {
        RuleOutcome::Base => (base_slots(config, &day), false),
        RuleOutcome::CustomSlots(custom) => (custom, false),
        RuleOutcome::Unavailable => (Vec::new(), true),
    };

    if !is_unavailable_due_to_rule {
        let booked: HashSet<DateTime<Utc>> = inputs
            .bookings
            .iter()
            .filter(|b| !b.is_cancelled())
            .map(|b| b.start)
            .collect();
        slots.retain(|slot| !booked.contains(&slot.start));
    }

    if local_date(config.timezone, inputs.now) == day.date() {
        slots.retain(|slot| slot.start > inputs.now);
    }

    slots.sort();

    DailyAvailability {
        date: day.date(),
        slots,
        is_unavailable_due_to_rule,
        skipped_rules: fold.skipped_rules,
    }
}
