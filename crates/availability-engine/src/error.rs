//! Error types for availability-engine operations.
//!
//! The taxonomy separates provisioning defects ([`ConfigurationError`]) from
//! caller mistakes ([`InputError`]) and from per-rule evaluation failures
//! ([`InvalidRuleError`]), which are recovered locally and never reach the caller.

use thiserror::Error;

use crate::model::DeliveryTypeId;

/// The delivery type exists (or was asked for) but cannot be scheduled.
///
/// Display text reads as "not bookable yet" so callers can surface it verbatim,
/// distinct from a day that legitimately has zero slots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("delivery type {0} is not bookable yet: it has not been configured")]
    NotFound(DeliveryTypeId),

    #[error("delivery type {0} is not bookable yet: no weekly availability template")]
    MissingTemplate(DeliveryTypeId),

    #[error("delivery type {0} is not bookable yet: no slot duration configured")]
    MissingDuration(DeliveryTypeId),

    #[error("delivery type {0} is not bookable yet: slot duration must be positive")]
    InvalidDuration(DeliveryTypeId),

    #[error("delivery type {id} is not bookable yet: unknown timezone '{timezone}'")]
    InvalidTimezone { id: DeliveryTypeId, timezone: String },

    #[error("delivery type {id} is not bookable yet: invalid weekly availability ({reason})")]
    InvalidTemplate { id: DeliveryTypeId, reason: String },

    #[error("delivery type {id} is not bookable yet: overlapping weekly availability on weekday {weekday}")]
    OverlappingTemplate { id: DeliveryTypeId, weekday: u8 },

    #[error("delivery type {id} is not bookable yet: {source}")]
    InvalidRule {
        id: DeliveryTypeId,
        #[source]
        source: RuleLoadError,
    },
}

/// A stored rule record that cannot be turned into a typed rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed rule '{rule_id}': {defect}")]
pub struct RuleLoadError {
    pub rule_id: String,
    pub defect: RuleDefect,
}

/// What is wrong with a stored rule record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleDefect {
    #[error("unreadable record: {0}")]
    Unreadable(String),

    #[error("no condition")]
    MissingCondition,

    #[error("more than one condition ({0})")]
    MultipleConditions(String),

    #[error("no action")]
    MissingAction,

    #[error("more than one action")]
    MultipleActions,

    #[error("makeUnavailable must be true when present")]
    DisabledMakeUnavailable,

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("date range starts after it ends")]
    InvertedRange,

    #[error("replaceSlots has no periods")]
    NoPeriods,

    #[error("invalid period {0}")]
    InvalidPeriod(String),

    #[error("replaceSlots periods overlap")]
    OverlappingPeriods,

    #[error("duration override must be positive")]
    ZeroDurationOverride,
}

/// A single rule failed to evaluate for a given day.
///
/// Recovered by treating the rule as not applying; see
/// [`engine::apply_rules`](crate::engine::apply_rules).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rule '{rule_id}' could not be evaluated: {source}")]
pub struct InvalidRuleError {
    pub rule_id: String,
    #[source]
    pub source: RecurrenceError,
}

/// Failures while evaluating an RRULE string against a day.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("empty RRULE string")]
    Empty,

    #[error("invalid UNTIL '{0}'")]
    InvalidUntil(String),

    #[error("invalid RRULE: {0}")]
    Parse(String),
}

/// Caller-supplied values that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date '{0}': expected dd-mm-yyyy")]
    InvalidDate(String),

    #[error("invalid month '{0}': expected yyyy-mm")]
    InvalidYearMonth(String),

    #[error("invalid instant '{0}': expected RFC 3339")]
    InvalidInstant(String),

    #[error("{0} id must not be empty")]
    EmptyId(&'static str),
}

/// A storage collaborator failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct RepositoryError {
    pub operation: &'static str,
    pub message: String,
}

/// Everything a service entry point can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
