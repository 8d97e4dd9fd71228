//! # availability-engine
//!
//! Deterministic computation of bookable time slots for delivery categories.
//!
//! Given a delivery type's weekly template, its prioritized override rules
//! (one-off blocks, RRULE-based recurring blocks, custom working periods), the
//! bookings already taken and the current instant, the engine computes which
//! fixed-duration slots of a local calendar day can still be booked. All date
//! logic runs in the organization's IANA timezone via `chrono-tz`; recurrence
//! rules are evaluated with the `rrule` crate.
//!
//! The engine is pure and synchronous. Loading configuration and bookings is
//! the job of the [`ports`] traits, wired together by [`service`].
//!
//! ## Modules
//!
//! - [`model`]: domain types (rules, templates, slots, bookings)
//! - [`config`]: delivery type records and their validation
//! - [`rule`]: untyped rule records → typed [`SchedulingRule`]s
//! - [`dst`]: local days and DST gap/overlap policies
//! - [`expander`]: RRULE evaluation against a single day
//! - [`condition`]: rule condition evaluation
//! - [`slots`]: working window → fixed-duration slots
//! - [`engine`]: the day availability computation
//! - [`eligibility`]: month-view day disabling
//! - [`input`]: boundary parsing of dates, months and instants
//! - [`ports`] / [`memory`]: repository traits and in-memory adapters
//! - [`service`]: entry points over the repositories
//! - [`error`]: error types

pub mod condition;
pub mod config;
pub mod dst;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod expander;
pub mod input;
pub mod memory;
pub mod model;
pub mod ports;
pub mod rule;
pub mod service;
pub mod slots;

pub use config::DeliveryTypeRecord;
pub use dst::{DstPolicy, LocalDay};
pub use engine::{compute_daily_availability, DayInputs, RuleOutcome};
pub use eligibility::compute_disabled_days;
pub use error::{AvailabilityError, ConfigurationError, InputError, InvalidRuleError, RepositoryError};
pub use memory::InMemoryCatalog;
pub use model::{
    Action, AvailabilityPeriod, Booking, BookingStatus, Condition, DailyAvailability, DeliveryTypeConfig,
    DeliveryTypeId, DisabledDays, OrganizationId, SchedulingRule, TimeOfDay, TimeSlot, WeeklyAvailability,
    YearMonth,
};
pub use ports::{BookingRepository, Clock, DeliveryTypeRepository, FixedClock, SystemClock};
pub use service::AvailabilityService;
