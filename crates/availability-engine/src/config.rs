//! Delivery type records as stored, and their validation into [`DeliveryTypeConfig`].

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dst::DstPolicy;
use crate::error::ConfigurationError;
use crate::model::{DeliveryTypeConfig, DeliveryTypeId, OrganizationId, Settings, WeeklyAvailability, MINUTES_PER_DAY};
use crate::rule;

/// A delivery type as returned by the delivery type repository.
///
/// Everything beyond the ids is optional here; [`DeliveryTypeRecord::load`]
/// decides whether the record is provisioned well enough to schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTypeRecord {
    pub id: DeliveryTypeId,
    pub organization_id: OrganizationId,
    /// IANA name, e.g. `Europe/Berlin`.
    pub timezone: String,
    #[serde(default)]
    pub dst_policy: DstPolicy,
    #[serde(default)]
    pub weekly_availability: Vec<WeeklyAvailability>,
    /// Untyped rule records; see [`crate::rule`].
    #[serde(default)]
    pub rules: Vec<Value>,
    #[serde(default)]
    pub settings: Option<SettingsRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub duration_minutes: Option<u32>,
    pub future_booking_limit_days: Option<u32>,
    pub max_bookings_per_day: Option<u32>,
}

impl DeliveryTypeRecord {
    /// Validate the record into a schedulable configuration.
    ///
    /// # Errors
    /// Returns a [`ConfigurationError`] naming the first provisioning defect found:
    /// unknown timezone, missing or invalid weekly template, missing or zero
    /// duration, or a malformed rule.
    pub fn load(&self) -> Result<DeliveryTypeConfig, ConfigurationError> {
        let id = self.id.clone();
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| ConfigurationError::InvalidTimezone {
                id: id.clone(),
                timezone: self.timezone.clone(),
            })?;

        if self.weekly_availability.is_empty() {
            return Err(ConfigurationError::MissingTemplate(id));
        }
        validate_template(&id, &self.weekly_availability)?;

        let settings = self.settings.unwrap_or_default();
        let duration_minutes = match settings.duration_minutes {
            None => return Err(ConfigurationError::MissingDuration(id)),
            Some(0) => return Err(ConfigurationError::InvalidDuration(id)),
            Some(minutes) => minutes,
        };

        let rules = rule::load_rules(&self.rules, timezone)
            .map_err(|source| ConfigurationError::InvalidRule {
                id: id.clone(),
                source,
            })?;

        Ok(DeliveryTypeConfig {
            id,
            organization_id: self.organization_id.clone(),
            timezone,
            dst_policy: self.dst_policy,
            weekly_availability: self.weekly_availability.clone(),
            rules,
            settings: Settings {
                duration_minutes,
                future_booking_limit_days: settings.future_booking_limit_days,
                max_bookings_per_day: settings.max_bookings_per_day,
            },
        })
    }
}

fn validate_template(
    id: &DeliveryTypeId,
    entries: &[WeeklyAvailability],
) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidTemplate {
        id: id.clone(),
        reason,
    };

    for entry in entries {
        if entry.weekday > 6 {
            return Err(invalid(format!("weekday {} is not in 0..=6", entry.weekday)));
        }
        if entry.end_minute > MINUTES_PER_DAY || entry.start_minute >= entry.end_minute {
            return Err(invalid(format!(
                "window {}..{} on weekday {}",
                entry.start_minute, entry.end_minute, entry.weekday
            )));
        }
    }

    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| (e.weekday, e.start_minute));
    for pair in sorted.windows(2) {
        if pair[0].weekday == pair[1].weekday && pair[0].end_minute > pair[1].start_minute {
            return Err(ConfigurationError::OverlappingTemplate {
                id: id.clone(),
                weekday: pair[0].weekday,
            });
        }
    }
    Ok(())
}
