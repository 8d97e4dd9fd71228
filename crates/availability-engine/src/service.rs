//! Entry points wiring the repositories and clock to the pure engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dst::LocalDay;
use crate::error::{ConfigurationError, Result};
use crate::model::{DailyAvailability, DeliveryTypeConfig, DeliveryTypeId, DisabledDays, OrganizationId, YearMonth};
use crate::ports::{BookingRepository, Clock, DeliveryTypeRepository};
use crate::{eligibility, engine, input};

pub struct AvailabilityService<R, B, C> {
    delivery_types: R,
    bookings: B,
    clock: C,
}

impl<R, B, C> AvailabilityService<R, B, C>
where
    R: DeliveryTypeRepository,
    B: BookingRepository,
    C: Clock,
{
    pub fn new(delivery_types: R, bookings: B, clock: C) -> Self {
        Self {
            delivery_types,
            bookings,
            clock,
        }
    }

    /// Load and validate a delivery type's configuration.
    ///
    /// A missing record is a [`ConfigurationError::NotFound`], never an empty day.
    pub fn load_config(&self, id: &DeliveryTypeId) -> Result<DeliveryTypeConfig> {
        let record = self
            .delivery_types
            .get_config(id)?
            .ok_or_else(|| ConfigurationError::NotFound(id.clone()))?;
        Ok(record.load()?)
    }

    /// Bookable slots of `date` (a local calendar day in the organization timezone).
    #[tracing::instrument(skip_all, fields(delivery_type = %id, %date))]
    pub fn compute_daily_availability(&self, id: &DeliveryTypeId, date: NaiveDate) -> Result<DailyAvailability> {
        let config = self.load_config(id)?;
        let day = LocalDay::new(date, config.timezone, config.dst_policy);
        let bookings = self.bookings.bookings_on_day(id, &day)?;
        let now = self.clock.now();

        let availability = engine::compute_daily_availability(&engine::DayInputs {
            config: &config,
            date,
            bookings: &bookings,
            now,
        });
        tracing::debug!(
            slots = availability.slots.len(),
            unavailable = availability.is_unavailable_due_to_rule,
            "computed daily availability"
        );
        Ok(availability)
    }

    /// Like [`Self::compute_daily_availability`], parsing a raw id and a
    /// `dd-mm-yyyy` date first.
    pub fn daily_availability_for(&self, raw_id: &str, raw_date: &str) -> Result<DailyAvailability> {
        let id = DeliveryTypeId::parse(raw_id)?;
        let date = input::parse_day(raw_date)?;
        self.compute_daily_availability(&id, date)
    }

    /// Month-view disabled days for a delivery type owned by `organization`.
    ///
    /// A delivery type that belongs to a different organization is reported as
    /// not found.
    #[tracing::instrument(skip_all, fields(delivery_type = %id, organization = %organization, %month))]
    pub fn compute_disabled_days(
        &self,
        id: &DeliveryTypeId,
        organization: &OrganizationId,
        month: YearMonth,
    ) -> Result<DisabledDays> {
        let config = self.load_config(id)?;
        if &config.organization_id != organization {
            return Err(ConfigurationError::NotFound(id.clone()).into());
        }
        let now = self.clock.now();

        let mut counts = BTreeMap::new();
        for date in eligibility::days_needing_counts(&config, month, now) {
            let day = LocalDay::new(date, config.timezone, config.dst_policy);
            let booked = self.bookings.count_bookings_on_day(id, organization, &day)?;
            if booked > 0 {
                counts.insert(date, booked);
            }
        }

        Ok(eligibility::compute_disabled_days(&config, month, now, &counts))
    }

    /// Like [`Self::compute_disabled_days`], parsing raw ids and a `yyyy-mm` month first.
    pub fn disabled_days_for(&self, raw_id: &str, raw_organization: &str, raw_month: &str) -> Result<DisabledDays> {
        let id = DeliveryTypeId::parse(raw_id)?;
        let organization = OrganizationId::parse(raw_organization)?;
        let month = input::parse_year_month(raw_month)?;
        self.compute_disabled_days(&id, &organization, month)
    }
}
