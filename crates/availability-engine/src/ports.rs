//! Collaborator traits the service layer reads its inputs through.
//!
//! All I/O happens behind these traits; the engine modules never call them.

use chrono::{DateTime, Utc};

use crate::config::DeliveryTypeRecord;
use crate::dst::LocalDay;
use crate::error::RepositoryError;
use crate::model::{Booking, DeliveryTypeId, OrganizationId};

pub trait DeliveryTypeRepository {
    /// The stored record, or `None` when no such delivery type exists.
    fn get_config(&self, id: &DeliveryTypeId) -> Result<Option<DeliveryTypeRecord>, RepositoryError>;
}

pub trait BookingRepository {
    /// Bookings for `id` whose start falls within `day`. May include cancelled ones.
    fn bookings_on_day(&self, id: &DeliveryTypeId, day: &LocalDay) -> Result<Vec<Booking>, RepositoryError>;

    /// Number of non-cancelled bookings for `id` in `organization` on `day`.
    fn count_bookings_on_day(
        &self,
        id: &DeliveryTypeId,
        organization: &OrganizationId,
        day: &LocalDay,
    ) -> Result<u32, RepositoryError>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: DeliveryTypeRepository + ?Sized> DeliveryTypeRepository for &T {
    fn get_config(&self, id: &DeliveryTypeId) -> Result<Option<DeliveryTypeRecord>, RepositoryError> {
        (**self).get_config(id)
    }
}

impl<T: BookingRepository + ?Sized> BookingRepository for &T {
    fn bookings_on_day(&self, id: &DeliveryTypeId, day: &LocalDay) -> Result<Vec<Booking>, RepositoryError> {
        (**self).bookings_on_day(id, day)
    }

    fn count_bookings_on_day(
        &self,
        id: &DeliveryTypeId,
        organization: &OrganizationId,
        day: &LocalDay,
    ) -> Result<u32, RepositoryError> {
        (**self).count_bookings_on_day(id, organization, day)
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for reproducible runs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
