//! In-memory repositories backed by a JSON catalog.
//!
//! The catalog mirrors what the storage layer would return:
//!
//! ```json
//! {
//!   "deliveryTypes": [ { "id": "dock-a", "organizationId": "acme", ... } ],
//!   "bookings": [ { "deliveryTypeId": "dock-a", "organizationId": "acme",
//!                   "start": "2026-03-17T08:00:00Z", "status": "confirmed" } ]
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DeliveryTypeRecord;
use crate::dst::LocalDay;
use crate::error::RepositoryError;
use crate::model::{Booking, BookingStatus, DeliveryTypeId, OrganizationId};
use crate::ports::{BookingRepository, DeliveryTypeRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub delivery_type_id: DeliveryTypeId,
    pub organization_id: OrganizationId,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl BookingRecord {
    fn booking(&self) -> Booking {
        Booking {
            start: self.start,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    delivery_types: Vec<DeliveryTypeRecord>,
    #[serde(default)]
    bookings: Vec<BookingRecord>,
}

/// Delivery types and bookings held in memory. Implements both repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    delivery_types: BTreeMap<DeliveryTypeId, DeliveryTypeRecord>,
    bookings: Vec<BookingRecord>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON catalog. Records are stored as-is; validation happens when a
    /// delivery type is loaded for a computation.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for record in file.delivery_types {
            catalog.insert_delivery_type(record);
        }
        for booking in file.bookings {
            catalog.insert_booking(booking);
        }
        Ok(catalog)
    }

    /// Insert or replace a delivery type.
    pub fn insert_delivery_type(&mut self, record: DeliveryTypeRecord) {
        self.delivery_types.insert(record.id.clone(), record);
    }

    pub fn insert_booking(&mut self, booking: BookingRecord) {
        self.bookings.push(booking);
    }

    fn bookings_for<'a>(
        &'a self,
        id: &'a DeliveryTypeId,
        day: &'a LocalDay,
    ) -> impl Iterator<Item = &'a BookingRecord> + 'a {
        self.bookings
            .iter()
            .filter(move |b| &b.delivery_type_id == id && day.contains(b.start))
    }
}

impl DeliveryTypeRepository for InMemoryCatalog {
    fn get_config(&self, id: &DeliveryTypeId) -> Result<Option<DeliveryTypeRecord>, RepositoryError> {
        Ok(self.delivery_types.get(id).cloned())
    }
}

impl BookingRepository for InMemoryCatalog {
    fn bookings_on_day(&self, id: &DeliveryTypeId, day: &LocalDay) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.bookings_for(id, day).map(BookingRecord::booking).collect())
    }

    fn count_bookings_on_day(
        &self,
        id: &DeliveryTypeId,
        organization: &OrganizationId,
        day: &LocalDay,
    ) -> Result<u32, RepositoryError> {
        let count = self
            .bookings_for(id, day)
            .filter(|b| &b.organization_id == organization && b.status != BookingStatus::Cancelled)
            .count();
        u32::try_from(count).map_err(|_| RepositoryError {
            operation: "count_bookings_on_day",
            message: format!("{} bookings overflow a u32", count),
        })
    }
}
