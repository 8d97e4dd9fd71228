//! WASM bindings for availability-engine.
//!
//! Exposes daily slot computation and month-view day disabling to JavaScript
//! via `wasm-bindgen`. Catalogs and results cross the boundary as JSON strings;
//! "now" is always passed in by the caller so results are reproducible.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p availability-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/availability-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/availability_engine_wasm.wasm
//! ```

use availability_engine::input::parse_instant;
use availability_engine::{AvailabilityService, DeliveryTypeRecord, FixedClock, InMemoryCatalog};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryTypeSummaryDto {
    id: String,
    timezone: String,
    available_weekdays: Vec<u8>,
    duration_minutes: u32,
    rule_count: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_catalog(catalog_json: &str) -> Result<InMemoryCatalog, String> {
    InMemoryCatalog::from_json(catalog_json).map_err(|e| format!("Invalid catalog JSON: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn service<'a>(
    catalog: &'a InMemoryCatalog,
    now: &str,
) -> Result<AvailabilityService<&'a InMemoryCatalog, &'a InMemoryCatalog, FixedClock>, String> {
    let now = parse_instant(now).map_err(|e| e.to_string())?;
    Ok(AvailabilityService::new(catalog, catalog, FixedClock(now)))
}

fn daily_availability(catalog_json: &str, delivery_type_id: &str, date: &str, now: &str) -> Result<String, String> {
    let catalog = parse_catalog(catalog_json)?;
    let day = service(&catalog, now)?
        .daily_availability_for(delivery_type_id, date)
        .map_err(|e| e.to_string())?;
    to_json(&day)
}

fn disabled_days(
    catalog_json: &str,
    delivery_type_id: &str,
    organization_id: &str,
    year_month: &str,
    now: &str,
) -> Result<String, String> {
    let catalog = parse_catalog(catalog_json)?;
    let result = service(&catalog, now)?
        .disabled_days_for(delivery_type_id, organization_id, year_month)
        .map_err(|e| e.to_string())?;
    to_json(&result)
}

fn validate(record_json: &str) -> Result<String, String> {
    let record: DeliveryTypeRecord =
        serde_json::from_str(record_json).map_err(|e| format!("Invalid delivery type JSON: {}", e))?;
    let config = record.load().map_err(|e| e.to_string())?;
    to_json(&DeliveryTypeSummaryDto {
        id: config.id.to_string(),
        timezone: config.timezone.name().to_string(),
        available_weekdays: config.available_weekdays(),
        duration_minutes: config.settings.duration_minutes,
        rule_count: config.rules.len(),
    })
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute the bookable slots of one day.
///
/// # Arguments
/// - `catalog_json` -- `{ "deliveryTypes": [...], "bookings": [...] }`
/// - `delivery_type_id` -- id of the delivery type to schedule
/// - `date` -- local day in the organization timezone, `dd-mm-yyyy`
/// - `now` -- current instant, RFC 3339
///
/// Returns a JSON `{ date, slots: [{start, end}], isUnavailableDueToRule }` object.
#[wasm_bindgen(js_name = "computeDailyAvailability")]
pub fn compute_daily_availability(
    catalog_json: &str,
    delivery_type_id: &str,
    date: &str,
    now: &str,
) -> Result<String, JsValue> {
    daily_availability(catalog_json, delivery_type_id, date, now).map_err(|e| JsValue::from_str(&e))
}

/// Compute the disabled day numbers of a month (`yyyy-mm`).
///
/// Returns a JSON `{ disabledDays: [...], availableWeekdays: [...] }` object.
#[wasm_bindgen(js_name = "computeDisabledDays")]
pub fn compute_disabled_days(
    catalog_json: &str,
    delivery_type_id: &str,
    organization_id: &str,
    year_month: &str,
    now: &str,
) -> Result<String, JsValue> {
    disabled_days(catalog_json, delivery_type_id, organization_id, year_month, now)
        .map_err(|e| JsValue::from_str(&e))
}

/// Validate a single delivery type record, rules included.
///
/// Returns a JSON summary on success, or the configuration error message.
#[wasm_bindgen(js_name = "validateDeliveryType")]
pub fn validate_delivery_type(record_json: &str) -> Result<String, JsValue> {
    validate(record_json).map_err(|e| JsValue::from_str(&e))
}
