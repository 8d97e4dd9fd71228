//! End-to-end tests through `AvailabilityService` with in-memory repositories.

use availability_engine::error::RuleDefect;
use availability_engine::{
    AvailabilityError, AvailabilityService, BookingRepository, ConfigurationError, DeliveryTypeId,
    DeliveryTypeRecord, DeliveryTypeRepository, FixedClock, InMemoryCatalog, InputError, LocalDay,
    OrganizationId, RepositoryError,
};
use availability_engine::model::Booking;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Berlin;

// ── Helpers ─────────────────────────────────────────────────────────────────

const CATALOG: &str = r#"{
    "deliveryTypes": [
        {
            "id": "dock-a",
            "organizationId": "acme",
            "timezone": "Europe/Berlin",
            "weeklyAvailability": [{ "weekday": 2, "startMinute": 480, "endMinute": 720 }],
            "settings": { "durationMinutes": 60, "maxBookingsPerDay": 2 },
            "rules": [
                {
                    "id": "easter-tuesday",
                    "priority": 10,
                    "isActive": true,
                    "conditions": { "exactDate": "2026-04-07" },
                    "actions": { "makeUnavailable": true }
                }
            ]
        },
        {
            "id": "dock-unprovisioned",
            "organizationId": "acme",
            "timezone": "Europe/Berlin"
        },
        {
            "id": "dock-no-duration",
            "organizationId": "acme",
            "timezone": "Europe/Berlin",
            "weeklyAvailability": [{ "weekday": 2, "startMinute": 480, "endMinute": 720 }]
        },
        {
            "id": "dock-bad-rule",
            "organizationId": "acme",
            "timezone": "Europe/Berlin",
            "weeklyAvailability": [{ "weekday": 2, "startMinute": 480, "endMinute": 720 }],
            "settings": { "durationMinutes": 60 },
            "rules": [{ "id": "nothing", "priority": 1, "isActive": true, "actions": { "makeUnavailable": true } }]
        }
    ],
    "bookings": [
        { "deliveryTypeId": "dock-a", "organizationId": "acme", "start": "2026-03-17T08:00:00Z" },
        { "deliveryTypeId": "dock-a", "organizationId": "acme", "start": "2026-03-17T09:00:00Z", "status": "cancelled" },
        { "deliveryTypeId": "dock-a", "organizationId": "acme", "start": "2026-03-24T07:00:00Z" },
        { "deliveryTypeId": "dock-a", "organizationId": "acme", "start": "2026-03-24T08:00:00Z" }
    ]
}"#;

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_json(CATALOG).expect("catalog should parse")
}

fn monday_evening() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap()
}

fn service(catalog: &InMemoryCatalog, now: DateTime<Utc>) -> AvailabilityService<&InMemoryCatalog, &InMemoryCatalog, FixedClock> {
    AvailabilityService::new(catalog, catalog, FixedClock(now))
}

fn starts(slots: &[availability_engine::TimeSlot]) -> Vec<String> {
    slots
        .iter()
        .map(|s| s.start.with_timezone(&Berlin).format("%H:%M").to_string())
        .collect()
}

// ── Daily availability ──────────────────────────────────────────────────────

#[test]
fn daily_availability_excludes_confirmed_bookings() {
    let catalog = catalog();
    let day = service(&catalog, monday_evening())
        .daily_availability_for("dock-a", "17-03-2026")
        .expect("should compute");

    // 08:00Z is 09:00 Berlin; the cancelled 10:00 booking keeps its slot open.
    assert_eq!(starts(&day.slots), vec!["08:00", "10:00"]);
    assert!(!day.is_unavailable_due_to_rule);
    assert_eq!(day.date, NaiveDate::from_ymd_opt(2026, 3, 17).unwrap());
}

#[test]
fn rule_blocked_day_is_flagged() {
    let catalog = catalog();
    let day = service(&catalog, monday_evening())
        .daily_availability_for("dock-a", "07-04-2026")
        .expect("should compute");
    assert!(day.slots.is_empty());
    assert!(day.is_unavailable_due_to_rule);
}

#[test]
fn today_hides_started_slots() {
    let catalog = catalog();
    // 09:30 Berlin on the 17th.
    let now = Utc.with_ymd_and_hms(2026, 3, 17, 8, 30, 0).unwrap();
    let day = service(&catalog, now)
        .daily_availability_for("dock-a", "17-03-2026")
        .expect("should compute");
    assert_eq!(starts(&day.slots), vec!["10:00"]);
}

#[test]
fn past_day_has_no_today_filter() {
    let catalog = catalog();
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
    let day = service(&catalog, now)
        .daily_availability_for("dock-a", "17-03-2026")
        .expect("should compute");
    assert_eq!(day.slots.len(), 3);
}

#[test]
fn serializes_with_camel_case_keys() {
    let catalog = catalog();
    let day = service(&catalog, monday_evening())
        .daily_availability_for("dock-a", "07-04-2026")
        .expect("should compute");
    let json = serde_json::to_value(&day).unwrap();
    assert_eq!(json["isUnavailableDueToRule"], true);
    assert_eq!(json["slots"], serde_json::json!([]));
    assert!(json.get("skippedRules").is_none());
}

// ── Configuration errors ────────────────────────────────────────────────────

#[test]
fn unknown_delivery_type_is_not_found() {
    let catalog = catalog();
    let err = service(&catalog, monday_evening())
        .daily_availability_for("dock-z", "17-03-2026")
        .unwrap_err();
    assert_eq!(
        err,
        AvailabilityError::Configuration(ConfigurationError::NotFound(DeliveryTypeId::parse("dock-z").unwrap()))
    );
    assert!(err.to_string().contains("not bookable yet"));
}

#[test]
fn missing_template_is_an_error_not_an_empty_day() {
    let catalog = catalog();
    let err = service(&catalog, monday_evening())
        .daily_availability_for("dock-unprovisioned", "17-03-2026")
        .unwrap_err();
    assert!(matches!(
        err,
        AvailabilityError::Configuration(ConfigurationError::MissingTemplate(_))
    ));
}

#[test]
fn missing_duration_is_an_error() {
    let catalog = catalog();
    let err = service(&catalog, monday_evening())
        .daily_availability_for("dock-no-duration", "17-03-2026")
        .unwrap_err();
    assert!(matches!(
        err,
        AvailabilityError::Configuration(ConfigurationError::MissingDuration(_))
    ));
}

#[test]
fn malformed_rule_record_fails_the_load() {
    let catalog = catalog();
    let err = service(&catalog, monday_evening())
        .daily_availability_for("dock-bad-rule", "17-03-2026")
        .unwrap_err();
    match err {
        AvailabilityError::Configuration(ConfigurationError::InvalidRule { source, .. }) => {
            assert_eq!(source.rule_id, "nothing");
            assert_eq!(source.defect, RuleDefect::MissingCondition);
        }
        other => panic!("expected InvalidRule, got {other:?}"),
    }
}

// ── Input errors ────────────────────────────────────────────────────────────

#[test]
fn bad_inputs_are_rejected() {
    let catalog = catalog();
    let svc = service(&catalog, monday_evening());

    assert_eq!(
        svc.daily_availability_for("dock-a", "2026-03-17"),
        Err(AvailabilityError::Input(InputError::InvalidDate("2026-03-17".into())))
    );
    assert!(matches!(
        svc.daily_availability_for("  ", "17-03-2026"),
        Err(AvailabilityError::Input(InputError::EmptyId(_)))
    ));
    assert_eq!(
        svc.disabled_days_for("dock-a", "acme", "2026-13"),
        Err(AvailabilityError::Input(InputError::InvalidYearMonth("2026-13".into())))
    );
}

// ── Disabled days ───────────────────────────────────────────────────────────

#[test]
fn disabled_days_use_booking_counts() {
    let catalog = catalog();
    let result = service(&catalog, monday_evening())
        .disabled_days_for("dock-a", "acme", "2026-03")
        .expect("should compute");

    // Tuesdays in March 2026: 3, 10, 17, 24, 31. The 3rd and 10th are past,
    // the 24th has two confirmed bookings (cap 2), the 17th only one.
    let open: Vec<u32> = (1..=31).filter(|d| !result.disabled_days.contains(d)).collect();
    assert_eq!(open, vec![17, 31]);
    assert_eq!(result.available_weekdays, vec![2]);
}

#[test]
fn disabled_days_for_another_organization_is_not_found() {
    let catalog = catalog();
    let err = service(&catalog, monday_evening())
        .disabled_days_for("dock-a", "globex", "2026-03")
        .unwrap_err();
    assert!(matches!(
        err,
        AvailabilityError::Configuration(ConfigurationError::NotFound(_))
    ));
}

// ── Repository failures ─────────────────────────────────────────────────────

struct BrokenBookings;

impl BookingRepository for BrokenBookings {
    fn bookings_on_day(&self, _: &DeliveryTypeId, _: &LocalDay) -> Result<Vec<Booking>, RepositoryError> {
        Err(RepositoryError {
            operation: "bookings_on_day",
            message: "connection reset".into(),
        })
    }

    fn count_bookings_on_day(
        &self,
        _: &DeliveryTypeId,
        _: &OrganizationId,
        _: &LocalDay,
    ) -> Result<u32, RepositoryError> {
        Err(RepositoryError {
            operation: "count_bookings_on_day",
            message: "connection reset".into(),
        })
    }
}

#[test]
fn repository_failures_propagate() {
    let catalog = catalog();
    let svc = AvailabilityService::new(&catalog, BrokenBookings, FixedClock(monday_evening()));

    let err = svc.daily_availability_for("dock-a", "17-03-2026").unwrap_err();
    assert!(matches!(err, AvailabilityError::Repository(ref e) if e.operation == "bookings_on_day"));

    let err = svc.disabled_days_for("dock-a", "acme", "2026-03").unwrap_err();
    assert_eq!(err.to_string(), "count_bookings_on_day failed: connection reset");
}

#[test]
fn inserted_records_are_visible() {
    let mut catalog = InMemoryCatalog::new();
    let record: DeliveryTypeRecord = serde_json::from_value(serde_json::json!({
        "id": "pickup",
        "organizationId": "acme",
        "timezone": "UTC",
        "weeklyAvailability": [{ "weekday": 0, "startMinute": 0, "endMinute": 1440 }],
        "settings": { "durationMinutes": 240 }
    }))
    .unwrap();
    catalog.insert_delivery_type(record);

    let id = DeliveryTypeId::parse("pickup").unwrap();
    assert!(catalog.get_config(&id).unwrap().is_some());

    let day = service(&catalog, monday_evening())
        .daily_availability_for("pickup", "22-03-2026")
        .expect("should compute");
    // 24:00 is a valid end; 20:00-24:00 does not fit under the strict bound.
    assert_eq!(day.slots.len(), 5);
}
