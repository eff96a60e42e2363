//! Address validation diff/apply behavior.

mod common;

use serde_json::json;
use service_core::error::AppError;
use tax_service::ceretax::{
    apply_validated_address, compute_address_changes, needs_address_update,
    validate_partner_address, AddressValidationResult, CeretaxClient,
};
use tax_service::config::CeretaxSettings;

fn validation_result(validated: serde_json::Value) -> AddressValidationResult {
    serde_json::from_value(json!({
        "results": [{
            "submittedAddressDetails": {
                "addressLine1": "123 Main St",
                "city": "Sacramento",
                "state": "CA",
                "postalCode": "95814",
                "country": "US"
            },
            "validatedAddressDetails": validated,
            "location": {}
        }]
    }))
    .unwrap()
}

#[tokio::test]
async fn case_and_whitespace_differences_are_not_changes() {
    let store = common::store();
    let partner = common::sample_partner();

    let result = validation_result(json!({
        "addressLine1": "123 MAIN ST",
        "city": "  SACRAMENTO ",
        "state": "ca",
        "postalCode": "95814",
        "country": "us"
    }));

    let changes = compute_address_changes(&store, &partner, &result)
        .await
        .unwrap();
    assert!(changes.is_empty());
    assert!(!needs_address_update(&store, &partner, &result)
        .await
        .unwrap());
}

#[tokio::test]
async fn only_differing_fields_are_written() {
    let store = common::store();
    let partner = common::sample_partner();

    let result = validation_result(json!({
        "addressLine1": "123 Main St",
        "city": "West Sacramento",
        "state": "CA",
        "postalCode": "95814",
        "country": "US"
    }));

    let changes = compute_address_changes(&store, &partner, &result)
        .await
        .unwrap();
    assert_eq!(changes.city.as_deref(), Some("West Sacramento"));
    assert!(changes.street.is_none());
    assert!(changes.state_code.is_none());
    assert!(changes.zip.is_none());
}

#[tokio::test]
async fn plus4_merges_into_the_postal_code() {
    let store = common::store();
    let partner = common::sample_partner();

    let result = validation_result(json!({
        "addressLine1": "123 Main St",
        "city": "Sacramento",
        "state": "CA",
        "postalCode": "95814",
        "plus4": "2404",
        "country": "US"
    }));

    let changes = compute_address_changes(&store, &partner, &result)
        .await
        .unwrap();
    assert_eq!(changes.zip.as_deref(), Some("95814-2404"));
}

#[tokio::test]
async fn unresolvable_state_and_country_are_left_alone() {
    let store = common::store();
    let partner = common::sample_partner();

    // XX resolves against neither reference table
    let result = validation_result(json!({
        "addressLine1": "123 Main St",
        "city": "Sacramento",
        "state": "XX",
        "postalCode": "95814",
        "country": "XX"
    }));

    let changes = compute_address_changes(&store, &partner, &result)
        .await
        .unwrap();
    assert!(changes.state_code.is_none());
    assert!(changes.country_code.is_none());
}

#[tokio::test]
async fn apply_writes_the_stored_result_and_agrees_with_needs_update() {
    let store = common::store();
    let mut partner = common::sample_partner();

    let result = validation_result(json!({
        "addressLine1": "123 MAIN ST",
        "city": "West Sacramento",
        "state": "CA",
        "postalCode": "95814",
        "plus4": "2404",
        "country": "US"
    }));
    partner.last_validation = Some(serde_json::to_string(&result).unwrap());
    store.add_partner(partner.clone());

    assert!(needs_address_update(&store, &partner, &result)
        .await
        .unwrap());
    assert!(apply_validated_address(&store, &partner).await.unwrap());

    let updated = store.partner(partner.partner_id).unwrap();
    assert_eq!(updated.city.as_deref(), Some("West Sacramento"));
    assert_eq!(updated.zip.as_deref(), Some("95814-2404"));
    // street matched after normalization and was not rewritten
    assert_eq!(updated.street.as_deref(), Some("123 Main St"));

    // applying against the already-updated record is a no-op
    assert!(!needs_address_update(&store, &updated, &result)
        .await
        .unwrap());
    assert!(!apply_validated_address(&store, &updated).await.unwrap());
}

#[tokio::test]
async fn apply_with_no_stored_result_is_a_noop() {
    let store = common::store();
    let partner = common::sample_partner();
    store.add_partner(partner.clone());

    assert!(!apply_validated_address(&store, &partner).await.unwrap());

    let mut garbled = common::sample_partner();
    garbled.last_validation = Some("{not json".to_string());
    store.add_partner(garbled.clone());
    assert!(!apply_validated_address(&store, &garbled).await.unwrap());
}

#[tokio::test]
async fn location_updates_come_from_the_result() {
    let store = common::store();
    let partner = common::sample_partner();

    let result: AddressValidationResult = serde_json::from_value(json!({
        "results": [{
            "validatedAddressDetails": {
                "addressLine1": "123 Main St",
                "city": "Sacramento",
                "state": "CA",
                "postalCode": "95814",
                "country": "US"
            },
            "location": {
                "latitude": 38.5816,
                "longitude": -121.4944,
                "plusCode": "84CWHGJ4+56"
            }
        }]
    }))
    .unwrap();

    let changes = compute_address_changes(&store, &partner, &result)
        .await
        .unwrap();
    assert_eq!(changes.latitude, Some(38.5816));
    assert_eq!(changes.longitude, Some(-121.4944));
    assert_eq!(changes.pluscode.as_deref(), Some("84CWHGJ4+56"));
}

#[tokio::test]
async fn validation_is_gated_on_configuration_and_completeness() {
    let store = common::store();

    let disabled = CeretaxClient::new(CeretaxSettings {
        address_validation_enabled: false,
        ..common::settings()
    });
    let partner = common::sample_partner();
    let err = validate_partner_address(&disabled, &store, &partner)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigError(_)));

    let enabled = CeretaxClient::new(common::settings());
    let mut incomplete = common::sample_partner();
    incomplete.city = None;
    let err = validate_partner_address(&enabled, &store, &incomplete)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
