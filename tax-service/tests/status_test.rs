//! Status sync: recovering transaction identifiers from the logged
//! calculation responses.

mod common;

use serde_json::json;
use service_core::error::AppError;
use tax_service::ceretax::{sync_document_status, CeretaxClient};
use tax_service::config::CeretaxSettings;
use tax_service::models::NewApiTransaction;
use tax_service::store::TaxStore;

async fn log_response(store: &impl TaxStore, body: serde_json::Value) {
    store
        .log_transaction(&NewApiTransaction {
            name: "Tax Calculation".to_string(),
            endpoint: "https://calc.cert.ceretax.net/sale".to_string(),
            response_body: Some(body.to_string()),
            ..NewApiTransaction::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn fails_when_no_logged_calculation_matches() {
    let store = common::store();
    let client = CeretaxClient::new(common::settings());
    let document = common::document("invoice", "INV/2025/0042");

    log_response(
        &store,
        json!({"invoice": {"invoiceNumber": "INV/2025/9999"}, "ksuid": "k1"}),
    )
    .await;

    let err = sync_document_status(&client, &store, &document)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn fails_when_the_logged_calculation_has_no_identifiers() {
    let store = common::store();
    let client = CeretaxClient::new(common::settings());
    let document = common::document("invoice", "INV/2025/0042");

    log_response(&store, json!({"invoice": {"invoiceNumber": "INV/2025/0042"}})).await;

    let err = sync_document_status(&client, &store, &document)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn matching_and_extraction_happen_before_the_status_call() {
    let store = common::store();
    // disabled client: a ConfigError here proves the scan found the
    // transaction and recovered both identifiers first
    let client = CeretaxClient::new(CeretaxSettings {
        enabled: false,
        ..common::settings()
    });
    let document = common::document("invoice", "INV/2025/0042");

    log_response(
        &store,
        json!({
            "invoice": {"invoiceNumber": "INV/2025/0042"},
            "ksuid": "2Fq8ZsT0cOQm",
            "systemTraceAuditNumber": 481516
        }),
    )
    .await;
    // unparseable noise must be skipped during the scan
    store
        .log_transaction(&NewApiTransaction {
            name: "Tax Calculation".to_string(),
            endpoint: "https://calc.cert.ceretax.net/sale".to_string(),
            response_body: Some("<html>bad gateway</html>".to_string()),
            ..NewApiTransaction::default()
        })
        .await
        .unwrap();

    let err = sync_document_status(&client, &store, &document)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigError(_)));
}
