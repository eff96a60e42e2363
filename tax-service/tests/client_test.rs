//! Client configuration gating: no call leaves the process unless the
//! integration is enabled and a key is present.

mod common;

use serde_json::json;
use service_core::error::AppError;
use tax_service::ceretax::{CeretaxClient, LogContext};
use tax_service::config::CeretaxSettings;

#[tokio::test]
async fn disabled_integration_short_circuits_before_any_network_call() {
    let store = common::store();
    let client = CeretaxClient::new(CeretaxSettings {
        enabled: false,
        ..common::settings()
    });

    let err = client
        .calculate(&store, &json!({}), LogContext::new("Tax Calculation"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigError(_)));
    // nothing reached the transaction log either
    assert!(store.transactions().is_empty());
}

#[tokio::test]
async fn missing_api_key_is_a_configuration_error() {
    let store = common::store();
    let client = CeretaxClient::new(CeretaxSettings {
        api_key: secrecy::Secret::new("   ".to_string()),
        ..common::settings()
    });

    let err = client
        .update_status(&store, &json!({}), LogContext::new("Status Update"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigError(_)));
    assert!(store.transactions().is_empty());
}
