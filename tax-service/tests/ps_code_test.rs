//! PS-code catalog mirroring semantics over the record store.

mod common;

use service_core::error::AppError;
use tax_service::ceretax::{fetch_reference, CeretaxClient, ReferenceKind};
use tax_service::config::CeretaxSettings;
use tax_service::store::TaxStore;

#[tokio::test]
async fn upsert_reports_created_versus_updated() {
    let store = common::store();

    assert!(store.upsert_ps_code("10010100", "General sales").await.unwrap());
    assert!(!store
        .upsert_ps_code("10010100", "General retail sales")
        .await
        .unwrap());

    let codes = store.list_ps_codes(false).await.unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].description, "General retail sales");
    assert!(codes[0].active);
}

#[tokio::test]
async fn codes_missing_from_the_catalog_are_deactivated_not_deleted() {
    let store = common::store();
    store.upsert_ps_code("10010100", "General sales").await.unwrap();
    store.upsert_ps_code("20020200", "Software").await.unwrap();
    store.upsert_ps_code("30030300", "Services").await.unwrap();

    let kept = vec!["10010100".to_string(), "30030300".to_string()];
    let deactivated = store.deactivate_ps_codes_except(&kept).await.unwrap();
    assert_eq!(deactivated, 1);

    let all = store.list_ps_codes(false).await.unwrap();
    assert_eq!(all.len(), 3);
    let active = store.list_ps_codes(true).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|c| c.code != "20020200"));
}

#[tokio::test]
async fn reupserting_a_deactivated_code_reactivates_it() {
    let store = common::store();
    store.upsert_ps_code("20020200", "Software").await.unwrap();
    store
        .deactivate_ps_codes_except(&["10010100".to_string()])
        .await
        .unwrap();
    assert!(store.list_ps_codes(true).await.unwrap().is_empty());

    assert!(!store.upsert_ps_code("20020200", "Software").await.unwrap());
    assert_eq!(store.list_ps_codes(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reference_fetches_are_gated_on_configuration() {
    let store = common::store();
    let client = CeretaxClient::new(CeretaxSettings {
        enabled: false,
        ..common::settings()
    });

    let err = fetch_reference(&client, &store, ReferenceKind::PsCodes)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigError(_)));
}
