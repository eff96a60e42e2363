//! Shared fixtures for tax-service integration tests.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use secrecy::Secret;
use tax_service::config::CeretaxSettings;
use tax_service::models::{
    AddressFields, Document, DocumentLine, Invoice, Partner, SalesOrder,
};
use tax_service::store::memory::MemoryStore;
use uuid::Uuid;

pub fn settings() -> CeretaxSettings {
    CeretaxSettings {
        enabled: true,
        api_key: Secret::new("test-key".to_string()),
        logging_enabled: true,
        address_validation_enabled: true,
        ..CeretaxSettings::default()
    }
}

pub fn store() -> MemoryStore {
    let store = MemoryStore::new();
    store.add_country("US");
    store.add_state("CA");
    store.add_state("WA");
    store
}

pub fn company_address() -> AddressFields {
    AddressFields {
        street: Some("500 Warehouse Way".to_string()),
        street2: None,
        city: Some("Seattle".to_string()),
        state_code: Some("WA".to_string()),
        country_code: Some("US".to_string()),
        zip: Some("98101".to_string()),
    }
}

pub fn customer_address() -> AddressFields {
    AddressFields {
        street: Some("123 Main St".to_string()),
        street2: None,
        city: Some("Sacramento".to_string()),
        state_code: Some("CA".to_string()),
        country_code: Some("US".to_string()),
        zip: Some("95814".to_string()),
    }
}

pub fn line(document_id: Uuid, subtotal: &str, sort_order: i32) -> DocumentLine {
    DocumentLine {
        line_id: Uuid::new_v4(),
        document_id,
        line_ref: None,
        ps_code: None,
        category_ps_code: None,
        quantity: Some(Decimal::ONE),
        ordered_quantity: Some(Decimal::TWO),
        price_subtotal: subtotal.parse().unwrap(),
        tax_amount: Decimal::ZERO,
        tax_response: None,
        sort_order,
        created_utc: Utc::now(),
    }
}

pub fn document(kind: &str, name: &str) -> Document {
    Document {
        document_id: Uuid::new_v4(),
        kind: kind.to_string(),
        name: name.to_string(),
        state: "draft".to_string(),
        document_date: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
        untaxed_total: Decimal::new(30000, 2),
        tax_total: Decimal::ZERO,
        partner_id: Uuid::new_v4(),
        company_partner_id: Uuid::new_v4(),
        tax_annotation: None,
        created_utc: Utc::now(),
    }
}

pub fn sample_invoice() -> Invoice {
    let doc = document("invoice", "INV/2025/0042");
    let lines = vec![
        line(doc.document_id, "100.00", 0),
        line(doc.document_id, "200.00", 1),
    ];
    Invoice {
        document: doc,
        ship_from: company_address(),
        ship_to: Some(customer_address()),
        lines,
    }
}

pub fn sample_sales_order() -> SalesOrder {
    let doc = document("sale_order", "SO/2025/0007");
    let lines = vec![line(doc.document_id, "150.00", 0)];
    SalesOrder {
        document: doc,
        ship_from: company_address(),
        ship_to: Some(customer_address()),
        lines,
    }
}

pub fn sample_partner() -> Partner {
    Partner {
        partner_id: Uuid::new_v4(),
        name: "Acme Corp".to_string(),
        street: Some("123 Main St".to_string()),
        street2: None,
        city: Some("Sacramento".to_string()),
        state_code: Some("CA".to_string()),
        country_code: Some("US".to_string()),
        zip: Some("95814".to_string()),
        latitude: None,
        longitude: None,
        pluscode: None,
        last_validation: None,
        created_utc: Utc::now(),
    }
}
