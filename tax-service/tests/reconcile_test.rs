//! Reconciler behavior: matching, detail upserts, tax-code resolution and
//! degradation on bad input.

mod common;

use rust_decimal::Decimal;
use serde_json::json;
use tax_service::ceretax::{apply_response, build_request, TaxCalculationResponse};
use tax_service::models::Invoice;
use tax_service::store::TaxStore;

fn ready_invoice() -> Invoice {
    let mut invoice = common::sample_invoice();
    build_request(&mut invoice, &common::settings()).unwrap();
    invoice
}

fn response_with_taxes(line_ref: &str, total: f64, taxes: serde_json::Value) -> TaxCalculationResponse {
    serde_json::from_value(json!({
        "invoice": {
            "invoiceNumber": "INV/2025/0042",
            "lineItems": [{
                "lineId": line_ref,
                "totalTaxLine": total,
                "taxes": taxes
            }]
        }
    }))
    .unwrap()
}

fn state_tax(rate: f64, total: f64) -> serde_json::Value {
    json!({
        "description": "State Tax",
        "rate": rate,
        "totalTax": total,
        "calculationBaseAmt": 100.0,
        "taxAuthorityName": "California",
        "taxLevelDesc": "State",
        "taxTypeDesc": "Sales",
        "taxTypeClassDesc": "Sales and Use",
        "taxable": "Y",
        "geocode": {"geocode": "0605000000"}
    })
}

#[tokio::test]
async fn applies_line_tax_details_and_codes() {
    let invoice = ready_invoice();
    let store = common::store();
    let line_id = invoice.lines[0].line_id;

    let response = response_with_taxes(
        "1",
        0.72,
        json!([
            state_tax(0.06, 0.6),
            {"description": "City Tax", "rate": 0.012, "totalTax": 0.12}
        ]),
    );
    let summary = apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(summary.lines_matched, 1);
    assert_eq!(summary.details_written, 2);
    assert_eq!(summary.codes_resolved, 2);
    assert_eq!(summary.warnings, 0);

    let (amount, raw) = store.line_tax(line_id).unwrap();
    assert_eq!(amount, "0.72".parse::<Decimal>().unwrap());
    assert!(raw.contains("totalTaxLine"));

    let details = store.tax_details();
    assert_eq!(details.len(), 2);
    let state = details.iter().find(|d| d.description == "State Tax").unwrap();
    assert_eq!(state.tax_authority.as_deref(), Some("California"));
    assert_eq!(state.tax_level.as_deref(), Some("State"));
    assert_eq!(state.geocode.as_deref(), Some("0605000000"));
    // detail keeps the wire-scale rate
    assert_eq!(state.rate, "0.06".parse::<Decimal>().unwrap());

    let codes = store.tax_codes();
    assert_eq!(codes.len(), 2);
    let state_code = codes.iter().find(|c| c.name == "State Tax").unwrap();
    assert_eq!(state_code.rate, Decimal::from(6));
    let city_code = codes.iter().find(|c| c.name == "City Tax").unwrap();
    assert_eq!(city_code.rate, "1.2".parse::<Decimal>().unwrap());

    assert_eq!(store.line_tax_codes(line_id).len(), 2);
    assert_eq!(
        store.recomputed_documents(),
        vec![invoice.document.document_id]
    );
}

#[tokio::test]
async fn fractional_and_percent_rates_resolve_to_one_code() {
    let invoice = ready_invoice();
    let store = common::store();

    let response =
        response_with_taxes("1", 1.2, json!([state_tax(0.06, 0.6), state_tax(6.0, 0.6)]));
    apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(store.tax_codes().len(), 1);
    assert_eq!(store.tax_codes()[0].rate, Decimal::from(6));
}

#[tokio::test]
async fn name_collisions_get_numeric_suffixes() {
    let invoice = ready_invoice();
    let store = common::store();
    store
        .insert_tax_code("State Tax", Decimal::from(5))
        .await
        .unwrap();

    let response = response_with_taxes("1", 0.6, json!([state_tax(0.06, 0.6)]));
    apply_response(&invoice, &response, &store).await.unwrap();

    let response = response_with_taxes("1", 0.7, json!([state_tax(0.07, 0.7)]));
    apply_response(&invoice, &response, &store).await.unwrap();

    let mut names: Vec<String> = store.tax_codes().iter().map(|c| c.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["State Tax", "State Tax_2", "State Tax_3"]);
}

#[tokio::test]
async fn reapplying_the_same_response_is_idempotent() {
    let invoice = ready_invoice();
    let store = common::store();

    let response = response_with_taxes("1", 0.72, json!([state_tax(0.06, 0.6)]));
    apply_response(&invoice, &response, &store).await.unwrap();
    let first_details = store.tax_details().len();
    let first_codes = store.tax_codes().len();
    let first_links = store.line_tax_codes(invoice.lines[0].line_id);

    apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(store.tax_details().len(), first_details);
    assert_eq!(store.tax_codes().len(), first_codes);
    assert_eq!(store.line_tax_codes(invoice.lines[0].line_id), first_links);
}

#[tokio::test]
async fn malformed_tax_entries_are_skipped_not_fatal() {
    let invoice = ready_invoice();
    let store = common::store();

    // first entry has no rate and must not poison the second
    let response = response_with_taxes(
        "1",
        0.6,
        json!([
            {"description": "Broken Tax", "totalTax": 0.1},
            state_tax(0.06, 0.6)
        ]),
    );
    let summary = apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.details_written, 1);
    assert_eq!(store.tax_details().len(), 1);
    assert_eq!(store.tax_details()[0].description, "State Tax");
}

#[tokio::test]
async fn unmatched_response_lines_are_discarded() {
    let invoice = ready_invoice();
    let store = common::store();

    let response = response_with_taxes("99", 0.6, json!([state_tax(0.06, 0.6)]));
    let summary = apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(summary.lines_matched, 0);
    assert_eq!(summary.lines_unmatched, 1);
    assert!(store.tax_details().is_empty());
    assert!(store.recomputed_documents().is_empty());
}

#[tokio::test]
async fn tax_code_set_is_replaced_wholesale() {
    let invoice = ready_invoice();
    let store = common::store();
    let line_id = invoice.lines[0].line_id;

    let response = response_with_taxes(
        "1",
        0.72,
        json!([state_tax(0.06, 0.6), {"description": "City Tax", "rate": 0.012, "totalTax": 0.12}]),
    );
    apply_response(&invoice, &response, &store).await.unwrap();
    assert_eq!(store.line_tax_codes(line_id).len(), 2);

    // next calculation returns only one tax
    let response = response_with_taxes("1", 0.6, json!([state_tax(0.06, 0.6)]));
    apply_response(&invoice, &response, &store).await.unwrap();
    assert_eq!(store.line_tax_codes(line_id).len(), 1);
}

#[tokio::test]
async fn missing_description_falls_back_to_default_name() {
    let invoice = ready_invoice();
    let store = common::store();

    let response = response_with_taxes("1", 0.6, json!([{"rate": 0.06, "totalTax": 0.6}]));
    apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(store.tax_details()[0].description, "CereTax");
    assert_eq!(store.tax_codes()[0].name, "CereTax");
}

#[tokio::test]
async fn detail_write_failures_do_not_stop_the_line() {
    let invoice = ready_invoice();
    let store = common::store();
    let line_id = invoice.lines[0].line_id;
    store.fail_tax_details(true);

    let response = response_with_taxes(
        "1",
        0.72,
        json!([state_tax(0.06, 0.6), {"description": "City Tax", "rate": 0.012, "totalTax": 0.12}]),
    );
    let summary = apply_response(&invoice, &response, &store).await.unwrap();

    // both detail writes fail, both taxes still resolve to codes
    assert_eq!(summary.details_written, 0);
    assert_eq!(summary.warnings, 2);
    assert_eq!(summary.codes_resolved, 2);
    assert!(store.line_tax(line_id).is_some());
    assert_eq!(store.line_tax_codes(line_id).len(), 2);
    assert_eq!(
        store.recomputed_documents(),
        vec![invoice.document.document_id]
    );
}

#[tokio::test]
async fn code_write_failures_do_not_stop_the_line() {
    let invoice = ready_invoice();
    let store = common::store();
    let line_id = invoice.lines[0].line_id;
    store.fail_tax_codes(true);

    let response = response_with_taxes(
        "1",
        0.72,
        json!([state_tax(0.06, 0.6), {"description": "City Tax", "rate": 0.012, "totalTax": 0.12}]),
    );
    let summary = apply_response(&invoice, &response, &store).await.unwrap();

    // details still land even though no code can be created
    assert_eq!(summary.details_written, 2);
    assert_eq!(summary.codes_resolved, 0);
    assert_eq!(summary.warnings, 2);
    assert_eq!(store.tax_details().len(), 2);
    assert!(store.line_tax_codes(line_id).is_empty());
}

#[tokio::test]
async fn recompute_failure_degrades_to_a_warning() {
    let invoice = ready_invoice();
    let store = common::store();
    store.fail_recompute(true);

    let response = response_with_taxes("1", 0.6, json!([state_tax(0.06, 0.6)]));
    let summary = apply_response(&invoice, &response, &store).await.unwrap();

    assert_eq!(summary.lines_matched, 1);
    assert_eq!(summary.warnings, 1);
    assert_eq!(store.tax_details().len(), 1);
}
