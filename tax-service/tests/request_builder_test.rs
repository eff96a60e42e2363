//! Request-builder behavior: positional line ids, PS-code fallback chain,
//! context defaults and input validation.

mod common;

use service_core::error::AppError;
use tax_service::ceretax::build_request;

#[test]
fn line_ids_are_positional_and_regenerated() {
    let mut invoice = common::sample_invoice();
    // stale refs from an earlier calculation
    invoice.lines[0].line_ref = Some("7".to_string());
    invoice.lines[1].line_ref = Some("9".to_string());

    let request = build_request(&mut invoice, &common::settings()).unwrap();

    let ids: Vec<&str> = request
        .invoice
        .line_items
        .iter()
        .map(|l| l.line_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(invoice.lines[0].line_ref.as_deref(), Some("1"));
    assert_eq!(invoice.lines[1].line_ref.as_deref(), Some("2"));
}

#[test]
fn ps_code_falls_back_from_line_to_category_to_default() {
    let mut invoice = common::sample_invoice();
    invoice.lines[0].ps_code = Some("20020200".to_string());
    invoice.lines[1].ps_code = Some("   ".to_string());
    invoice.lines[1].category_ps_code = Some("30030300".to_string());

    let request = build_request(&mut invoice, &common::settings()).unwrap();

    assert_eq!(request.invoice.line_items[0].ps_code, "20020200");
    assert_eq!(request.invoice.line_items[1].ps_code, "30030300");

    let mut bare = common::sample_invoice();
    let request = build_request(&mut bare, &common::settings()).unwrap();
    assert_eq!(request.invoice.line_items[0].ps_code, "10010100");
}

#[test]
fn configuration_carries_fixed_context() {
    let mut invoice = common::sample_invoice();
    let request = build_request(&mut invoice, &common::settings()).unwrap();

    let config = &request.configuration;
    assert_eq!(config.calculation_type, "S");
    assert_eq!(config.decimals, 2);
    assert_eq!(config.profile_id, "sales");
    assert_eq!(config.status, "Quote");
    assert!(config.content_year.parse::<i32>().is_ok());
    assert!((1..=12).contains(&config.content_month.parse::<u32>().unwrap()));
    assert!(
        !config
            .response_options
            .pass_through_type
            .exclude_optional_taxes_in_tax_on_tax
    );
}

#[test]
fn quantity_source_depends_on_document_kind() {
    let mut invoice = common::sample_invoice();
    let request = build_request(&mut invoice, &common::settings()).unwrap();
    assert_eq!(request.invoice.line_items[0].units.quantity, 1.0);

    let mut order = common::sample_sales_order();
    let request = build_request(&mut order, &common::settings()).unwrap();
    assert_eq!(request.invoice.line_items[0].units.quantity, 2.0);
}

#[test]
fn empty_documents_are_rejected() {
    let mut invoice = common::sample_invoice();
    invoice.lines.clear();

    let err = build_request(&mut invoice, &common::settings()).unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[test]
fn missing_shipping_address_is_rejected() {
    let mut invoice = common::sample_invoice();
    invoice.ship_to = None;
    let err = build_request(&mut invoice, &common::settings()).unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let mut invoice = common::sample_invoice();
    if let Some(ship_to) = invoice.ship_to.as_mut() {
        ship_to.zip = None;
    }
    let err = build_request(&mut invoice, &common::settings()).unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[test]
fn addresses_default_country_and_blank_fields() {
    let mut invoice = common::sample_invoice();
    if let Some(ship_to) = invoice.ship_to.as_mut() {
        ship_to.country_code = None;
    }
    invoice.ship_from.street2 = Some("Suite 4".to_string());

    let request = build_request(&mut invoice, &common::settings()).unwrap();
    let situs = &request.invoice.line_items[0].situs;
    assert_eq!(situs.ship_to_address.country, "US");
    assert_eq!(situs.ship_from_address.country, "US");
    assert_eq!(situs.ship_from_address.city, "Seattle");
}

#[test]
fn header_reflects_document() {
    let mut invoice = common::sample_invoice();
    let request = build_request(&mut invoice, &common::settings()).unwrap();

    assert_eq!(request.invoice.invoice_number, "INV/2025/0042");
    assert_eq!(request.invoice.invoice_date, "2025-03-14");
    assert_eq!(request.invoice.invoice_total_amount, 300.0);
    assert_eq!(request.invoice.business_type, "01");
    assert_eq!(request.invoice.line_items[0].revenue, 100.0);
    assert_eq!(
        request.invoice.line_items[0].date_of_transaction,
        "2025-03-14"
    );
}

#[test]
fn wire_payload_uses_camel_case_keys() {
    let mut invoice = common::sample_invoice();
    let request = build_request(&mut invoice, &common::settings()).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    assert!(value["configuration"]["calculationType"].is_string());
    assert!(value["configuration"]["profileId"].is_string());
    let item = &value["invoice"]["lineItems"][0];
    assert!(item["lineId"].is_string());
    assert!(item["psCode"].is_string());
    assert!(item["units"]["type"].is_string());
    assert!(item["situs"]["shipFromAddress"]["addressLine1"].is_string());
    assert!(item["situs"]["shipToAddress"]["postalCode"].is_string());
}
