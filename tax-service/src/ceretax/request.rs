//! CereTax calculation request wire format and builder.

use crate::config::CeretaxSettings;
use crate::models::{AddressFields, DocumentKind, DocumentLine, TaxableDocument};
use chrono::{Datelike, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationRequest {
    pub configuration: RequestConfiguration,
    pub invoice: RequestInvoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfiguration {
    pub status: String,
    pub calculation_type: String,
    pub response_options: ResponseOptions,
    pub content_year: String,
    pub content_month: String,
    pub decimals: u32,
    pub profile_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOptions {
    pub pass_through_type: PassThroughType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassThroughType {
    pub exclude_optional_taxes_in_tax_on_tax: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInvoice {
    pub business_type: String,
    pub customer_type: String,
    pub seller_type: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub invoice_total_amount: f64,
    pub customer_account: String,
    pub line_items: Vec<RequestLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLineItem {
    pub line_id: String,
    pub ps_code: String,
    pub revenue: f64,
    pub units: Units,
    pub date_of_transaction: String,
    pub situs: Situs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Units {
    pub quantity: f64,
    #[serde(rename = "type")]
    pub unit_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situs {
    pub ship_from_address: WireAddress,
    pub ship_to_address: WireAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&AddressFields> for WireAddress {
    fn from(a: &AddressFields) -> Self {
        fn text(v: &Option<String>) -> String {
            v.as_deref().unwrap_or("").trim().to_string()
        }
        WireAddress {
            address_line1: text(&a.street),
            city: text(&a.city),
            state: text(&a.state_code),
            postal_code: text(&a.zip),
            country: a
                .country_code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("US")
                .to_string(),
        }
    }
}

/// PS-code priority chain: the line's own code, then its product-category
/// code, then the configured default.
fn resolve_ps_code(line: &DocumentLine, settings: &CeretaxSettings) -> String {
    fn filled(v: &Option<String>) -> Option<String> {
        v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
    }
    filled(&line.ps_code)
        .or_else(|| filled(&line.category_ps_code))
        .unwrap_or_else(|| settings.default_ps_code.clone())
}

/// Build the full calculation request for a document.
///
/// Assigns fresh positional line identifiers ("1".."N") onto the document's
/// lines before building the payload; callers persist them via
/// [`crate::store::TaxStore::save_line_refs`] so the reconciler can match
/// the response back.
pub fn build_request(
    document: &mut dyn TaxableDocument,
    settings: &CeretaxSettings,
) -> Result<TaxCalculationRequest, AppError> {
    if document.lines().is_empty() {
        return Err(AppError::ValidationError(anyhow::anyhow!(
            "document {} has no line items to calculate tax for",
            document.document_name()
        )));
    }

    let ship_to = match document.ship_to() {
        Some(addr) if addr.is_resolvable() => addr.clone(),
        _ => {
            return Err(AppError::ValidationError(anyhow::anyhow!(
                "document {} has no resolvable shipping address",
                document.document_name()
            )))
        }
    };

    for (index, line) in document.lines_mut().iter_mut().enumerate() {
        line.line_ref = Some((index + 1).to_string());
    }

    let ship_from = WireAddress::from(document.ship_from());
    let ship_to = WireAddress::from(&ship_to);
    let transaction_date = document.document_date().format("%Y-%m-%d").to_string();

    let line_items = document
        .lines()
        .iter()
        .map(|line| {
            let quantity = document.line_quantity(line);
            RequestLineItem {
                // set above, positional and never absent here
                line_id: line.line_ref.clone().unwrap_or_default(),
                ps_code: resolve_ps_code(line, settings),
                revenue: line.price_subtotal.to_f64().unwrap_or(0.0),
                units: Units {
                    quantity: quantity.to_f64().unwrap_or(0.0),
                    unit_type: settings.unit_type.clone(),
                },
                date_of_transaction: transaction_date.clone(),
                situs: Situs {
                    ship_from_address: ship_from.clone(),
                    ship_to_address: ship_to.clone(),
                },
            }
        })
        .collect();

    let now = Utc::now();
    let kind_label = match document.kind() {
        DocumentKind::Invoice => "invoice",
        DocumentKind::SaleOrder => "sale order",
    };
    tracing::debug!(
        document = document.document_name(),
        kind = kind_label,
        lines = document.lines().len(),
        "built tax calculation request"
    );

    Ok(TaxCalculationRequest {
        configuration: RequestConfiguration {
            status: document.status().as_str().to_string(),
            calculation_type: "S".to_string(),
            response_options: ResponseOptions {
                pass_through_type: PassThroughType {
                    exclude_optional_taxes_in_tax_on_tax: false,
                },
            },
            content_year: now.year().to_string(),
            content_month: now.month().to_string(),
            decimals: 2,
            profile_id: settings.profile_id.clone(),
        },
        invoice: RequestInvoice {
            business_type: settings.business_type.clone(),
            customer_type: settings.customer_type.clone(),
            seller_type: settings.seller_type.clone(),
            invoice_number: document.document_name().to_string(),
            invoice_date: transaction_date,
            invoice_total_amount: document.untaxed_total().to_f64().unwrap_or(0.0),
            customer_account: document.customer_account(),
            line_items,
        },
    })
}
