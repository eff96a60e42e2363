//! CereTax calculation response wire format.
//!
//! Line items are typed; the per-line `taxes` array stays as raw JSON values
//! so one malformed constituent tax never poisons the rest of the response.
//! The reconciler parses each entry individually.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxCalculationResponse {
    pub invoice: Option<ResponseInvoice>,
    pub ksuid: Option<String>,
    pub system_trace_audit_number: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseInvoice {
    pub invoice_number: Option<String>,
    pub line_items: Vec<ResponseLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseLineItem {
    pub line_id: Option<Value>,
    pub total_tax_line: Option<f64>,
    pub taxes: Vec<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ResponseLineItem {
    /// The line identifier as a string, however the service encoded it.
    pub fn line_ref(&self) -> Option<String> {
        match &self.line_id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One constituent tax from a line's `taxes` array. `rate` is mandatory;
/// an entry without it is treated as malformed and skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituentTax {
    pub rate: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_tax: Option<f64>,
    #[serde(default)]
    pub calculation_base_amt: Option<f64>,
    #[serde(default)]
    pub tax_authority_name: Option<String>,
    #[serde(default)]
    pub tax_level_desc: Option<String>,
    #[serde(default)]
    pub tax_type_desc: Option<String>,
    #[serde(default)]
    pub tax_type_class_desc: Option<String>,
    #[serde(default)]
    pub taxable: Option<Value>,
    #[serde(default)]
    pub geocode: Option<Geocode>,
    #[serde(default)]
    pub exempt_amount: Option<Value>,
    #[serde(default)]
    pub percent_taxable: Option<Value>,
    #[serde(default)]
    pub non_taxable_amount: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Geocode {
    pub geocode: Option<String>,
}

/// Render an optional JSON scalar as display text for storage.
pub(crate) fn scalar_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}
