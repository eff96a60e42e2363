//! Jurisdiction-level tax detail model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One jurisdiction-level tax returned for a document line.
///
/// Upsert identity key: `(line_id, description, rate, total_tax)`. Rows are
/// updated in place on a key match and never deleted automatically.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxDetail {
    pub tax_detail_id: Uuid,
    pub line_id: Uuid,
    pub description: String,
    pub tax_authority: Option<String>,
    pub tax_level: Option<String>,
    pub tax_type: Option<String>,
    pub tax_class: Option<String>,
    pub rate: Decimal,
    pub calc_base: Decimal,
    pub total_tax: Decimal,
    pub taxable: Option<String>,
    pub geocode: Option<String>,
    pub exempt_amount: Option<String>,
    pub percent_taxable: Option<String>,
    pub non_taxable_amount: Option<String>,
    pub payload: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating or updating a tax detail.
#[derive(Debug, Clone)]
pub struct NewTaxDetail {
    pub line_id: Uuid,
    pub description: String,
    pub tax_authority: Option<String>,
    pub tax_level: Option<String>,
    pub tax_type: Option<String>,
    pub tax_class: Option<String>,
    pub rate: Decimal,
    pub calc_base: Decimal,
    pub total_tax: Decimal,
    pub taxable: Option<String>,
    pub geocode: Option<String>,
    pub exempt_amount: Option<String>,
    pub percent_taxable: Option<String>,
    pub non_taxable_amount: Option<String>,
    pub payload: String,
}
