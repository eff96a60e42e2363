//! Document line model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One taxable line of an invoice or sales order.
///
/// `line_ref` is the request-scoped identifier assigned 1..N on every
/// calculation; it is not the persistent record id and is regenerated each
/// time a request is built.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentLine {
    pub line_id: Uuid,
    pub document_id: Uuid,
    pub line_ref: Option<String>,
    pub ps_code: Option<String>,
    pub category_ps_code: Option<String>,
    pub quantity: Option<Decimal>,
    pub ordered_quantity: Option<Decimal>,
    pub price_subtotal: Decimal,
    pub tax_amount: Decimal,
    pub tax_response: Option<String>,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}
