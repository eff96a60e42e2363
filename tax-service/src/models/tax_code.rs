//! Named tax code model used by the host tax engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named, rated tax definition shared across all documents.
///
/// Rates are always stored as percentages rounded to 4 decimal places. A
/// lookup matches when the name is equal and the rate is within 0.0001 of
/// the stored value; otherwise a new code is created under a suffixed name
/// (`name_2`, `name_3`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxCode {
    pub tax_code_id: Uuid,
    pub name: String,
    pub rate: Decimal,
    pub created_utc: DateTime<Utc>,
}
