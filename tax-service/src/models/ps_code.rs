//! PS code (taxability classification) reference model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Locally cached CereTax product/service taxability classification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PsCode {
    pub code: String,
    pub description: String,
    pub active: bool,
    pub updated_utc: DateTime<Utc>,
}
