//! API transaction log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit record of one call to the CereTax API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiTransaction {
    pub transaction_id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub request_headers: Option<String>,
    pub request_body: Option<String>,
    pub status_code: Option<i32>,
    pub response_body: Option<String>,
    pub document_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

/// Input for persisting a transaction log entry.
#[derive(Debug, Clone, Default)]
pub struct NewApiTransaction {
    pub name: String,
    pub endpoint: String,
    pub request_headers: Option<String>,
    pub request_body: Option<String>,
    pub status_code: Option<i32>,
    pub response_body: Option<String>,
    pub document_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
}
