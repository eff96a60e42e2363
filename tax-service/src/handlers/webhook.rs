//! Inbound CereTax webhook stub.
//!
//! Events are only archived to the transaction log for now. A failed
//! archive write reports an error payload but never a 5xx, so the sender
//! does not retry forever.

use crate::models::NewApiTransaction;
use crate::store::TaxStore;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{instrument, warn};

/// POST /webhooks/ceretax
#[instrument(skip(state, payload))]
pub async fn ceretax_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let entry = NewApiTransaction {
        name: "Webhook".to_string(),
        endpoint: "/webhooks/ceretax".to_string(),
        request_body: Some(payload.to_string()),
        ..NewApiTransaction::default()
    };
    match state.db.log_transaction(&entry).await {
        Ok(()) => Json(json!({"status": "ok"})),
        Err(e) => {
            warn!(error = %e, "failed to archive webhook event");
            Json(json!({"status": "error"}))
        }
    }
}
