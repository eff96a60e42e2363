//! Transaction status sync: tell CereTax when a document's lifecycle state
//! changes (posting, cancellation).
//!
//! The original calculation response carries the `ksuid` and
//! `systemTraceAuditNumber` that identify the transaction upstream. Those
//! are recovered from the transaction log rather than stored on the
//! document, so status sync works for any document that was calculated
//! while logging was on.

use crate::ceretax::client::{CeretaxClient, LogContext, RawResponse};
use crate::models::{Document, DocumentStatus};
use crate::store::TaxStore;
use serde_json::{json, Value};
use service_core::error::AppError;
use tracing::debug;

const SCAN_LIMIT: i64 = 1000;

/// Push the document's coarse status to CereTax.
///
/// Scans recent logged responses (newest first) for the calculation whose
/// `invoice.invoiceNumber` matches this document, recovers its identifiers
/// and POSTs the status update. Callers at workflow boundaries treat a
/// failure here as non-blocking.
pub async fn sync_document_status(
    client: &CeretaxClient,
    store: &dyn TaxStore,
    document: &Document,
) -> Result<RawResponse, AppError> {
    let bodies = store.recent_transaction_responses(SCAN_LIMIT).await?;

    let matched = bodies.iter().find_map(|body| {
        let value: Value = serde_json::from_str(body).ok()?;
        let number = value
            .get("invoice")
            .and_then(|inv| inv.get("invoiceNumber"))
            .and_then(Value::as_str)?;
        (number == document.name).then_some(value)
    });
    let transaction = matched.ok_or_else(|| {
        AppError::NotFound(anyhow::anyhow!(
            "no logged CereTax calculation found for document {}",
            document.name
        ))
    })?;

    let ksuid = transaction
        .get("ksuid")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::ValidationError(anyhow::anyhow!(
                "logged calculation for {} carries no ksuid",
                document.name
            ))
        })?;
    let audit_number = match transaction.get("systemTraceAuditNumber") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(AppError::ValidationError(anyhow::anyhow!(
                "logged calculation for {} carries no systemTraceAuditNumber",
                document.name
            )))
        }
    };

    let status = DocumentStatus::from_state(&document.state);
    debug!(
        document = %document.name,
        status = status.as_str(),
        "pushing transaction status"
    );

    let payload = json!({
        "ksuid": ksuid,
        "systemTraceAuditNumber": audit_number,
        "transactionStatus": status.as_str(),
    });
    let ctx = LogContext::for_document("Status Update", document.document_id);
    client.update_status(store, &payload, ctx).await
}
