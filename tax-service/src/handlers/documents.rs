//! Document lifecycle endpoints.
//!
//! Posting and cancelling push the new status to CereTax after the state
//! change. That push is best effort: a failure lands as an annotation on
//! the document and never blocks the state change itself.

use crate::ceretax;
use crate::store::TaxStore;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use service_core::error::AppError;
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DocumentStateResponse {
    pub document_id: Uuid,
    pub name: String,
    pub state: String,
    pub status_synced: bool,
}

async fn change_state_and_sync(
    state: &AppState,
    document_id: Uuid,
    new_state: &str,
) -> Result<Json<DocumentStateResponse>, AppError> {
    let document = state
        .db
        .set_document_state(document_id, new_state)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Document not found")))?;

    let mut status_synced = false;
    if state.config.ceretax.enabled {
        match ceretax::sync_document_status(&state.client, &state.db, &document).await {
            Ok(_) => status_synced = true,
            Err(e) => {
                warn!(document = %document.name, error = %e, "status sync failed");
                let note = format!("CereTax status update failed: {e}");
                if let Err(annotate_err) =
                    state.db.annotate_document(document.document_id, &note).await
                {
                    warn!(
                        document = %document.name,
                        error = %annotate_err,
                        "failed to annotate document"
                    );
                }
            }
        }
    }

    Ok(Json(DocumentStateResponse {
        document_id: document.document_id,
        name: document.name,
        state: document.state,
        status_synced,
    }))
}

/// POST /api/documents/:document_id/post
#[instrument(skip(state), fields(document_id = %document_id))]
pub async fn post_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentStateResponse>, AppError> {
    change_state_and_sync(&state, document_id, "posted").await
}

/// POST /api/documents/:document_id/cancel
#[instrument(skip(state), fields(document_id = %document_id))]
pub async fn cancel_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentStateResponse>, AppError> {
    change_state_and_sync(&state, document_id, "cancel").await
}

/// POST /api/documents/:document_id/reset-draft
#[instrument(skip(state), fields(document_id = %document_id))]
pub async fn reset_to_draft(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentStateResponse>, AppError> {
    change_state_and_sync(&state, document_id, "draft").await
}
