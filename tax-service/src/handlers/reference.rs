//! Reference-data endpoints: catalog lookups and PS-code sync.

use crate::ceretax::{self, ReferenceKind};
use crate::models::PsCode;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::instrument;

fn parse_kind(kind: &str) -> Result<ReferenceKind, AppError> {
    match kind {
        "ps-codes" => Ok(ReferenceKind::PsCodes),
        "unit-types" => Ok(ReferenceKind::UnitTypes),
        "business-types" => Ok(ReferenceKind::BusinessTypes),
        "customer-types" => Ok(ReferenceKind::CustomerTypes),
        "seller-types" => Ok(ReferenceKind::SellerTypes),
        other => Err(AppError::BadRequest(anyhow::anyhow!(
            "Unknown reference kind '{}'",
            other
        ))),
    }
}

/// GET /api/reference/:kind
#[instrument(skip(state))]
pub async fn get_reference(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<ceretax::reference::ReferenceEntry>>, AppError> {
    let kind = parse_kind(&kind)?;
    let entries = ceretax::fetch_reference(&state.client, &state.db, kind).await?;
    Ok(Json(entries))
}

#[derive(Debug, Serialize)]
pub struct SyncPsCodesResponse {
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub deactivated: u64,
}

/// POST /api/ps-codes/sync
#[instrument(skip(state))]
pub async fn sync_ps_codes(
    State(state): State<AppState>,
) -> Result<Json<SyncPsCodesResponse>, AppError> {
    let summary = ceretax::sync_ps_codes(&state.client, &state.db).await?;
    Ok(Json(SyncPsCodesResponse {
        fetched: summary.fetched,
        created: summary.created,
        updated: summary.updated,
        deactivated: summary.deactivated,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListPsCodesQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/ps-codes
#[instrument(skip(state, query))]
pub async fn list_ps_codes(
    State(state): State<AppState>,
    Query(query): Query<ListPsCodesQuery>,
) -> Result<Json<Vec<PsCode>>, AppError> {
    use crate::store::TaxStore;
    let codes = state.db.list_ps_codes(query.active_only).await?;
    Ok(Json(codes))
}
