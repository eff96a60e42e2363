//! Tax calculation endpoint: build the request, call CereTax and reconcile
//! the response onto the document.

use crate::ceretax::{self, LogContext, TaxCalculationResponse};
use crate::services::metrics::{RECONCILIATION_WARNINGS_TOTAL, TAX_CALCULATIONS_TOTAL};
use crate::store::TaxStore;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub document_id: Uuid,
    pub lines_matched: usize,
    pub lines_unmatched: usize,
    pub details_written: usize,
    pub codes_resolved: usize,
    pub warnings: usize,
}

/// POST /api/documents/:document_id/calculate
#[instrument(skip(state), fields(document_id = %document_id))]
pub async fn calculate_document_tax(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<CalculateResponse>, AppError> {
    let mut document = state.db.load_taxable_document(document_id).await?;
    let kind = document.kind().as_str();

    let request = match ceretax::build_request(document.as_mut(), &state.config.ceretax) {
        Ok(request) => request,
        Err(e) => {
            TAX_CALCULATIONS_TOTAL
                .with_label_values(&[kind, "validation_error"])
                .inc();
            return Err(e);
        }
    };

    let refs: Vec<(Uuid, String)> = document
        .lines()
        .iter()
        .filter_map(|l| l.line_ref.clone().map(|r| (l.line_id, r)))
        .collect();
    state.db.save_line_refs(&refs).await?;

    let payload = serde_json::to_value(&request)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode request: {}", e)))?;
    let ctx = LogContext::for_document("Tax Calculation", document_id);
    let raw = match state.client.calculate(&state.db, &payload, ctx).await {
        Ok(raw) => raw,
        Err(e) => {
            let outcome = match &e {
                AppError::TransportError(_) => "transport_error",
                AppError::ApiError { .. } => "api_error",
                _ => "error",
            };
            TAX_CALCULATIONS_TOTAL
                .with_label_values(&[kind, outcome])
                .inc();
            return Err(e);
        }
    };
    let response: TaxCalculationResponse = raw.json()?;

    let summary = ceretax::apply_response(document.as_ref(), &response, &state.db).await?;

    TAX_CALCULATIONS_TOTAL
        .with_label_values(&[kind, "success"])
        .inc();
    if summary.warnings > 0 {
        RECONCILIATION_WARNINGS_TOTAL
            .with_label_values(&[kind])
            .inc_by(summary.warnings as f64);
    }

    info!(
        document = document.document_name(),
        matched = summary.lines_matched,
        warnings = summary.warnings,
        "tax calculation complete"
    );

    Ok(Json(CalculateResponse {
        document_id,
        lines_matched: summary.lines_matched,
        lines_unmatched: summary.lines_unmatched,
        details_written: summary.details_written,
        codes_resolved: summary.codes_resolved,
        warnings: summary.warnings,
    }))
}
