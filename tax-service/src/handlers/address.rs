//! Partner address validation endpoints.

use crate::ceretax;
use crate::services::metrics::ADDRESS_VALIDATIONS_TOTAL;
use crate::store::TaxStore;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use service_core::error::AppError;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ValidateAddressResponse {
    pub partner_id: Uuid,
    pub needs_update: bool,
    pub result: ceretax::AddressValidationResult,
}

/// POST /api/partners/:partner_id/validate-address
///
/// Runs validation, archives the raw result on the partner and reports
/// whether applying it would change anything.
#[instrument(skip(state), fields(partner_id = %partner_id))]
pub async fn validate_address(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<ValidateAddressResponse>, AppError> {
    let partner = state
        .db
        .get_partner(partner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Partner not found")))?;

    let result =
        match ceretax::validate_partner_address(&state.client, &state.db, &partner).await {
            Ok(result) => result,
            Err(e) => {
                ADDRESS_VALIDATIONS_TOTAL.with_label_values(&["error"]).inc();
                return Err(e);
            }
        };
    let needs_update = ceretax::needs_address_update(&state.db, &partner, &result).await?;

    ADDRESS_VALIDATIONS_TOTAL
        .with_label_values(&["validated"])
        .inc();

    Ok(Json(ValidateAddressResponse {
        partner_id,
        needs_update,
        result,
    }))
}

#[derive(Debug, Serialize)]
pub struct AddressStatusResponse {
    pub partner_id: Uuid,
    pub needs_update: bool,
}

/// GET /api/partners/:partner_id/address-status
///
/// Reports whether the stored validation result still has pending changes,
/// without calling the AV API again.
#[instrument(skip(state), fields(partner_id = %partner_id))]
pub async fn address_status(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<AddressStatusResponse>, AppError> {
    let partner = state
        .db
        .get_partner(partner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Partner not found")))?;

    let needs_update = ceretax::stored_address_needs_update(&state.db, &partner).await?;

    Ok(Json(AddressStatusResponse {
        partner_id,
        needs_update,
    }))
}

#[derive(Debug, Serialize)]
pub struct ApplyAddressResponse {
    pub partner_id: Uuid,
    pub updated: bool,
}

/// POST /api/partners/:partner_id/apply-address
///
/// Applies the partner's stored validation result to the address fields.
#[instrument(skip(state), fields(partner_id = %partner_id))]
pub async fn apply_address(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<ApplyAddressResponse>, AppError> {
    let partner = state
        .db
        .get_partner(partner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Partner not found")))?;

    let updated = ceretax::apply_validated_address(&state.db, &partner).await?;
    if updated {
        ADDRESS_VALIDATIONS_TOTAL
            .with_label_values(&["applied"])
            .inc();
    }

    Ok(Json(ApplyAddressResponse {
        partner_id,
        updated,
    }))
}
