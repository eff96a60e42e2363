//! Address validation against the CereTax AV API, and the diff/apply logic
//! that folds a validated address back onto the partner record.
//!
//! The same diff drives both "does this partner need an update" and the
//! actual write, so the two can never disagree.

use crate::ceretax::client::{CeretaxClient, LogContext};
use crate::models::{AddressChanges, Partner};
use crate::store::TaxStore;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressValidationResult {
    pub results: Vec<AddressResultEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressResultEntry {
    pub submitted_address_details: AddressDetails,
    pub validated_address_details: AddressDetails,
    pub location: GeoLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDetails {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub plus4: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub plus_code: Option<String>,
}

/// Trim-and-uppercase normalization used for all textual comparisons.
fn norm(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_uppercase()
}

fn differs(incoming: Option<&str>, current: Option<&str>) -> bool {
    norm(incoming) != norm(current)
}

/// Validate the partner's address against the AV API, archive the raw
/// result on the partner and return the parsed response.
pub async fn validate_partner_address(
    client: &CeretaxClient,
    store: &dyn TaxStore,
    partner: &Partner,
) -> Result<AddressValidationResult, AppError> {
    if !client.settings().address_validation_enabled {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "CereTax address validation is disabled"
        )));
    }

    let complete = [
        &partner.street,
        &partner.city,
        &partner.state_code,
        &partner.zip,
    ]
    .iter()
    .all(|v| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false));
    if !complete {
        return Err(AppError::ValidationError(anyhow::anyhow!(
            "partner {} address is incomplete: street, city, state and postal code are required",
            partner.name
        )));
    }

    fn text(v: &Option<String>) -> String {
        v.as_deref().unwrap_or("").trim().to_string()
    }
    let params: Vec<(&str, String)> = vec![
        ("addressLine1", text(&partner.street)),
        ("addressLine2", text(&partner.street2)),
        ("city", text(&partner.city)),
        ("state", text(&partner.state_code)),
        ("postalCode", text(&partner.zip)),
        (
            "country",
            partner
                .country_code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("US")
                .to_string(),
        ),
        ("latitude", partner.latitude.unwrap_or(0.0).to_string()),
        ("longitude", partner.longitude.unwrap_or(0.0).to_string()),
    ];

    let ctx = LogContext::new("Address Validation");
    let response = client.validate_address(store, &params, ctx).await?;
    let parsed: AddressValidationResult = response.json()?;

    store
        .save_partner_validation(partner.partner_id, &response.body)
        .await?;

    Ok(parsed)
}

/// Diff the validated address against the partner record.
///
/// Comparisons are normalized, so casing and whitespace differences do not
/// count as changes. Country and state are only rewritten when the incoming
/// code resolves against the local reference tables; an unresolvable code
/// leaves the stored value untouched. Postal code and plus4 merge into
/// `zip-plus4` before comparing.
pub async fn compute_address_changes(
    store: &dyn TaxStore,
    partner: &Partner,
    result: &AddressValidationResult,
) -> Result<AddressChanges, AppError> {
    let mut changes = AddressChanges::default();
    let entry = match result.results.first() {
        Some(entry) => entry,
        None => return Ok(changes),
    };
    let validated = &entry.validated_address_details;

    if let Some(street) = validated.address_line1.as_deref() {
        if differs(Some(street), partner.street.as_deref()) {
            changes.street = Some(street.trim().to_string());
        }
    }
    if let Some(street2) = validated.address_line2.as_deref() {
        if differs(Some(street2), partner.street2.as_deref()) {
            changes.street2 = Some(street2.trim().to_string());
        }
    }
    if let Some(city) = validated.city.as_deref() {
        if differs(Some(city), partner.city.as_deref()) {
            changes.city = Some(city.trim().to_string());
        }
    }

    if let Some(zip) = validated.postal_code.as_deref().map(str::trim) {
        if !zip.is_empty() {
            let full = match validated.plus4.as_deref().map(str::trim) {
                Some(plus4) if !plus4.is_empty() => format!("{zip}-{plus4}"),
                _ => zip.to_string(),
            };
            if differs(Some(&full), partner.zip.as_deref()) {
                changes.zip = Some(full);
            }
        }
    }

    if let Some(country) = validated.country.as_deref().map(str::trim) {
        if !country.is_empty() && differs(Some(country), partner.country_code.as_deref()) {
            if store.country_exists(country).await? {
                changes.country_code = Some(country.to_uppercase());
            } else {
                warn!(country, partner = %partner.name, "validated country not in reference table, keeping stored value");
            }
        }
    }
    if let Some(state) = validated.state.as_deref().map(str::trim) {
        if !state.is_empty() && differs(Some(state), partner.state_code.as_deref()) {
            if store.state_exists(state).await? {
                changes.state_code = Some(state.to_uppercase());
            } else {
                warn!(state, partner = %partner.name, "validated state not in reference table, keeping stored value");
            }
        }
    }

    let location = &entry.location;
    if let Some(latitude) = location.latitude {
        if (partner.latitude.unwrap_or(0.0) - latitude).abs() > 1e-9 {
            changes.latitude = Some(latitude);
        }
    }
    if let Some(longitude) = location.longitude {
        if (partner.longitude.unwrap_or(0.0) - longitude).abs() > 1e-9 {
            changes.longitude = Some(longitude);
        }
    }
    if let Some(plus_code) = location.plus_code.as_deref() {
        if differs(Some(plus_code), partner.pluscode.as_deref()) {
            changes.pluscode = Some(plus_code.trim().to_string());
        }
    }

    Ok(changes)
}

/// Whether applying the partner's stored validation result would change
/// anything. Shares the diff with [`apply_validated_address`], so a `false`
/// here guarantees an apply would be a no-op.
pub async fn needs_address_update(
    store: &dyn TaxStore,
    partner: &Partner,
    result: &AddressValidationResult,
) -> Result<bool, AppError> {
    Ok(!compute_address_changes(store, partner, result).await?.is_empty())
}

/// Whether the partner's most recent stored validation result still has
/// pending changes. A partner with no stored result, or an unparseable one,
/// has nothing to apply.
pub async fn stored_address_needs_update(
    store: &dyn TaxStore,
    partner: &Partner,
) -> Result<bool, AppError> {
    let raw = match partner.last_validation.as_deref() {
        Some(raw) => raw,
        None => return Ok(false),
    };
    let result: AddressValidationResult = match serde_json::from_str(raw) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, partner = %partner.name, "stored validation result is unparseable");
            return Ok(false);
        }
    };
    needs_address_update(store, partner, &result).await
}

/// Apply the partner's most recent stored validation result. Returns true
/// when fields were written. A missing or unparseable stored result is a
/// no-op.
pub async fn apply_validated_address(
    store: &dyn TaxStore,
    partner: &Partner,
) -> Result<bool, AppError> {
    let raw = match partner.last_validation.as_deref() {
        Some(raw) => raw,
        None => return Ok(false),
    };
    let result: AddressValidationResult = match serde_json::from_str(raw) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, partner = %partner.name, "stored validation result is unparseable");
            return Ok(false);
        }
    };

    let changes = compute_address_changes(store, partner, &result).await?;
    if changes.is_empty() {
        return Ok(false);
    }

    store
        .apply_address_changes(partner.partner_id, &changes)
        .await?;
    info!(partner = %partner.name, "applied validated address");
    Ok(true)
}
