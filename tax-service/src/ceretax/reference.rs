//! Reference-data lookups against the CereTax data API, plus the PS-code
//! sync that mirrors the remote catalog into the local table.

use crate::ceretax::client::{CeretaxClient, LogContext};
use crate::store::TaxStore;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::{info, warn};

/// A reference catalog served by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    PsCodes,
    UnitTypes,
    BusinessTypes,
    CustomerTypes,
    SellerTypes,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::PsCodes => "ps_codes",
            ReferenceKind::UnitTypes => "unit_types",
            ReferenceKind::BusinessTypes => "business_types",
            ReferenceKind::CustomerTypes => "customer_types",
            ReferenceKind::SellerTypes => "seller_types",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            ReferenceKind::PsCodes => "psCodes",
            ReferenceKind::UnitTypes => "unitTypes",
            ReferenceKind::BusinessTypes => "businessTypes",
            ReferenceKind::CustomerTypes => "customerTypes",
            ReferenceKind::SellerTypes => "sellerTypes",
        }
    }

    fn code_key(&self) -> &'static str {
        match self {
            ReferenceKind::PsCodes => "psCode",
            ReferenceKind::UnitTypes => "unitType",
            ReferenceKind::BusinessTypes => "businessType",
            ReferenceKind::CustomerTypes => "customerType",
            ReferenceKind::SellerTypes => "sellerType",
        }
    }

    fn description_key(&self) -> &'static str {
        match self {
            ReferenceKind::PsCodes => "psCodeDescription",
            ReferenceKind::UnitTypes => "unitTypeDescription",
            ReferenceKind::BusinessTypes => "businessTypeDescription",
            ReferenceKind::CustomerTypes => "customerTypeDescription",
            ReferenceKind::SellerTypes => "sellerTypeDescription",
        }
    }
}

/// One code/description pair from a reference catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub code: String,
    pub description: String,
}

/// Fetch one reference catalog. Entries missing their code are skipped.
pub async fn fetch_reference(
    client: &CeretaxClient,
    store: &dyn TaxStore,
    kind: ReferenceKind,
) -> Result<Vec<ReferenceEntry>, AppError> {
    let ctx = LogContext::new(&format!("Reference: {}", kind.as_str()));
    let value = client.fetch_reference(store, kind.path(), ctx).await?;

    let items = match value.as_array() {
        Some(items) => items,
        None => {
            warn!(kind = kind.as_str(), "reference listing was not an array");
            return Ok(Vec::new());
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let code = item
            .get(kind.code_key())
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let code = match code {
            Some(code) => code,
            None => {
                warn!(kind = kind.as_str(), "skipping reference entry without a code");
                continue;
            }
        };
        let description = item
            .get(kind.description_key())
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        entries.push(ReferenceEntry {
            code: code.to_string(),
            description,
        });
    }
    Ok(entries)
}

/// Counters from one PS-code sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PsCodeSyncSummary {
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub deactivated: u64,
}

/// Mirror the remote PS-code catalog: upsert everything fetched, then
/// deactivate local codes the catalog no longer carries.
pub async fn sync_ps_codes(
    client: &CeretaxClient,
    store: &dyn TaxStore,
) -> Result<PsCodeSyncSummary, AppError> {
    let entries = fetch_reference(client, store, ReferenceKind::PsCodes).await?;

    let mut summary = PsCodeSyncSummary {
        fetched: entries.len(),
        ..PsCodeSyncSummary::default()
    };
    for entry in &entries {
        if store.upsert_ps_code(&entry.code, &entry.description).await? {
            summary.created += 1;
        } else {
            summary.updated += 1;
        }
    }

    let codes: Vec<String> = entries.iter().map(|e| e.code.clone()).collect();
    summary.deactivated = store.deactivate_ps_codes_except(&codes).await?;

    info!(
        fetched = summary.fetched,
        created = summary.created,
        updated = summary.updated,
        deactivated = summary.deactivated,
        "ps-code sync complete"
    );
    Ok(summary)
}
