//! Response reconciliation: fold a CereTax calculation response back into
//! stored lines, jurisdiction-level tax details and host tax codes.
//!
//! Failures here degrade, they do not abort. A malformed constituent tax or
//! a failed detail write is logged, counted as a warning and skipped; the
//! rest of the response still lands.

use crate::ceretax::response::{scalar_text, ConstituentTax, TaxCalculationResponse};
use crate::models::{TaxCode, TaxableDocument};
use crate::store::TaxStore;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

const FALLBACK_TAX_NAME: &str = "CereTax";

/// Counters describing what one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub lines_matched: usize,
    pub lines_unmatched: usize,
    pub details_written: usize,
    pub codes_resolved: usize,
    pub warnings: usize,
}

/// Normalize a wire rate onto the host percentage scale.
///
/// Fractional rates (0 < r < 1) arrive as ratios and are scaled by 100;
/// anything else is already a percentage. Rounded to four decimals.
pub(crate) fn normalize_rate(raw: f64) -> Decimal {
    let rate = if raw > 0.0 && raw < 1.0 { raw * 100.0 } else { raw };
    Decimal::from_f64(rate).unwrap_or(Decimal::ZERO).round_dp(4)
}

fn decimal(raw: Option<f64>) -> Decimal {
    raw.and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO)
}

/// Apply a calculation response to the document's stored lines.
///
/// Response line items are matched to lines by the positional identifiers
/// assigned at request-build time; items with no matching line are
/// discarded. For each matched line the aggregate tax and raw payload are
/// stored, each parseable constituent tax is upserted as a detail row and
/// resolved to a host tax code, and the line's tax-code set is replaced
/// wholesale with the resolved set. One recomputation runs at the end and
/// is itself best effort.
pub async fn apply_response(
    document: &dyn TaxableDocument,
    response: &TaxCalculationResponse,
    store: &dyn TaxStore,
) -> Result<ReconciliationSummary, AppError> {
    let mut summary = ReconciliationSummary::default();

    let lines_by_ref: HashMap<&str, Uuid> = document
        .lines()
        .iter()
        .filter_map(|l| l.line_ref.as_deref().map(|r| (r, l.line_id)))
        .collect();

    let items = response
        .invoice
        .as_ref()
        .map(|inv| inv.line_items.as_slice())
        .unwrap_or_default();

    for item in items {
        let line_id = match item.line_ref().and_then(|r| lines_by_ref.get(r.as_str()).copied()) {
            Some(id) => id,
            None => {
                debug!(
                    line_ref = ?item.line_ref(),
                    document = document.document_name(),
                    "response line has no matching document line, discarding"
                );
                summary.lines_unmatched += 1;
                continue;
            }
        };
        summary.lines_matched += 1;

        let line_tax = decimal(item.total_tax_line).round_dp(2);
        let raw = match serde_json::to_string(item) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "could not serialize response line for audit");
                summary.warnings += 1;
                String::new()
            }
        };
        if let Err(e) = store.record_line_tax(line_id, line_tax, &raw).await {
            warn!(error = %e, %line_id, "failed to store line tax amount");
            summary.warnings += 1;
        }

        let mut code_ids = Vec::new();
        for raw_tax in &item.taxes {
            let tax: ConstituentTax = match serde_json::from_value(raw_tax.clone()) {
                Ok(tax) => tax,
                Err(e) => {
                    warn!(error = %e, %line_id, "skipping malformed constituent tax");
                    summary.warnings += 1;
                    continue;
                }
            };

            match upsert_detail(store, line_id, &tax, raw_tax).await {
                Ok(()) => summary.details_written += 1,
                Err(e) => {
                    warn!(error = %e, %line_id, "failed to upsert tax detail");
                    summary.warnings += 1;
                }
            }

            let name = tax
                .description
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(FALLBACK_TAX_NAME);
            match resolve_tax_code(store, name, tax.rate).await {
                Ok(code) => {
                    if !code_ids.contains(&code.tax_code_id) {
                        code_ids.push(code.tax_code_id);
                    }
                    summary.codes_resolved += 1;
                }
                Err(e) => {
                    warn!(error = %e, %line_id, tax = name, "failed to resolve tax code");
                    summary.warnings += 1;
                }
            }
        }

        if let Err(e) = store.replace_line_tax_codes(line_id, &code_ids).await {
            warn!(error = %e, %line_id, "failed to replace line tax codes");
            summary.warnings += 1;
        }
    }

    if summary.lines_matched > 0 {
        if let Err(e) = store.recompute_document(document.document_id()).await {
            warn!(
                error = %e,
                document = document.document_name(),
                "document recomputation failed after reconciliation"
            );
            summary.warnings += 1;
        }
    }

    debug!(
        document = document.document_name(),
        matched = summary.lines_matched,
        details = summary.details_written,
        warnings = summary.warnings,
        "reconciliation pass complete"
    );
    Ok(summary)
}

/// Upsert one constituent tax by its identity key
/// `(line, description, raw rate, total tax rounded to 2dp)`.
async fn upsert_detail(
    store: &dyn TaxStore,
    line_id: Uuid,
    tax: &ConstituentTax,
    raw: &serde_json::Value,
) -> Result<(), AppError> {
    let description = tax
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_TAX_NAME)
        .to_string();
    let rate = Decimal::from_f64(tax.rate).unwrap_or(Decimal::ZERO);
    let total_tax = decimal(tax.total_tax).round_dp(2);

    let input = crate::models::NewTaxDetail {
        line_id,
        description: description.clone(),
        tax_authority: tax.tax_authority_name.clone(),
        tax_level: tax.tax_level_desc.clone(),
        tax_type: tax.tax_type_desc.clone(),
        tax_class: tax.tax_type_class_desc.clone(),
        rate,
        calc_base: decimal(tax.calculation_base_amt),
        total_tax,
        taxable: scalar_text(&tax.taxable),
        geocode: tax.geocode.as_ref().and_then(|g| g.geocode.clone()),
        exempt_amount: scalar_text(&tax.exempt_amount),
        percent_taxable: scalar_text(&tax.percent_taxable),
        non_taxable_amount: scalar_text(&tax.non_taxable_amount),
        payload: raw.to_string(),
    };

    match store
        .find_tax_detail(line_id, &description, rate, total_tax)
        .await?
    {
        Some(existing) => store.update_tax_detail(existing.tax_detail_id, &input).await,
        None => store.insert_tax_detail(&input).await.map(|_| ()),
    }
}

/// Find or create the host tax code for `(name, rate)`.
///
/// A code matches when its name is the base name or a `name_N` variant and
/// its rate is within 0.0001 of the normalized incoming rate. When the base
/// name exists at a different rate, a new code is created under the next
/// free numeric suffix (`name_2`, `name_3`, ...).
async fn resolve_tax_code(
    store: &dyn TaxStore,
    name: &str,
    raw_rate: f64,
) -> Result<TaxCode, AppError> {
    let rate = normalize_rate(raw_rate);
    let tolerance = Decimal::new(1, 4);

    let base = match store.find_tax_code_by_name(name).await? {
        None => return store.insert_tax_code(name, rate).await,
        Some(code) => code,
    };
    if (base.rate - rate).abs() <= tolerance {
        return Ok(base);
    }

    let candidates = store.tax_codes_with_base_name(name).await?;
    if let Some(existing) = candidates
        .iter()
        .find(|c| suffix_of(name, &c.name).is_some() && (c.rate - rate).abs() <= tolerance)
    {
        return Ok(existing.clone());
    }

    let next = candidates
        .iter()
        .filter_map(|c| suffix_of(name, &c.name))
        .max()
        .map(|max| max + 1)
        .unwrap_or(2);
    store.insert_tax_code(&format!("{name}_{next}"), rate).await
}

/// `Some(n)` when `candidate` is exactly `base_n` for a numeric n.
fn suffix_of(base: &str, candidate: &str) -> Option<u32> {
    candidate
        .strip_prefix(base)?
        .strip_prefix('_')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_rates_scale_to_percentages() {
        assert_eq!(normalize_rate(0.06), Decimal::new(6, 0));
        assert_eq!(normalize_rate(6.0), Decimal::new(6, 0));
        assert_eq!(normalize_rate(0.0), Decimal::ZERO);
        assert_eq!(normalize_rate(1.0), Decimal::new(1, 0));
    }

    #[test]
    fn rates_round_to_four_decimals() {
        assert_eq!(normalize_rate(0.061234), Decimal::new(61234, 4));
        assert_eq!(normalize_rate(6.1234), Decimal::new(61234, 4));
    }

    #[test]
    fn suffix_parsing_only_matches_numeric_variants() {
        assert_eq!(suffix_of("State Tax", "State Tax_2"), Some(2));
        assert_eq!(suffix_of("State Tax", "State Tax_13"), Some(13));
        assert_eq!(suffix_of("State Tax", "State Tax"), None);
        assert_eq!(suffix_of("State Tax", "State Taxes"), None);
        assert_eq!(suffix_of("State Tax", "State Tax_b"), None);
    }
}
