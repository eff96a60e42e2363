//! In-memory `TaxStore` used by the integration tests and local tooling.

use crate::models::{
    AddressChanges, ApiTransaction, NewApiTransaction, NewTaxDetail, Partner, PsCode, TaxCode,
    TaxDetail,
};
use crate::store::TaxStore;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    tax_details: Vec<TaxDetail>,
    tax_codes: Vec<TaxCode>,
    line_refs: HashMap<Uuid, String>,
    line_tax: HashMap<Uuid, (Decimal, String)>,
    line_tax_codes: HashMap<Uuid, Vec<Uuid>>,
    recomputed: Vec<Uuid>,
    annotations: HashMap<Uuid, Vec<String>>,
    transactions: Vec<ApiTransaction>,
    partners: HashMap<Uuid, Partner>,
    countries: Vec<String>,
    states: Vec<String>,
    ps_codes: Vec<PsCode>,
    fail_recompute: bool,
    fail_tax_details: bool,
    fail_tax_codes: bool,
}

/// Mutex-guarded store; every operation locks briefly and never holds the
/// lock across an await point.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- seeding ----------------------------------------------------------

    pub fn add_partner(&self, partner: Partner) {
        self.inner
            .lock()
            .unwrap()
            .partners
            .insert(partner.partner_id, partner);
    }

    pub fn add_country(&self, code: &str) {
        self.inner.lock().unwrap().countries.push(code.to_string());
    }

    pub fn add_state(&self, code: &str) {
        self.inner.lock().unwrap().states.push(code.to_string());
    }

    /// Make the next `recompute_document` calls fail, to exercise the
    /// warning path.
    pub fn fail_recompute(&self, fail: bool) {
        self.inner.lock().unwrap().fail_recompute = fail;
    }

    /// Make `insert_tax_detail` calls fail.
    pub fn fail_tax_details(&self, fail: bool) {
        self.inner.lock().unwrap().fail_tax_details = fail;
    }

    /// Make `insert_tax_code` calls fail.
    pub fn fail_tax_codes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_tax_codes = fail;
    }

    // -- assertions -------------------------------------------------------

    pub fn tax_details(&self) -> Vec<TaxDetail> {
        self.inner.lock().unwrap().tax_details.clone()
    }

    pub fn tax_codes(&self) -> Vec<TaxCode> {
        self.inner.lock().unwrap().tax_codes.clone()
    }

    pub fn line_tax(&self, line_id: Uuid) -> Option<(Decimal, String)> {
        self.inner.lock().unwrap().line_tax.get(&line_id).cloned()
    }

    pub fn line_tax_codes(&self, line_id: Uuid) -> Vec<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .line_tax_codes
            .get(&line_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn recomputed_documents(&self) -> Vec<Uuid> {
        self.inner.lock().unwrap().recomputed.clone()
    }

    pub fn annotations(&self, document_id: Uuid) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .annotations
            .get(&document_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn transactions(&self) -> Vec<ApiTransaction> {
        self.inner.lock().unwrap().transactions.clone()
    }

    pub fn partner(&self, partner_id: Uuid) -> Option<Partner> {
        self.inner.lock().unwrap().partners.get(&partner_id).cloned()
    }
}

#[async_trait]
impl TaxStore for MemoryStore {
    async fn find_tax_detail(
        &self,
        line_id: Uuid,
        description: &str,
        rate: Decimal,
        total_tax: Decimal,
    ) -> Result<Option<TaxDetail>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tax_details
            .iter()
            .find(|d| {
                d.line_id == line_id
                    && d.description == description
                    && d.rate == rate
                    && d.total_tax == total_tax
            })
            .cloned())
    }

    async fn insert_tax_detail(&self, input: &NewTaxDetail) -> Result<TaxDetail, AppError> {
        if self.inner.lock().unwrap().fail_tax_details {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "tax detail insert failed"
            )));
        }
        let now = Utc::now();
        let detail = TaxDetail {
            tax_detail_id: Uuid::new_v4(),
            line_id: input.line_id,
            description: input.description.clone(),
            tax_authority: input.tax_authority.clone(),
            tax_level: input.tax_level.clone(),
            tax_type: input.tax_type.clone(),
            tax_class: input.tax_class.clone(),
            rate: input.rate,
            calc_base: input.calc_base,
            total_tax: input.total_tax,
            taxable: input.taxable.clone(),
            geocode: input.geocode.clone(),
            exempt_amount: input.exempt_amount.clone(),
            percent_taxable: input.percent_taxable.clone(),
            non_taxable_amount: input.non_taxable_amount.clone(),
            payload: input.payload.clone(),
            created_utc: now,
            updated_utc: now,
        };
        self.inner.lock().unwrap().tax_details.push(detail.clone());
        Ok(detail)
    }

    async fn update_tax_detail(
        &self,
        tax_detail_id: Uuid,
        input: &NewTaxDetail,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let detail = inner
            .tax_details
            .iter_mut()
            .find(|d| d.tax_detail_id == tax_detail_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("tax detail not found")))?;
        detail.tax_authority = input.tax_authority.clone();
        detail.tax_level = input.tax_level.clone();
        detail.tax_type = input.tax_type.clone();
        detail.tax_class = input.tax_class.clone();
        detail.calc_base = input.calc_base;
        detail.taxable = input.taxable.clone();
        detail.geocode = input.geocode.clone();
        detail.exempt_amount = input.exempt_amount.clone();
        detail.percent_taxable = input.percent_taxable.clone();
        detail.non_taxable_amount = input.non_taxable_amount.clone();
        detail.payload = input.payload.clone();
        detail.updated_utc = Utc::now();
        Ok(())
    }

    async fn find_tax_code_by_name(&self, name: &str) -> Result<Option<TaxCode>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tax_codes.iter().find(|c| c.name == name).cloned())
    }

    async fn tax_codes_with_base_name(&self, base: &str) -> Result<Vec<TaxCode>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tax_codes
            .iter()
            .filter(|c| c.name == base || c.name.starts_with(base))
            .cloned()
            .collect())
    }

    async fn insert_tax_code(&self, name: &str, rate: Decimal) -> Result<TaxCode, AppError> {
        if self.inner.lock().unwrap().fail_tax_codes {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "tax code insert failed"
            )));
        }
        let code = TaxCode {
            tax_code_id: Uuid::new_v4(),
            name: name.to_string(),
            rate,
            created_utc: Utc::now(),
        };
        self.inner.lock().unwrap().tax_codes.push(code.clone());
        Ok(code)
    }

    async fn save_line_refs(&self, refs: &[(Uuid, String)]) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        for (line_id, line_ref) in refs {
            inner.line_refs.insert(*line_id, line_ref.clone());
        }
        Ok(())
    }

    async fn record_line_tax(
        &self,
        line_id: Uuid,
        tax_amount: Decimal,
        raw: &str,
    ) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .line_tax
            .insert(line_id, (tax_amount, raw.to_string()));
        Ok(())
    }

    async fn replace_line_tax_codes(
        &self,
        line_id: Uuid,
        tax_code_ids: &[Uuid],
    ) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .line_tax_codes
            .insert(line_id, tax_code_ids.to_vec());
        Ok(())
    }

    async fn recompute_document(&self, document_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_recompute {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "recompute failed"
            )));
        }
        inner.recomputed.push(document_id);
        Ok(())
    }

    async fn annotate_document(&self, document_id: Uuid, note: &str) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .annotations
            .entry(document_id)
            .or_default()
            .push(note.to_string());
        Ok(())
    }

    async fn log_transaction(&self, input: &NewApiTransaction) -> Result<(), AppError> {
        let tx = ApiTransaction {
            transaction_id: Uuid::new_v4(),
            name: input.name.clone(),
            endpoint: input.endpoint.clone(),
            request_headers: input.request_headers.clone(),
            request_body: input.request_body.clone(),
            status_code: input.status_code,
            response_body: input.response_body.clone(),
            document_id: input.document_id,
            line_id: input.line_id,
            created_utc: Utc::now(),
        };
        self.inner.lock().unwrap().transactions.push(tx);
        Ok(())
    }

    async fn recent_transaction_responses(&self, limit: i64) -> Result<Vec<String>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .transactions
            .iter()
            .rev()
            .filter_map(|t| t.response_body.clone())
            .take(limit as usize)
            .collect())
    }

    async fn get_partner(&self, partner_id: Uuid) -> Result<Option<Partner>, AppError> {
        Ok(self.partner(partner_id))
    }

    async fn save_partner_validation(&self, partner_id: Uuid, raw: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let partner = inner
            .partners
            .get_mut(&partner_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("partner not found")))?;
        partner.last_validation = Some(raw.to_string());
        Ok(())
    }

    async fn apply_address_changes(
        &self,
        partner_id: Uuid,
        changes: &AddressChanges,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let partner = inner
            .partners
            .get_mut(&partner_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("partner not found")))?;
        if let Some(v) = &changes.street {
            partner.street = Some(v.clone());
        }
        if let Some(v) = &changes.street2 {
            partner.street2 = Some(v.clone());
        }
        if let Some(v) = &changes.city {
            partner.city = Some(v.clone());
        }
        if let Some(v) = &changes.zip {
            partner.zip = Some(v.clone());
        }
        if let Some(v) = &changes.state_code {
            partner.state_code = Some(v.clone());
        }
        if let Some(v) = &changes.country_code {
            partner.country_code = Some(v.clone());
        }
        if let Some(v) = changes.latitude {
            partner.latitude = Some(v);
        }
        if let Some(v) = changes.longitude {
            partner.longitude = Some(v);
        }
        if let Some(v) = &changes.pluscode {
            partner.pluscode = Some(v.clone());
        }
        Ok(())
    }

    async fn country_exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .countries
            .iter()
            .any(|c| c == code))
    }

    async fn state_exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.inner.lock().unwrap().states.iter().any(|s| s == code))
    }

    async fn upsert_ps_code(&self, code: &str, description: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.ps_codes.iter_mut().find(|p| p.code == code) {
            existing.description = description.to_string();
            existing.active = true;
            existing.updated_utc = Utc::now();
            Ok(false)
        } else {
            inner.ps_codes.push(PsCode {
                code: code.to_string(),
                description: description.to_string(),
                active: true,
                updated_utc: Utc::now(),
            });
            Ok(true)
        }
    }

    async fn deactivate_ps_codes_except(&self, codes: &[String]) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let mut deactivated = 0;
        for ps in inner.ps_codes.iter_mut() {
            if ps.active && !codes.contains(&ps.code) {
                ps.active = false;
                ps.updated_utc = Utc::now();
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }

    async fn list_ps_codes(&self, active_only: bool) -> Result<Vec<PsCode>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ps_codes
            .iter()
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect())
    }
}
