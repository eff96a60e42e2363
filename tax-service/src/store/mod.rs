//! Record-store abstraction the tax core writes through.
//!
//! The reconciler, address validator and client logging only depend on this
//! trait; `services::Database` implements it over Postgres and
//! `store::memory::MemoryStore` backs the integration tests.

pub mod memory;

use crate::models::{
    AddressChanges, NewApiTransaction, NewTaxDetail, Partner, PsCode, TaxCode, TaxDetail,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

#[async_trait]
pub trait TaxStore: Send + Sync {
    // ---------------------------------------------------------------------
    // Tax details
    // ---------------------------------------------------------------------

    /// Look up a tax detail by its upsert identity key.
    async fn find_tax_detail(
        &self,
        line_id: Uuid,
        description: &str,
        rate: Decimal,
        total_tax: Decimal,
    ) -> Result<Option<TaxDetail>, AppError>;

    async fn insert_tax_detail(&self, input: &NewTaxDetail) -> Result<TaxDetail, AppError>;

    async fn update_tax_detail(
        &self,
        tax_detail_id: Uuid,
        input: &NewTaxDetail,
    ) -> Result<(), AppError>;

    // ---------------------------------------------------------------------
    // Tax codes
    // ---------------------------------------------------------------------

    async fn find_tax_code_by_name(&self, name: &str) -> Result<Option<TaxCode>, AppError>;

    /// All tax codes whose name is `base` or starts with `base` (used for
    /// numeric-suffix disambiguation).
    async fn tax_codes_with_base_name(&self, base: &str) -> Result<Vec<TaxCode>, AppError>;

    async fn insert_tax_code(&self, name: &str, rate: Decimal) -> Result<TaxCode, AppError>;

    // ---------------------------------------------------------------------
    // Document lines
    // ---------------------------------------------------------------------

    /// Persist the regenerated per-calculation line identifiers.
    async fn save_line_refs(&self, refs: &[(Uuid, String)]) -> Result<(), AppError>;

    /// Store a line's aggregate tax amount and its raw response payload.
    async fn record_line_tax(
        &self,
        line_id: Uuid,
        tax_amount: Decimal,
        raw: &str,
    ) -> Result<(), AppError>;

    /// Replace the line's tax-code reference set wholesale.
    async fn replace_line_tax_codes(
        &self,
        line_id: Uuid,
        tax_code_ids: &[Uuid],
    ) -> Result<(), AppError>;

    /// Recompute the document's line and header totals from stored amounts.
    async fn recompute_document(&self, document_id: Uuid) -> Result<(), AppError>;

    /// Record a workflow annotation on the document (never blocks the
    /// underlying business action).
    async fn annotate_document(&self, document_id: Uuid, note: &str) -> Result<(), AppError>;

    // ---------------------------------------------------------------------
    // Transaction log
    // ---------------------------------------------------------------------

    async fn log_transaction(&self, input: &NewApiTransaction) -> Result<(), AppError>;

    /// Most recent logged response bodies, newest first.
    async fn recent_transaction_responses(&self, limit: i64) -> Result<Vec<String>, AppError>;

    // ---------------------------------------------------------------------
    // Partners / addresses
    // ---------------------------------------------------------------------

    async fn get_partner(&self, partner_id: Uuid) -> Result<Option<Partner>, AppError>;

    async fn save_partner_validation(&self, partner_id: Uuid, raw: &str) -> Result<(), AppError>;

    async fn apply_address_changes(
        &self,
        partner_id: Uuid,
        changes: &AddressChanges,
    ) -> Result<(), AppError>;

    // ---------------------------------------------------------------------
    // Country / state reference records
    // ---------------------------------------------------------------------

    async fn country_exists(&self, code: &str) -> Result<bool, AppError>;

    async fn state_exists(&self, code: &str) -> Result<bool, AppError>;

    // ---------------------------------------------------------------------
    // PS codes
    // ---------------------------------------------------------------------

    /// Create or update a PS code; returns true when a new row was created.
    async fn upsert_ps_code(&self, code: &str, description: &str) -> Result<bool, AppError>;

    /// Deactivate every active PS code not present in `codes`; returns the
    /// number of rows deactivated.
    async fn deactivate_ps_codes_except(&self, codes: &[String]) -> Result<u64, AppError>;

    async fn list_ps_codes(&self, active_only: bool) -> Result<Vec<PsCode>, AppError>;
}
