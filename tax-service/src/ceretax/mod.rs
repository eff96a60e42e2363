//! CereTax integration core: request building, transport, response
//! reconciliation, address validation and reference-data sync.

pub mod address;
pub mod client;
pub mod reconcile;
pub mod reference;
pub mod request;
pub mod response;
pub mod status;

pub use address::{
    apply_validated_address, compute_address_changes, needs_address_update,
    stored_address_needs_update, validate_partner_address, AddressValidationResult,
};
pub use client::{CeretaxClient, LogContext, RawResponse};
pub use reconcile::{apply_response, ReconciliationSummary};
pub use reference::{fetch_reference, sync_ps_codes, PsCodeSyncSummary, ReferenceKind};
pub use request::{build_request, TaxCalculationRequest};
pub use response::TaxCalculationResponse;
pub use status::sync_document_status;
