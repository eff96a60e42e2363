//! Data models for tax-service.

pub mod document;
pub mod line;
pub mod partner;
pub mod ps_code;
pub mod tax_code;
pub mod tax_detail;
pub mod transaction;

pub use document::{Document, DocumentKind, DocumentStatus, Invoice, SalesOrder, TaxableDocument};
pub use line::DocumentLine;
pub use partner::{AddressChanges, AddressFields, Partner};
pub use ps_code::PsCode;
pub use tax_code::TaxCode;
pub use tax_detail::{NewTaxDetail, TaxDetail};
pub use transaction::{ApiTransaction, NewApiTransaction};
