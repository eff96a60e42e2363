//! Taxable document model shared by invoices and sales orders.

use crate::models::line::DocumentLine;
use crate::models::partner::AddressFields;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    SaleOrder,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::SaleOrder => "sale_order",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sale_order" => DocumentKind::SaleOrder,
            _ => DocumentKind::Invoice,
        }
    }
}

/// Coarse document status bucket sent in the calculation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Quote,
    Posted,
    Suspended,
    Active,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Quote => "Quote",
            DocumentStatus::Posted => "Posted",
            DocumentStatus::Suspended => "Suspended",
            DocumentStatus::Active => "Active",
        }
    }

    /// Map a host document state onto the coarse bucket.
    pub fn from_state(state: &str) -> Self {
        match state {
            "draft" | "sent" | "sale" | "done" => DocumentStatus::Quote,
            "posted" => DocumentStatus::Posted,
            "cancel" => DocumentStatus::Suspended,
            _ => DocumentStatus::Active,
        }
    }
}

/// Persisted document header (invoice or sales order).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub document_id: Uuid,
    pub kind: String,
    pub name: String,
    pub state: String,
    pub document_date: Option<NaiveDate>,
    pub untaxed_total: Decimal,
    pub tax_total: Decimal,
    pub partner_id: Uuid,
    pub company_partner_id: Uuid,
    pub tax_annotation: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Capability set the request builder and reconciler depend on.
///
/// One implementation per document kind; the per-kind differences
/// (quantity source, shipping partner choice) live behind this trait so the
/// core never probes for fields at runtime.
pub trait TaxableDocument: Send + Sync {
    fn document_id(&self) -> Uuid;
    fn kind(&self) -> DocumentKind;
    fn document_name(&self) -> &str;
    fn document_date(&self) -> NaiveDate;
    fn untaxed_total(&self) -> Decimal;
    fn status(&self) -> DocumentStatus;
    fn ship_from(&self) -> &AddressFields;
    fn ship_to(&self) -> Option<&AddressFields>;
    fn customer_account(&self) -> String;
    fn lines(&self) -> &[DocumentLine];
    fn lines_mut(&mut self) -> &mut [DocumentLine];

    /// Normalized quantity for one line, per document kind.
    fn line_quantity(&self, line: &DocumentLine) -> Decimal;
}

/// Customer invoice view over a document and its lines.
pub struct Invoice {
    pub document: Document,
    pub ship_from: AddressFields,
    pub ship_to: Option<AddressFields>,
    pub lines: Vec<DocumentLine>,
}

impl TaxableDocument for Invoice {
    fn document_id(&self) -> Uuid {
        self.document.document_id
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Invoice
    }

    fn document_name(&self) -> &str {
        &self.document.name
    }

    fn document_date(&self) -> NaiveDate {
        self.document
            .document_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    fn untaxed_total(&self) -> Decimal {
        self.document.untaxed_total
    }

    fn status(&self) -> DocumentStatus {
        DocumentStatus::from_state(&self.document.state)
    }

    fn ship_from(&self) -> &AddressFields {
        &self.ship_from
    }

    fn ship_to(&self) -> Option<&AddressFields> {
        self.ship_to.as_ref()
    }

    fn customer_account(&self) -> String {
        self.document.partner_id.to_string()
    }

    fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    fn lines_mut(&mut self) -> &mut [DocumentLine] {
        &mut self.lines
    }

    fn line_quantity(&self, line: &DocumentLine) -> Decimal {
        line.quantity.unwrap_or(Decimal::ZERO)
    }
}

/// Sales-order view over a document and its lines.
pub struct SalesOrder {
    pub document: Document,
    pub ship_from: AddressFields,
    pub ship_to: Option<AddressFields>,
    pub lines: Vec<DocumentLine>,
}

impl TaxableDocument for SalesOrder {
    fn document_id(&self) -> Uuid {
        self.document.document_id
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::SaleOrder
    }

    fn document_name(&self) -> &str {
        &self.document.name
    }

    fn document_date(&self) -> NaiveDate {
        self.document
            .document_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    fn untaxed_total(&self) -> Decimal {
        self.document.untaxed_total
    }

    fn status(&self) -> DocumentStatus {
        DocumentStatus::from_state(&self.document.state)
    }

    fn ship_from(&self) -> &AddressFields {
        &self.ship_from
    }

    fn ship_to(&self) -> Option<&AddressFields> {
        self.ship_to.as_ref()
    }

    fn customer_account(&self) -> String {
        self.document.partner_id.to_string()
    }

    fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    fn lines_mut(&mut self) -> &mut [DocumentLine] {
        &mut self.lines
    }

    fn line_quantity(&self, line: &DocumentLine) -> Decimal {
        line.ordered_quantity.unwrap_or(Decimal::ZERO)
    }
}
