//! Invoice header and line-item aggregates.
//!
//! An invoice stores header fields only; totals are always derived by the
//! pricing engine from its lines at read time, never cached on the header.
//! Lines have composite identity `(invoice_id, product_id)` and snapshot
//! both the unit price and the tax rate at the moment the product is added,
//! so later catalogue edits do not rewrite history.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client::ClientId;
use super::product::ProductId;

/// Store-assigned invoice identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(i32);

impl InvoiceId {
    /// Wrap a raw store identifier.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw integer value for persistence and wire payloads.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for invoice headers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceValidationError {
    /// Issue date was missing or blank once trimmed.
    #[error("issue date must not be empty")]
    EmptyIssueDate,
}

/// A persisted invoice header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    client_id: ClientId,
    issue_date: String,
}

impl Invoice {
    /// Rehydrate an invoice header from stored fields.
    pub fn from_parts(id: InvoiceId, client_id: ClientId, issue_date: String) -> Self {
        Self {
            id,
            client_id,
            issue_date,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> InvoiceId {
        self.id
    }

    /// Owning client.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Issue date as the store carries it (free-form date string).
    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    /// Merge a partial update, keeping absent fields.
    pub fn apply(&self, patch: InvoicePatch) -> Result<Self, InvoiceValidationError> {
        let draft = NewInvoice::new(
            patch.client_id.unwrap_or(self.client_id),
            patch.issue_date.unwrap_or_else(|| self.issue_date.clone()),
        )?;
        Ok(Self {
            id: self.id,
            client_id: draft.client_id,
            issue_date: draft.issue_date,
        })
    }
}

/// Validated input for creating an invoice header.
///
/// Referential validity of `client_id` is checked by the service against the
/// store; this type only guards field shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub(crate) client_id: ClientId,
    pub(crate) issue_date: String,
}

impl NewInvoice {
    /// Validate raw create input.
    pub fn new(
        client_id: ClientId,
        issue_date: impl Into<String>,
    ) -> Result<Self, InvoiceValidationError> {
        let issue_date = issue_date.into();
        if issue_date.trim().is_empty() {
            return Err(InvoiceValidationError::EmptyIssueDate);
        }
        Ok(Self {
            client_id,
            issue_date,
        })
    }

    /// Owning client.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Issue date.
    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }
}

/// Partial update for an invoice header. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoicePatch {
    pub client_id: Option<ClientId>,
    pub issue_date: Option<String>,
}

/// One product's quantity and snapshotted pricing within an invoice.
///
/// ## Invariants
/// - `quantity >= 1` always; merges only ever increase it.
/// - At most one line exists per `(invoice_id, product_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    invoice_id: InvoiceId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Decimal,
    tax_rate: Decimal,
}

impl InvoiceLine {
    /// Rehydrate a line from stored fields.
    pub fn from_parts(
        invoice_id: InvoiceId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            invoice_id,
            product_id,
            quantity,
            unit_price,
            tax_rate,
        }
    }

    /// Owning invoice.
    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    /// Product this line refers to.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Units sold. Always at least one.
    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Unit price snapshotted when the line was first added.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Tax rate snapshotted when the line was first added.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn header_rejects_blank_issue_date(#[case] date: &str) {
        let err = NewInvoice::new(ClientId::new(1), date).expect_err("blank date must fail");
        assert_eq!(err, InvoiceValidationError::EmptyIssueDate);
    }

    #[rstest]
    fn patch_keeps_absent_fields() {
        let invoice = Invoice::from_parts(InvoiceId::new(9), ClientId::new(1), "2026-08-29".into());
        let updated = invoice
            .apply(InvoicePatch {
                client_id: Some(ClientId::new(2)),
                ..InvoicePatch::default()
            })
            .expect("valid patch");
        assert_eq!(updated.client_id(), ClientId::new(2));
        assert_eq!(updated.issue_date(), "2026-08-29");
    }
}
