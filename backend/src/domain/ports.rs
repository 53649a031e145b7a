//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`*Repository`) describe how the domain expects to talk to
//! the store; adapters map their failures into [`StoreError`] variants
//! instead of returning `anyhow::Result`. Driving ports (`*Port`) are the
//! use-case surface HTTP handlers depend on, so handlers stay testable
//! against in-memory implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use super::auth::LoginCredentials;
use super::client::{Client, ClientId, ClientPatch, NewClient};
use super::error::Error;
use super::invoice::{Invoice, InvoiceId, InvoiceLine, InvoicePatch, NewInvoice};
use super::product::{NewProduct, Product, ProductId, ProductPatch};
use super::user::{ClientLink, NewUser, Role, User, UserId};

/// Errors surfaced by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection could not be established or was lost.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query { message: String },
    /// A unique index rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    /// A foreign-key constraint rejected the write or delete.
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },
}

impl StoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-index violations.
    pub fn unique(constraint: impl Into<String>) -> Self {
        Self::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    /// Helper for foreign-key violations.
    pub fn foreign_key(constraint: impl Into<String>) -> Self {
        Self::ForeignKeyViolation {
            constraint: constraint.into(),
        }
    }
}

impl From<StoreError> for Error {
    /// Default mapping for store failures a service does not interpret
    /// specially: constraint violations become conflicts, everything else is
    /// an internal failure.
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Connection { message } => {
                Error::internal(format!("store unavailable: {message}"))
            }
            StoreError::Query { message } => Error::internal(format!("store error: {message}")),
            StoreError::UniqueViolation { constraint } => {
                Error::conflict(format!("unique constraint violated: {constraint}"))
            }
            StoreError::ForeignKeyViolation { constraint } => {
                Error::conflict(format!("foreign key constraint violated: {constraint}"))
            }
        }
    }
}

/// What deleting a referenced client or product does.
///
/// The legacy system left dangling references; here the behaviour is an
/// explicit configuration choice enforced by the adapters in one
/// transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Reject deletes of referenced rows with a conflict.
    #[default]
    Restrict,
    /// Remove dependent invoices/lines (and detach users) with the row.
    Cascade,
}

impl std::str::FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restrict" => Ok(Self::Restrict),
            "cascade" => Ok(Self::Cascade),
            other => Err(format!("unknown delete policy: {other}")),
        }
    }
}

/// Persistence port for client rows.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Insert a validated draft, returning the stored row with its id.
    async fn insert(&self, draft: &NewClient) -> Result<Client, StoreError>;

    /// Persist an updated client. The row must already exist.
    async fn update(&self, client: &Client) -> Result<(), StoreError>;

    /// Delete under the given policy. Returns whether the row existed.
    async fn delete(&self, id: ClientId, policy: DeletePolicy) -> Result<bool, StoreError>;

    /// Fetch one client.
    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError>;

    /// All clients ordered by id.
    async fn list(&self) -> Result<Vec<Client>, StoreError>;
}

/// Persistence port for product rows.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a validated draft, returning the stored row with its id.
    async fn insert(&self, draft: &NewProduct) -> Result<Product, StoreError>;

    /// Persist an updated product. The row must already exist.
    async fn update(&self, product: &Product) -> Result<(), StoreError>;

    /// Delete under the given policy. Returns whether the row existed.
    async fn delete(&self, id: ProductId, policy: DeletePolicy) -> Result<bool, StoreError>;

    /// Fetch one product.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products ordered by id.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}

/// An invoice line joined with the name of its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWithProduct {
    pub line: InvoiceLine,
    pub product_name: String,
}

/// An invoice header joined with the name of its client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceWithClient {
    pub invoice: Invoice,
    pub client_name: String,
}

/// Persistence port for invoice headers and their lines.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Insert a validated header draft, returning the stored row.
    async fn insert(&self, draft: &NewInvoice) -> Result<Invoice, StoreError>;

    /// Persist an updated header. The row must already exist.
    async fn update(&self, invoice: &Invoice) -> Result<(), StoreError>;

    /// Delete a header and cascade its lines. Returns whether it existed.
    async fn delete(&self, id: InvoiceId) -> Result<bool, StoreError>;

    /// Fetch one header.
    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;

    /// All headers ordered by id.
    async fn list(&self) -> Result<Vec<Invoice>, StoreError>;

    /// Headers for one client ordered by id.
    async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, StoreError>;

    /// Insert or additively merge a line: an existing `(invoice, product)`
    /// row gains the quantity and keeps its original price/tax snapshot.
    /// Returns the stored line after the merge.
    async fn upsert_line(&self, line: &InvoiceLine) -> Result<InvoiceLine, StoreError>;

    /// Remove the line for one product. Returns whether it existed.
    async fn remove_line(
        &self,
        invoice_id: InvoiceId,
        product_id: ProductId,
    ) -> Result<bool, StoreError>;

    /// Atomically replace the whole line set of an invoice.
    async fn replace_lines(
        &self,
        invoice_id: InvoiceId,
        lines: &[InvoiceLine],
    ) -> Result<(), StoreError>;

    /// Lines of one invoice in product-id order.
    async fn lines(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceLine>, StoreError>;

    /// Lines of one invoice joined with product names.
    async fn lines_with_products(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<LineWithProduct>, StoreError>;

    /// All headers joined with client names, ordered by client then invoice.
    async fn list_with_clients(&self) -> Result<Vec<InvoiceWithClient>, StoreError>;
}

/// Persistence port for user rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a validated draft, returning the stored row with its id.
    async fn insert(&self, draft: &NewUser) -> Result<User, StoreError>;

    /// Persist an updated user. The row must already exist.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Delete a user. Returns whether the row existed.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;

    /// Fetch one user.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Look a user up by login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

/// Request to add (or merge) one product onto an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// One reported line with its derived amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// An invoice header with its lines and derived grand total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceReport {
    pub invoice: Invoice,
    pub client_name: String,
    pub lines: Vec<ReportLine>,
    pub total: Decimal,
}

/// Driving port for client CRUD.
#[async_trait]
pub trait ClientsPort: Send + Sync {
    async fn create(&self, draft: NewClient) -> Result<Client, Error>;
    async fn update(&self, id: ClientId, patch: ClientPatch) -> Result<Client, Error>;
    async fn delete(&self, id: ClientId) -> Result<(), Error>;
    async fn get(&self, id: ClientId) -> Result<Client, Error>;
    async fn list(&self) -> Result<Vec<Client>, Error>;
}

/// Driving port for product CRUD.
#[async_trait]
pub trait ProductsPort: Send + Sync {
    async fn create(&self, draft: NewProduct) -> Result<Product, Error>;
    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, Error>;
    async fn delete(&self, id: ProductId) -> Result<(), Error>;
    async fn get(&self, id: ProductId) -> Result<Product, Error>;
    async fn list(&self) -> Result<Vec<Product>, Error>;
}

/// Driving port for invoice headers and line items.
#[async_trait]
pub trait InvoicesPort: Send + Sync {
    async fn create(&self, client_id: ClientId, issue_date: String) -> Result<Invoice, Error>;
    async fn update(&self, id: InvoiceId, patch: InvoicePatch) -> Result<Invoice, Error>;
    async fn delete(&self, id: InvoiceId) -> Result<(), Error>;
    async fn get(&self, id: InvoiceId) -> Result<Invoice, Error>;
    async fn list(&self) -> Result<Vec<Invoice>, Error>;

    /// Add or additively merge one line.
    async fn add_line(&self, id: InvoiceId, request: LineRequest) -> Result<InvoiceLine, Error>;

    /// Remove one line entirely.
    async fn remove_line(&self, id: InvoiceId, product_id: ProductId) -> Result<(), Error>;

    /// Replace the whole line set in one transaction. Duplicate products in
    /// the request merge additively before the write.
    async fn replace_lines(
        &self,
        id: InvoiceId,
        requests: Vec<LineRequest>,
    ) -> Result<Vec<InvoiceLine>, Error>;
}

/// Driving port for the read-only reporting joins.
#[async_trait]
pub trait ReportsPort: Send + Sync {
    /// Invoices joined with client names.
    async fn invoices_with_clients(&self) -> Result<Vec<InvoiceWithClient>, Error>;

    /// One invoice with lines, product names, and derived totals.
    async fn invoice_products(&self, id: InvoiceId) -> Result<InvoiceReport, Error>;

    /// Every invoice of one client, each with lines and derived totals.
    async fn client_invoices(&self, client_id: ClientId) -> Result<Vec<InvoiceReport>, Error>;
}

/// Raw input for registering a user; the service hashes the password.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
    pub client_id: Option<ClientId>,
}

/// Raw input for a partial user update; a supplied password is re-hashed.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub client_id: Option<ClientLink>,
}

/// Driving port for the admin-gated user CRUD.
#[async_trait]
pub trait UsersPort: Send + Sync {
    async fn create(&self, request: RegisterUser) -> Result<User, Error>;
    async fn update(&self, id: UserId, request: UserUpdate) -> Result<User, Error>;
    async fn delete(&self, id: UserId) -> Result<(), Error>;
    async fn get(&self, id: UserId) -> Result<User, Error>;
    async fn list(&self) -> Result<Vec<User>, Error>;
}

/// Successful login: the signed token and the authenticated user.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Driving port for authentication.
#[async_trait]
pub trait LoginPort: Send + Sync {
    /// Verify credentials and issue a signed, time-boxed token.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("restrict", DeletePolicy::Restrict)]
    #[case("RESTRICT", DeletePolicy::Restrict)]
    #[case("cascade", DeletePolicy::Cascade)]
    #[case(" Cascade ", DeletePolicy::Cascade)]
    fn delete_policy_parses_case_insensitively(
        #[case] input: &str,
        #[case] expected: DeletePolicy,
    ) {
        assert_eq!(input.parse::<DeletePolicy>().expect("known policy"), expected);
    }

    #[rstest]
    fn delete_policy_rejects_unknown_value() {
        assert!("drop".parse::<DeletePolicy>().is_err());
    }

    #[rstest]
    fn store_error_helpers_render_messages() {
        assert!(StoreError::connection("refused")
            .to_string()
            .contains("refused"));
        assert!(StoreError::unique("usuario_usu_username_key")
            .to_string()
            .contains("usu_username"));
        assert!(StoreError::foreign_key("factura_cli_id_fkey")
            .to_string()
            .contains("cli_id"));
    }
}
