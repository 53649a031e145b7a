//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: Define strongly typed entities for the invoicing catalogue
//! (clients, products, invoices with snapshotted lines, users) plus the
//! pure pricing engine, and keep validation at constructors so invalid
//! values never reach persistence or the wire.
//!
//! Public surface:
//! - Error / ErrorCode — API error payload and its stable identifier.
//! - Entity aggregates with `NewX` drafts and `XPatch` partial updates.
//! - `ports` — driven repository traits and driving use-case traits.
//! - `pricing` — line/invoice total derivation and the merge cart.
//! - Services implementing the driving ports over `Arc<dyn Repository>`.

pub mod auth;
pub mod client;
pub mod client_service;
pub mod error;
pub mod invoice;
pub mod invoice_service;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod product_service;
pub mod report_service;
pub mod token;
pub mod user;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::client::{Client, ClientId, ClientPatch, ClientValidationError, NewClient};
pub use self::client_service::ClientService;
pub use self::error::{Error, ErrorCode};
pub use self::invoice::{
    Invoice, InvoiceId, InvoiceLine, InvoicePatch, InvoiceValidationError, NewInvoice,
};
pub use self::invoice_service::InvoiceService;
pub use self::ports::{
    ClientRepository, ClientsPort, DeletePolicy, InvoiceReport, InvoiceRepository,
    InvoiceWithClient, InvoicesPort, LineRequest, LineWithProduct, LoginOutcome, LoginPort,
    ProductRepository, ProductsPort, RegisterUser, ReportLine, ReportsPort, StoreError,
    UserRepository, UserUpdate, UsersPort,
};
pub use self::product::{
    NewProduct, Product, ProductId, ProductPatch, ProductValidationError, DEFAULT_TAX_RATE,
};
pub use self::product_service::ProductService;
pub use self::report_service::ReportService;
pub use self::token::{Claims, TokenError, TokenSigner};
pub use self::user::{NewUser, Role, User, UserId, UserPatch, UserValidationError};
pub use self::user_service::{AuthService, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
