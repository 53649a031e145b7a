//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{
    ClientsPort, InvoicesPort, LoginPort, ProductsPort, ReportsPort, TokenSigner, UsersPort,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub clients: Arc<dyn ClientsPort>,
    pub products: Arc<dyn ProductsPort>,
    pub invoices: Arc<dyn InvoicesPort>,
    pub reports: Arc<dyn ReportsPort>,
    pub users: Arc<dyn UsersPort>,
    pub login: Arc<dyn LoginPort>,
    pub tokens: Arc<TokenSigner>,
}
