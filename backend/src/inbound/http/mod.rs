//! HTTP adapter: Actix handlers, auth extractors, and error mapping.
//!
//! Handlers are thin translations between wire payloads (legacy snake_case
//! column names) and the domain's driving ports; all business rules live in
//! the domain services.

pub mod auth;
pub mod clients;
pub mod error;
pub mod invoices;
pub mod products;
pub mod reports;
pub mod state;
pub mod users;


pub use crate::domain::ApiResult;
pub use state::HttpState;
