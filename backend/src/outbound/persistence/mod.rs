//! PostgreSQL persistence adapters using Diesel.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; business rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) never leak to the domain layer.
//! - **Typed errors**: every database failure maps to a
//!   [`StoreError`](crate::domain::StoreError) variant, preserving violated
//!   constraint names for the services that interpret them.

mod diesel_client_repository;
mod diesel_invoice_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod error_map;
mod models;
mod pool;
mod schema;

pub use diesel_client_repository::DieselClientRepository;
pub use diesel_invoice_repository::DieselInvoiceRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
