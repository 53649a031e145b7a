//! Shared mapping from pool and Diesel failures to domain store errors.

use tracing::debug;

use crate::domain::StoreError;

use super::pool::PoolError;

/// Map pool errors to domain store errors.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    StoreError::connection(error.to_string())
}

/// Map Diesel errors to domain store errors, preserving the violated
/// constraint name where the database reports one.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> StoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::unique(info.constraint_name().unwrap_or("unique").to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreError::foreign_key(info.constraint_name().unwrap_or("foreign key").to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreError::connection("database connection closed")
        }
        DieselError::NotFound => StoreError::query("record not found"),
        other => StoreError::query(other.to_string()),
    }
}
