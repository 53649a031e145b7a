//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::{ClientId, NewUser, Role, StoreError, User, UserId, UserRepository};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::usuario;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a domain user.
///
/// An unrecognised role value degrades to the least-privileged role rather
/// than failing the whole query.
fn row_to_user(row: UserRow) -> User {
    let role = match row.usu_rol.parse::<Role>() {
        Ok(role) => role,
        Err(_) => {
            warn!(
                value = row.usu_rol,
                user_id = row.usu_id,
                "unrecognised usu_rol value, defaulting to client"
            );
            Role::Client
        }
    };
    User::from_parts(
        UserId::new(row.usu_id),
        row.usu_username,
        row.usu_password,
        role,
        row.cli_id.map(ClientId::new),
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, draft: &NewUser) -> Result<User, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: UserRow = diesel::insert_into(usuario::table)
            .values(&NewUserRow {
                usu_username: draft.username(),
                usu_password: draft.password_hash(),
                usu_rol: draft.role().as_str(),
                cli_id: draft.client_id().map(ClientId::as_i32),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_user(row))
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(usuario::table.find(user.id().as_i32()))
            .set(&UserChangeset {
                usu_username: user.username(),
                usu_password: user.password_hash(),
                usu_rol: user.role().as_str(),
                cli_id: user.client_id().map(ClientId::as_i32),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(usuario::table.find(id.as_i32()))
            .execute(&mut conn)
            .await
            .map(|rows| rows > 0)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = usuario::table
            .find(id.as_i32())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = usuario::table
            .filter(usuario::usu_username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_user))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = usuario::table
            .order(usuario::usu_id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_user).collect())
    }
}
