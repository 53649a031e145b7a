//! PostgreSQL-backed `ClientRepository` implementation using Diesel.
//!
//! A thin adapter: translates between Diesel rows and domain clients and
//! enforces the configured delete policy. Under `Cascade` the dependent
//! invoices, their lines, and user links are removed in one transaction so a
//! failure partway leaves the client untouched.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::{Client, ClientId, ClientRepository, DeletePolicy, NewClient, StoreError};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{ClientChangeset, ClientRow, NewClientRow};
use super::pool::DbPool;
use super::schema::{cliente, factura, factura_producto, usuario};

/// Diesel-backed implementation of the `ClientRepository` port.
#[derive(Clone)]
pub struct DieselClientRepository {
    pool: DbPool,
}

impl DieselClientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for DieselClientRepository {
    async fn insert(&self, draft: &NewClient) -> Result<Client, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: ClientRow = diesel::insert_into(cliente::table)
            .values(&NewClientRow {
                cli_nombre: draft.name(),
                cli_correo: draft.email(),
                cli_estado: draft.active(),
            })
            .returning(ClientRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn update(&self, client: &Client) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(cliente::table.find(client.id().as_i32()))
            .set(&ClientChangeset {
                cli_nombre: client.name(),
                cli_correo: client.email(),
                cli_estado: client.active(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: ClientId, policy: DeletePolicy) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw = id.as_i32();
        match policy {
            // The foreign key on factura.cli_id rejects referenced clients.
            DeletePolicy::Restrict => diesel::delete(cliente::table.find(raw))
                .execute(&mut conn)
                .await
                .map(|rows| rows > 0)
                .map_err(map_diesel_error),
            DeletePolicy::Cascade => conn
                .transaction(|conn| {
                    async move {
                        let owned: Vec<i32> = factura::table
                            .filter(factura::cli_id.eq(raw))
                            .select(factura::fac_id)
                            .load(conn)
                            .await?;
                        diesel::delete(
                            factura_producto::table
                                .filter(factura_producto::fac_id.eq_any(&owned)),
                        )
                        .execute(conn)
                        .await?;
                        diesel::delete(factura::table.filter(factura::cli_id.eq(raw)))
                            .execute(conn)
                            .await?;
                        diesel::update(usuario::table.filter(usuario::cli_id.eq(raw)))
                            .set(usuario::cli_id.eq(None::<i32>))
                            .execute(conn)
                            .await?;
                        let rows = diesel::delete(cliente::table.find(raw)).execute(conn).await?;
                        Ok::<_, diesel::result::Error>(rows > 0)
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error),
        }
    }

    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ClientRow> = cliente::table
            .find(id.as_i32())
            .select(ClientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Client>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ClientRow> = cliente::table
            .order(cliente::cli_id.asc())
            .select(ClientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
