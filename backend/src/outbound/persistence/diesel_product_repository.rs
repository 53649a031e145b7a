//! PostgreSQL-backed `ProductRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::{DeletePolicy, NewProduct, Product, ProductId, ProductRepository, StoreError};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{NewProductRow, ProductChangeset, ProductRow};
use super::pool::DbPool;
use super::schema::{factura_producto, producto};

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, draft: &NewProduct) -> Result<Product, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: ProductRow = diesel::insert_into(producto::table)
            .values(&NewProductRow {
                pro_nombre: draft.name(),
                pro_pvp: draft.unit_price(),
                pro_impuesto: draft.tax_rate(),
                pro_estado: draft.active(),
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(producto::table.find(product.id().as_i32()))
            .set(&ProductChangeset {
                pro_nombre: product.name(),
                pro_pvp: product.unit_price(),
                pro_impuesto: product.tax_rate(),
                pro_estado: product.active(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: ProductId, policy: DeletePolicy) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw = id.as_i32();
        match policy {
            // The foreign key on factura_producto.pro_id rejects referenced
            // products. Existing line snapshots keep their own price and tax
            // columns, so only unreferenced rows ever reach the delete.
            DeletePolicy::Restrict => diesel::delete(producto::table.find(raw))
                .execute(&mut conn)
                .await
                .map(|rows| rows > 0)
                .map_err(map_diesel_error),
            DeletePolicy::Cascade => conn
                .transaction(|conn| {
                    async move {
                        diesel::delete(
                            factura_producto::table.filter(factura_producto::pro_id.eq(raw)),
                        )
                        .execute(conn)
                        .await?;
                        let rows = diesel::delete(producto::table.find(raw)).execute(conn).await?;
                        Ok::<_, diesel::result::Error>(rows > 0)
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error),
        }
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProductRow> = producto::table
            .find(id.as_i32())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = producto::table
            .order(producto::pro_id.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
