//! PostgreSQL-backed `InvoiceRepository` implementation using Diesel.
//!
//! Line merges use the `(fac_id, pro_id)` primary key with an upsert that
//! only bumps the quantity, so the price and tax snapshot from the first add
//! survive later merges. Header deletes and whole-set replaces run in one
//! transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::{
    ClientId, Invoice, InvoiceId, InvoiceLine, InvoiceRepository, InvoiceWithClient,
    LineWithProduct, NewInvoice, ProductId, StoreError,
};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{InvoiceRow, LineRow, NewInvoiceRow, NewLineRow};
use super::pool::DbPool;
use super::schema::{cliente, factura, factura_producto, producto};

/// Diesel-backed implementation of the `InvoiceRepository` port.
#[derive(Clone)]
pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for DieselInvoiceRepository {
    async fn insert(&self, draft: &NewInvoice) -> Result<Invoice, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: InvoiceRow = diesel::insert_into(factura::table)
            .values(&NewInvoiceRow {
                cli_id: draft.client_id().as_i32(),
                fac_fecha: draft.issue_date(),
            })
            .returning(InvoiceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(factura::table.find(invoice.id().as_i32()))
            .set((
                factura::cli_id.eq(invoice.client_id().as_i32()),
                factura::fac_fecha.eq(invoice.issue_date()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: InvoiceId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw = id.as_i32();
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    factura_producto::table.filter(factura_producto::fac_id.eq(raw)),
                )
                .execute(conn)
                .await?;
                let rows = diesel::delete(factura::table.find(raw)).execute(conn).await?;
                Ok::<_, diesel::result::Error>(rows > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<InvoiceRow> = factura::table
            .find(id.as_i32())
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InvoiceRow> = factura::table
            .order(factura::fac_id.asc())
            .select(InvoiceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InvoiceRow> = factura::table
            .filter(factura::cli_id.eq(client_id.as_i32()))
            .order(factura::fac_id.asc())
            .select(InvoiceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_line(&self, line: &InvoiceLine) -> Result<InvoiceLine, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: LineRow = diesel::insert_into(factura_producto::table)
            .values(&NewLineRow::from(line))
            .on_conflict((factura_producto::fac_id, factura_producto::pro_id))
            .do_update()
            // Quantity accumulates; the stored snapshot columns stay put.
            .set(
                factura_producto::facpro_cantidad.eq(factura_producto::facpro_cantidad
                    + excluded(factura_producto::facpro_cantidad)),
            )
            .returning(LineRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn remove_line(
        &self,
        invoice_id: InvoiceId,
        product_id: ProductId,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(factura_producto::table.find((invoice_id.as_i32(), product_id.as_i32())))
            .execute(&mut conn)
            .await
            .map(|rows| rows > 0)
            .map_err(map_diesel_error)
    }

    async fn replace_lines(
        &self,
        invoice_id: InvoiceId,
        lines: &[InvoiceLine],
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw = invoice_id.as_i32();
        let rows: Vec<NewLineRow> = lines.iter().map(NewLineRow::from).collect();
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    factura_producto::table.filter(factura_producto::fac_id.eq(raw)),
                )
                .execute(conn)
                .await?;
                if !rows.is_empty() {
                    diesel::insert_into(factura_producto::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn lines(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceLine>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LineRow> = factura_producto::table
            .filter(factura_producto::fac_id.eq(invoice_id.as_i32()))
            .order(factura_producto::pro_id.asc())
            .select(LineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn lines_with_products(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<LineWithProduct>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(LineRow, String)> = factura_producto::table
            .inner_join(producto::table)
            .filter(factura_producto::fac_id.eq(invoice_id.as_i32()))
            .order(factura_producto::pro_id.asc())
            .select((LineRow::as_select(), producto::pro_nombre))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, product_name)| LineWithProduct {
                line: row.into(),
                product_name,
            })
            .collect())
    }

    async fn list_with_clients(&self) -> Result<Vec<InvoiceWithClient>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(InvoiceRow, String)> = factura::table
            .inner_join(cliente::table)
            .order((factura::cli_id.asc(), factura::fac_id.asc()))
            .select((InvoiceRow::as_select(), cliente::cli_nombre))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, client_name)| InvoiceWithClient {
                invoice: row.into(),
                client_name,
            })
            .collect())
    }
}
