//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{Client, ClientId, Invoice, InvoiceId, InvoiceLine, Product, ProductId};

use super::schema::{cliente, factura, factura_producto, producto, usuario};

/// Row struct for reading from the cliente table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cliente)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClientRow {
    pub cli_id: i32,
    pub cli_nombre: String,
    pub cli_correo: String,
    pub cli_estado: bool,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client::from_parts(
            ClientId::new(row.cli_id),
            row.cli_nombre,
            row.cli_correo,
            row.cli_estado,
        )
    }
}

/// Insertable struct for creating client records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cliente)]
pub(crate) struct NewClientRow<'a> {
    pub cli_nombre: &'a str,
    pub cli_correo: &'a str,
    pub cli_estado: bool,
}

/// Changeset struct for updating client records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cliente)]
pub(crate) struct ClientChangeset<'a> {
    pub cli_nombre: &'a str,
    pub cli_correo: &'a str,
    pub cli_estado: bool,
}

/// Row struct for reading from the producto table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = producto)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub pro_id: i32,
    pub pro_nombre: String,
    pub pro_pvp: Decimal,
    pub pro_impuesto: Decimal,
    pub pro_estado: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::from_parts(
            ProductId::new(row.pro_id),
            row.pro_nombre,
            row.pro_pvp,
            row.pro_impuesto,
            row.pro_estado,
        )
    }
}

/// Insertable struct for creating product records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = producto)]
pub(crate) struct NewProductRow<'a> {
    pub pro_nombre: &'a str,
    pub pro_pvp: Decimal,
    pub pro_impuesto: Decimal,
    pub pro_estado: bool,
}

/// Changeset struct for updating product records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = producto)]
pub(crate) struct ProductChangeset<'a> {
    pub pro_nombre: &'a str,
    pub pro_pvp: Decimal,
    pub pro_impuesto: Decimal,
    pub pro_estado: bool,
}

/// Row struct for reading from the factura table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = factura)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvoiceRow {
    pub fac_id: i32,
    pub cli_id: i32,
    pub fac_fecha: String,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice::from_parts(
            InvoiceId::new(row.fac_id),
            ClientId::new(row.cli_id),
            row.fac_fecha,
        )
    }
}

/// Insertable struct for creating invoice headers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = factura)]
pub(crate) struct NewInvoiceRow<'a> {
    pub cli_id: i32,
    pub fac_fecha: &'a str,
}

/// Row struct for reading from the factura_producto table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = factura_producto)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LineRow {
    pub fac_id: i32,
    pub pro_id: i32,
    pub facpro_cantidad: i32,
    pub facpro_pvp: Decimal,
    pub facpro_impuesto: Decimal,
}

impl From<LineRow> for InvoiceLine {
    fn from(row: LineRow) -> Self {
        InvoiceLine::from_parts(
            InvoiceId::new(row.fac_id),
            ProductId::new(row.pro_id),
            row.facpro_cantidad,
            row.facpro_pvp,
            row.facpro_impuesto,
        )
    }
}

/// Insertable struct for line rows; owned so batches can be built from
/// domain lines.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = factura_producto)]
pub(crate) struct NewLineRow {
    pub fac_id: i32,
    pub pro_id: i32,
    pub facpro_cantidad: i32,
    pub facpro_pvp: Decimal,
    pub facpro_impuesto: Decimal,
}

impl From<&InvoiceLine> for NewLineRow {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            fac_id: line.invoice_id().as_i32(),
            pro_id: line.product_id().as_i32(),
            facpro_cantidad: line.quantity(),
            facpro_pvp: line.unit_price(),
            facpro_impuesto: line.tax_rate(),
        }
    }
}

/// Row struct for reading from the usuario table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = usuario)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub usu_id: i32,
    pub usu_username: String,
    pub usu_password: String,
    pub usu_rol: String,
    pub cli_id: Option<i32>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = usuario)]
pub(crate) struct NewUserRow<'a> {
    pub usu_username: &'a str,
    pub usu_password: &'a str,
    pub usu_rol: &'a str,
    pub cli_id: Option<i32>,
}

/// Changeset struct for updating user records.
///
/// `cli_id` is wrapped so the changeset always writes the column, allowing
/// an update to detach the client link by setting it to `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = usuario)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub usu_username: &'a str,
    pub usu_password: &'a str,
    pub usu_rol: &'a str,
    pub cli_id: Option<i32>,
}
