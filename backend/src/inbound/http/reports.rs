//! Reporting API handlers: read-only joins with derived totals.
//!
//! ```text
//! GET /consultas/clientes-facturas
//! GET /consultas/factura/{facId}/productos
//! GET /consultas/cliente/{cliId}/facturas-productos
//! ```

use actix_web::{get, web};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{ClientId, InvoiceId, InvoiceReport, InvoiceWithClient, ReportLine};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Invoice header joined with its client's name.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithClientDto {
    pub fac_id: i32,
    pub cli_id: i32,
    pub cli_nombre: String,
    pub fac_fecha: String,
}

impl From<InvoiceWithClient> for InvoiceWithClientDto {
    fn from(joined: InvoiceWithClient) -> Self {
        Self {
            fac_id: joined.invoice.id().as_i32(),
            cli_id: joined.invoice.client_id().as_i32(),
            cli_nombre: joined.client_name,
            fac_fecha: joined.invoice.issue_date().to_owned(),
        }
    }
}

/// One reported line with its snapshot and derived amounts.
#[derive(Debug, Clone, Serialize)]
pub struct ReportLineDto {
    pub pro_id: i32,
    pub pro_nombre: String,
    pub facpro_cantidad: i32,
    pub facpro_pvp: Decimal,
    pub facpro_impuesto: Decimal,
    pub subtotal: Decimal,
    pub impuesto: Decimal,
    pub total: Decimal,
}

impl From<ReportLine> for ReportLineDto {
    fn from(line: ReportLine) -> Self {
        Self {
            pro_id: line.product_id.as_i32(),
            pro_nombre: line.product_name,
            facpro_cantidad: line.quantity,
            facpro_pvp: line.unit_price,
            facpro_impuesto: line.tax_rate,
            subtotal: line.subtotal,
            impuesto: line.tax,
            total: line.total,
        }
    }
}

/// An invoice with its lines and derived grand total.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceReportDto {
    pub fac_id: i32,
    pub cli_id: i32,
    pub cli_nombre: String,
    pub fac_fecha: String,
    pub productos: Vec<ReportLineDto>,
    pub total: Decimal,
}

impl From<InvoiceReport> for InvoiceReportDto {
    fn from(report: InvoiceReport) -> Self {
        Self {
            fac_id: report.invoice.id().as_i32(),
            cli_id: report.invoice.client_id().as_i32(),
            cli_nombre: report.client_name,
            fac_fecha: report.invoice.issue_date().to_owned(),
            productos: report.lines.into_iter().map(Into::into).collect(),
            total: report.total,
        }
    }
}

#[get("/consultas/clientes-facturas")]
pub async fn clients_with_invoices(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<InvoiceWithClientDto>>> {
    let joined = state.reports.invoices_with_clients().await?;
    Ok(web::Json(joined.into_iter().map(Into::into).collect()))
}

#[get("/consultas/factura/{facId}/productos")]
pub async fn invoice_products(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<InvoiceReportDto>> {
    let report = state
        .reports
        .invoice_products(InvoiceId::new(path.into_inner()))
        .await?;
    Ok(web::Json(report.into()))
}

#[get("/consultas/cliente/{cliId}/facturas-productos")]
pub async fn client_invoices(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<InvoiceReportDto>>> {
    let reports = state
        .reports
        .client_invoices(ClientId::new(path.into_inner()))
        .await?;
    Ok(web::Json(reports.into_iter().map(Into::into).collect()))
}
