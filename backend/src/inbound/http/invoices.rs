//! Invoice API handlers: headers and line items.
//!
//! ```text
//! GET|POST /facturas
//! GET|PUT|DELETE /facturas/{facId}
//! POST /facturas/{facId}/productos           add or merge one line
//! PUT /facturas/{facId}/productos            replace the whole line set
//! DELETE /facturas/{facId}/productos/{proId} drop one line entirely
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    ClientId, Invoice, InvoiceId, InvoiceLine, InvoicePatch, LineRequest, ProductId,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Invoice header payload using the wire column names.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
    pub fac_id: i32,
    pub cli_id: i32,
    pub fac_fecha: String,
}

impl From<Invoice> for InvoiceDto {
    fn from(invoice: Invoice) -> Self {
        Self {
            fac_id: invoice.id().as_i32(),
            cli_id: invoice.client_id().as_i32(),
            fac_fecha: invoice.issue_date().to_owned(),
        }
    }
}

/// Line payload carrying the stored snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LineDto {
    pub fac_id: i32,
    pub pro_id: i32,
    pub facpro_cantidad: i32,
    pub facpro_pvp: Decimal,
    pub facpro_impuesto: Decimal,
}

impl From<InvoiceLine> for LineDto {
    fn from(line: InvoiceLine) -> Self {
        Self {
            fac_id: line.invoice_id().as_i32(),
            pro_id: line.product_id().as_i32(),
            facpro_cantidad: line.quantity(),
            facpro_pvp: line.unit_price(),
            facpro_impuesto: line.tax_rate(),
        }
    }
}

/// Create request body for an invoice header.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceBody {
    pub cli_id: i32,
    pub fac_fecha: String,
}

/// Partial update body for an invoice header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoiceBody {
    pub cli_id: Option<i32>,
    pub fac_fecha: Option<String>,
}

/// Request body for adding or replacing lines.
#[derive(Debug, Clone, Deserialize)]
pub struct LineBody {
    pub pro_id: i32,
    pub facpro_cantidad: i32,
}

impl From<LineBody> for LineRequest {
    fn from(body: LineBody) -> Self {
        Self {
            product_id: ProductId::new(body.pro_id),
            quantity: body.facpro_cantidad,
        }
    }
}

#[get("/facturas")]
pub async fn list_invoices(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<InvoiceDto>>> {
    let invoices = state.invoices.list().await?;
    Ok(web::Json(invoices.into_iter().map(Into::into).collect()))
}

#[post("/facturas")]
pub async fn create_invoice(
    state: web::Data<HttpState>,
    payload: web::Json<CreateInvoiceBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let created = state
        .invoices
        .create(ClientId::new(body.cli_id), body.fac_fecha)
        .await?;
    Ok(HttpResponse::Created().json(InvoiceDto::from(created)))
}

#[get("/facturas/{facId}")]
pub async fn get_invoice(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<InvoiceDto>> {
    let invoice = state
        .invoices
        .get(InvoiceId::new(path.into_inner()))
        .await?;
    Ok(web::Json(invoice.into()))
}

#[put("/facturas/{facId}")]
pub async fn update_invoice(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateInvoiceBody>,
) -> ApiResult<web::Json<InvoiceDto>> {
    let body = payload.into_inner();
    let patch = InvoicePatch {
        client_id: body.cli_id.map(ClientId::new),
        issue_date: body.fac_fecha,
    };
    let updated = state
        .invoices
        .update(InvoiceId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(updated.into()))
}

#[delete("/facturas/{facId}")]
pub async fn delete_invoice(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.invoices.delete(InvoiceId::new(id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}

#[post("/facturas/{facId}/productos")]
pub async fn add_line(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<LineBody>,
) -> ApiResult<HttpResponse> {
    let line = state
        .invoices
        .add_line(InvoiceId::new(path.into_inner()), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(LineDto::from(line)))
}

#[put("/facturas/{facId}/productos")]
pub async fn replace_lines(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<Vec<LineBody>>,
) -> ApiResult<web::Json<Vec<LineDto>>> {
    let requests = payload.into_inner().into_iter().map(Into::into).collect();
    let lines = state
        .invoices
        .replace_lines(InvoiceId::new(path.into_inner()), requests)
        .await?;
    Ok(web::Json(lines.into_iter().map(Into::into).collect()))
}

#[delete("/facturas/{facId}/productos/{proId}")]
pub async fn remove_line(
    state: web::Data<HttpState>,
    path: web::Path<(i32, i32)>,
) -> ApiResult<HttpResponse> {
    let (fac_id, pro_id) = path.into_inner();
    state
        .invoices
        .remove_line(InvoiceId::new(fac_id), ProductId::new(pro_id))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "fac_id": fac_id, "pro_id": pro_id })))
}
