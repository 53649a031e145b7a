//! Product API handlers.
//!
//! ```text
//! GET|POST /productos
//! GET|PUT|DELETE /productos/{proId}
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, NewProduct, Product, ProductId, ProductPatch};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Product payload using the wire column names.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub pro_id: i32,
    pub pro_nombre: String,
    pub pro_pvp: Decimal,
    pub pro_impuesto: Decimal,
    pub pro_estado: bool,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            pro_id: product.id().as_i32(),
            pro_nombre: product.name().to_owned(),
            pro_pvp: product.unit_price(),
            pro_impuesto: product.tax_rate(),
            pro_estado: product.active(),
        }
    }
}

/// Create request body. An absent `pro_impuesto` takes the catalogue
/// default; `pro_estado` defaults to active.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductBody {
    pub pro_nombre: String,
    pub pro_pvp: Decimal,
    pub pro_impuesto: Option<Decimal>,
    #[serde(default = "default_active")]
    pub pro_estado: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update body. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductBody {
    pub pro_nombre: Option<String>,
    pub pro_pvp: Option<Decimal>,
    pub pro_impuesto: Option<Decimal>,
    pub pro_estado: Option<bool>,
}

#[get("/productos")]
pub async fn list_products(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<ProductDto>>> {
    let products = state.products.list().await?;
    Ok(web::Json(products.into_iter().map(Into::into).collect()))
}

#[post("/productos")]
pub async fn create_product(
    state: web::Data<HttpState>,
    payload: web::Json<CreateProductBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = NewProduct::new(
        body.pro_nombre,
        body.pro_pvp,
        body.pro_impuesto,
        body.pro_estado,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let created = state.products.create(draft).await?;
    Ok(HttpResponse::Created().json(ProductDto::from(created)))
}

#[get("/productos/{proId}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ProductDto>> {
    let product = state
        .products
        .get(ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(product.into()))
}

#[put("/productos/{proId}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateProductBody>,
) -> ApiResult<web::Json<ProductDto>> {
    let body = payload.into_inner();
    let patch = ProductPatch {
        name: body.pro_nombre,
        unit_price: body.pro_pvp,
        tax_rate: body.pro_impuesto,
        active: body.pro_estado,
    };
    let updated = state
        .products
        .update(ProductId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(updated.into()))
}

#[delete("/productos/{proId}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.products.delete(ProductId::new(id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}
