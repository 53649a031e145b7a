//! Client API handlers.
//!
//! ```text
//! GET|POST /clientes
//! GET|PUT|DELETE /clientes/{cliId}
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Client, ClientId, ClientPatch, Error, NewClient};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Client payload using the wire column names.
#[derive(Debug, Clone, Serialize)]
pub struct ClientDto {
    pub cli_id: i32,
    pub cli_nombre: String,
    pub cli_correo: String,
    pub cli_estado: bool,
}

impl From<Client> for ClientDto {
    fn from(client: Client) -> Self {
        Self {
            cli_id: client.id().as_i32(),
            cli_nombre: client.name().to_owned(),
            cli_correo: client.email().to_owned(),
            cli_estado: client.active(),
        }
    }
}

/// Create request body. `cli_estado` defaults to active.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientBody {
    pub cli_nombre: String,
    pub cli_correo: String,
    #[serde(default = "default_active")]
    pub cli_estado: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update body. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientBody {
    pub cli_nombre: Option<String>,
    pub cli_correo: Option<String>,
    pub cli_estado: Option<bool>,
}

#[get("/clientes")]
pub async fn list_clients(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<ClientDto>>> {
    let clients = state.clients.list().await?;
    Ok(web::Json(clients.into_iter().map(Into::into).collect()))
}

#[post("/clientes")]
pub async fn create_client(
    state: web::Data<HttpState>,
    payload: web::Json<CreateClientBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = NewClient::new(body.cli_nombre, body.cli_correo, body.cli_estado)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let created = state.clients.create(draft).await?;
    Ok(HttpResponse::Created().json(ClientDto::from(created)))
}

#[get("/clientes/{cliId}")]
pub async fn get_client(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ClientDto>> {
    let client = state.clients.get(ClientId::new(path.into_inner())).await?;
    Ok(web::Json(client.into()))
}

#[put("/clientes/{cliId}")]
pub async fn update_client(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateClientBody>,
) -> ApiResult<web::Json<ClientDto>> {
    let body = payload.into_inner();
    let patch = ClientPatch {
        name: body.cli_nombre,
        email: body.cli_correo,
        active: body.cli_estado,
    };
    let updated = state
        .clients
        .update(ClientId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(updated.into()))
}

#[delete("/clientes/{cliId}")]
pub async fn delete_client(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.clients.delete(ClientId::new(id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}
