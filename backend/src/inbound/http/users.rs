//! User administration and login API handlers.
//!
//! ```text
//! POST /login {"username":"ana","password":"s3cret"}
//! GET|POST /usuarios            admin only
//! GET|PUT|DELETE /usuarios/{id} admin only
//! ```
//!
//! User payloads never serialise the password hash.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::domain::{
    ClientId, Error, LoginCredentials, Role, RegisterUser, User, UserId, UserUpdate,
};
use crate::inbound::http::auth::AdminClaims;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// User payload using the wire column names; the hash never leaves the
/// server.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub usu_id: i32,
    pub usu_username: String,
    pub usu_rol: Role,
    pub cli_id: Option<i32>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            usu_id: user.id().as_i32(),
            usu_username: user.username().to_owned(),
            usu_rol: user.role(),
            cli_id: user.client_id().map(ClientId::as_i32),
        }
    }
}

/// Login request body for `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// Create request body. Role defaults to `client`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserBody {
    pub usu_username: String,
    pub usu_password: String,
    pub usu_rol: Option<Role>,
    pub cli_id: Option<i32>,
}

/// Distinguishes an absent field from an explicit `null`, so a `PUT` can
/// detach the client link by sending `"cli_id": null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial update body. A supplied password is re-hashed by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserBody {
    pub usu_username: Option<String>,
    pub usu_password: Option<String>,
    pub usu_rol: Option<Role>,
    #[serde(default, deserialize_with = "double_option")]
    pub cli_id: Option<Option<i32>>,
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&body.username, &body.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let outcome = state.login.login(credentials).await?;
    Ok(HttpResponse::Ok().json(json!({
        "token": outcome.token,
        "user": UserDto::from(outcome.user),
    })))
}

#[get("/usuarios")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _admin: AdminClaims,
) -> ApiResult<web::Json<Vec<UserDto>>> {
    let users = state.users.list().await?;
    Ok(web::Json(users.into_iter().map(Into::into).collect()))
}

#[post("/usuarios")]
pub async fn create_user(
    state: web::Data<HttpState>,
    _admin: AdminClaims,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let created = state
        .users
        .create(RegisterUser {
            username: body.usu_username,
            password: body.usu_password,
            role: body.usu_rol,
            client_id: body.cli_id.map(ClientId::new),
        })
        .await?;
    Ok(HttpResponse::Created().json(UserDto::from(created)))
}

#[get("/usuarios/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _admin: AdminClaims,
    path: web::Path<i32>,
) -> ApiResult<web::Json<UserDto>> {
    let user = state.users.get(UserId::new(path.into_inner())).await?;
    Ok(web::Json(user.into()))
}

#[put("/usuarios/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    _admin: AdminClaims,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<UserDto>> {
    let body = payload.into_inner();
    let updated = state
        .users
        .update(
            UserId::new(path.into_inner()),
            UserUpdate {
                username: body.usu_username,
                password: body.usu_password,
                role: body.usu_rol,
                client_id: body.cli_id.map(|link| link.map(ClientId::new)),
            },
        )
        .await?;
    Ok(web::Json(updated.into()))
}

#[delete("/usuarios/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    _admin: AdminClaims,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.users.delete(UserId::new(id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}
