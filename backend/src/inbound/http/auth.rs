//! Bearer-token authentication for HTTP handlers.
//!
//! Keeps the handler modules focused on request/response mapping by
//! concentrating token extraction, verification, and role gating here. The
//! admin gate is expressed as an extractor so gated handlers simply take an
//! [`AdminClaims`] parameter.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use std::future::{ready, Ready};

use crate::domain::{Claims, Error, TokenError};

use super::state::HttpState;

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("token expired"),
        _ => Error::unauthorized("invalid token"),
    }
}

/// Verify the request's bearer token against the process signer.
fn verified_claims(req: &HttpRequest) -> Result<Claims, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;
    let token = bearer_token(req)?;
    state
        .tokens
        .verify(token, Utc::now())
        .map_err(map_token_error)
}

/// Extractor for handlers gated to administrators.
///
/// Yields Unauthorized for a missing/bad/expired token and Forbidden for a
/// valid token whose role is not admin.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequest for AdminClaims {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verified_claims(req).and_then(|claims| {
            if claims.is_admin() {
                Ok(Self(claims))
            } else {
                Err(Error::forbidden("requires admin role"))
            }
        }))
    }
}
