//! Signed, time-boxed access tokens.
//!
//! Format: `v1.<base64url payload>.<base64url HMAC-SHA256 signature>`. The
//! payload is the JSON [`Claims`] issued at login. The signature covers the
//! encoded payload part; verification is constant time via the MAC. There is
//! no refresh path — expired callers authenticate again.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::client::ClientId;
use super::user::{Role, User, UserId};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION_V1: &str = "v1";
const MAX_TOKEN_LEN: usize = 1024;

/// Failures while issuing or verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token is not in the `v1.payload.sig` shape or exceeds limits.
    #[error("malformed token")]
    InvalidFormat,
    /// Unknown version prefix.
    #[error("unsupported token version")]
    UnsupportedVersion,
    /// Signature does not match the payload.
    #[error("token signature mismatch")]
    InvalidSignature,
    /// The token's expiry instant has passed.
    #[error("token expired")]
    Expired,
    /// Payload failed to (de)serialise.
    #[error("invalid token payload: {0}")]
    Payload(String),
}

/// Identity and role claims embedded in an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    /// Unix timestamp (seconds) the token was issued at.
    pub issued_at: i64,
    /// Unix timestamp (seconds) after which the token is rejected.
    pub expires_at: i64,
}

impl Claims {
    /// Whether the claimed role satisfies admin-gated endpoints.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Issues and verifies signed access tokens with a process-wide secret.
///
/// Constructed once at startup from configuration and injected wherever
/// tokens are touched; there is no ambient/global secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer over the given secret and token lifetime.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token for the authenticated user, valid from `now` for the
    /// configured lifetime.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: user.id(),
            username: user.username().to_owned(),
            role: user.role(),
            client_id: user.client_id(),
            issued_at: now.timestamp(),
            expires_at: (now + self.ttl).timestamp(),
        };
        let payload_bytes =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Payload(e.to_string()))?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);
        let sig_part = URL_SAFE_NO_PAD.encode(self.sign(payload_part.as_bytes())?);
        Ok(format!("{TOKEN_VERSION_V1}.{payload_part}.{sig_part}"))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::InvalidFormat);
        }
        let (payload_part, sig_part) = parse_token_parts(token)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::Payload(e.to_string()))?;
        mac.update(payload_part.as_bytes());
        let expected = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| TokenError::InvalidFormat)?;
        mac.verify_slice(&expected)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| TokenError::InvalidFormat)?;
        let claims: Claims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| TokenError::Payload(e.to_string()))?;

        if now.timestamp() >= claims.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::Payload(e.to_string()))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn parse_token_parts(token: &str) -> Result<(&str, &str), TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [version, payload, sig] if *version == TOKEN_VERSION_V1 => Ok((payload, sig)),
        [_, _, _] => Err(TokenError::UnsupportedVersion),
        _ => Err(TokenError::InvalidFormat),
    }
}
