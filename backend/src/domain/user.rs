//! User accounts and roles.
//!
//! A user optionally links 1:1 to a client record, which is how customer
//! logins see their own invoices. Passwords never appear here in plaintext;
//! the aggregate carries the argon2 hash produced by [`crate::domain::auth`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::client::ClientId;

/// Optional 1:1 link from a user account to a client record.
pub type ClientLink = Option<ClientId>;

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw store identifier.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw integer value for persistence and wire payloads.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access role claimed by a credential and stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user administration.
    Admin,
    /// Customer-facing access.
    Client,
}

impl Role {
    /// Canonical lowercase form stored in the database and token claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Client
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognised role spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    /// Case-insensitive parse; role comparisons throughout the system are
    /// case-insensitive as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

/// Validation errors for user drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// A persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    password_hash: String,
    role: Role,
    client_id: Option<ClientId>,
}

impl User {
    /// Rehydrate a user from stored fields.
    pub fn from_parts(
        id: UserId,
        username: String,
        password_hash: String,
        role: Role,
        client_id: Option<ClientId>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            role,
            client_id,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique login name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Stored argon2 hash. Never serialised to API responses.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Access role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Linked client, when this account belongs to a customer.
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }
}

/// Validated input for creating a user. Carries the already-hashed secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub(crate) username: String,
    pub(crate) password_hash: String,
    pub(crate) role: Role,
    pub(crate) client_id: Option<ClientId>,
}

impl NewUser {
    /// Validate raw create input. The role defaults to [`Role::Client`].
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: Option<Role>,
        client_id: Option<ClientId>,
    ) -> Result<Self, UserValidationError> {
        let username = username.into();
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password_hash,
            role: role.unwrap_or_default(),
            client_id,
        })
    }

    /// Unique login name (trimmed).
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Hashed secret.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Access role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Linked client, if any.
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }
}

/// Partial update for a user. `None` keeps the stored value; `client_id`
/// uses a nested option so callers can explicitly detach the client link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub client_id: Option<ClientLink>,
}

impl User {
    /// Merge a partial update, keeping absent fields.
    pub fn apply(&self, patch: UserPatch) -> Result<Self, UserValidationError> {
        let draft = NewUser::new(
            patch.username.unwrap_or_else(|| self.username.clone()),
            patch
                .password_hash
                .unwrap_or_else(|| self.password_hash.clone()),
            Some(patch.role.unwrap_or(self.role)),
            patch.client_id.unwrap_or(self.client_id),
        )?;
        Ok(Self {
            id: self.id,
            username: draft.username,
            password_hash: draft.password_hash,
            role: draft.role,
            client_id: draft.client_id,
        })
    }
}
