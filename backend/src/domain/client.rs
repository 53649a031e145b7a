//! Client aggregate and its validation rules.
//!
//! Purpose: model the customers invoices are issued to. Identifiers are
//! store-assigned positive integers and are never reassigned.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned client identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i32);

impl ClientId {
    /// Wrap a raw store identifier.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw integer value for persistence and wire payloads.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for client drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    /// Name was missing or blank once trimmed.
    #[error("client name must not be empty")]
    EmptyName,
    /// Email was missing or blank once trimmed.
    #[error("client email must not be empty")]
    EmptyEmail,
}

/// A persisted client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    id: ClientId,
    name: String,
    email: String,
    active: bool,
}

impl Client {
    /// Rehydrate a client from stored fields without re-validation.
    ///
    /// Adapters use this when loading rows the store already validated on
    /// the write path.
    pub fn from_parts(id: ClientId, name: String, email: String, active: bool) -> Self {
        Self {
            id,
            name,
            email,
            active,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact email. Free text; the source system never validated it as
    /// RFC-compliant and neither does this layer.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the client is active.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Merge a partial update into this client, keeping absent fields.
    ///
    /// An explicitly supplied empty string overwrites and then fails
    /// validation, matching the API's partial-update contract.
    pub fn apply(&self, patch: ClientPatch) -> Result<Self, ClientValidationError> {
        let draft = NewClient::new(
            patch.name.unwrap_or_else(|| self.name.clone()),
            patch.email.unwrap_or_else(|| self.email.clone()),
            patch.active.unwrap_or(self.active),
        )?;
        Ok(Self {
            id: self.id,
            name: draft.name,
            email: draft.email,
            active: draft.active,
        })
    }
}

/// Validated input for creating a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) active: bool,
}

impl NewClient {
    /// Validate raw create input.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::NewClient;
    ///
    /// let draft = NewClient::new("Ana", "ana@example.com", true).unwrap();
    /// assert_eq!(draft.name(), "Ana");
    /// ```
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        active: bool,
    ) -> Result<Self, ClientValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ClientValidationError::EmptyName);
        }
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ClientValidationError::EmptyEmail);
        }
        Ok(Self {
            name,
            email,
            active,
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the client starts active.
    pub fn active(&self) -> bool {
        self.active
    }
}

/// Partial update for a client. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl ClientPatch {
    /// True when no field is supplied, making the update a no-op.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ana() -> Client {
        Client::from_parts(ClientId::new(1), "Ana".into(), "ana@example.com".into(), true)
    }

    #[rstest]
    #[case("", "a@b", ClientValidationError::EmptyName)]
    #[case("   ", "a@b", ClientValidationError::EmptyName)]
    #[case("Ana", "", ClientValidationError::EmptyEmail)]
    #[case("Ana", "  ", ClientValidationError::EmptyEmail)]
    fn new_client_rejects_blank_fields(
        #[case] name: &str,
        #[case] email: &str,
        #[case] expected: ClientValidationError,
    ) {
        let err = NewClient::new(name, email, true).expect_err("blank input must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn empty_patch_keeps_all_fields() {
        let updated = ana().apply(ClientPatch::default()).expect("no-op patch");
        assert_eq!(updated, ana());
    }

    #[rstest]
    fn patch_overwrites_only_supplied_fields() {
        let updated = ana()
            .apply(ClientPatch {
                email: Some("ana@corp.example".into()),
                ..ClientPatch::default()
            })
            .expect("valid patch");
        assert_eq!(updated.name(), "Ana");
        assert_eq!(updated.email(), "ana@corp.example");
        assert!(updated.active());
    }

    #[rstest]
    fn explicit_empty_string_fails_validation() {
        let err = ana()
            .apply(ClientPatch {
                name: Some(String::new()),
                ..ClientPatch::default()
            })
            .expect_err("explicit empty overwrite must fail");
        assert_eq!(err, ClientValidationError::EmptyName);
    }
}
