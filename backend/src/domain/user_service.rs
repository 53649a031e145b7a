//! User administration and login use-cases.
//!
//! `UserService` owns the admin-gated CRUD; plaintext passwords arrive only
//! through [`RegisterUser`]/[`UserUpdate`] and are hashed before they touch a
//! repository. `AuthService` verifies credentials and issues tokens; both
//! unknown usernames and wrong passwords collapse into the same
//! "invalid credentials" answer so login probes cannot enumerate accounts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::auth::{self, LoginCredentials};
use super::error::Error;
use super::ports::{LoginOutcome, LoginPort, RegisterUser, StoreError, UserRepository, UserUpdate, UsersPort};
use super::token::TokenSigner;
use super::user::{NewUser, User, UserId, UserPatch};

/// Admin-gated user CRUD service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create the service over the user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn require_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn reject_taken_username(&self, username: &str, current: Option<UserId>) -> Result<(), Error> {
        if let Some(existing) = self.users.find_by_username(username).await? {
            if current != Some(existing.id()) {
                return Err(Error::conflict(format!(
                    "username {username} already in use"
                )));
            }
        }
        Ok(())
    }

    fn hash(password: &str) -> Result<String, Error> {
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty"));
        }
        auth::hash_password(password).map_err(|err| Error::internal(err.to_string()))
    }

    fn map_insert_error(error: StoreError) -> Error {
        // Races past the pre-check still land on a unique index; the
        // constraint name tells which invariant fired.
        match error {
            StoreError::UniqueViolation { constraint } if constraint.contains("cli_id") => {
                Error::conflict("client already has a user")
            }
            StoreError::UniqueViolation { .. } => Error::conflict("username already in use"),
            other => other.into(),
        }
    }
}

#[async_trait]
impl UsersPort for UserService {
    async fn create(&self, request: RegisterUser) -> Result<User, Error> {
        let password_hash = Self::hash(&request.password)?;
        let draft = NewUser::new(request.username, password_hash, request.role, request.client_id)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.reject_taken_username(draft.username(), None).await?;
        self.users
            .insert(&draft)
            .await
            .map_err(Self::map_insert_error)
    }

    async fn update(&self, id: UserId, request: UserUpdate) -> Result<User, Error> {
        let current = self.require_user(id).await?;
        if let Some(username) = &request.username {
            self.reject_taken_username(username.trim(), Some(id)).await?;
        }
        let password_hash = match &request.password {
            Some(password) => Some(Self::hash(password)?),
            None => None,
        };
        let updated = current
            .apply(UserPatch {
                username: request.username,
                password_hash,
                role: request.role,
                client_id: request.client_id,
            })
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.users
            .update(&updated)
            .await
            .map_err(Self::map_insert_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: UserId) -> Result<(), Error> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {id} not found")))
        }
    }

    async fn get(&self, id: UserId) -> Result<User, Error> {
        self.require_user(id).await
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        Ok(self.users.list().await?)
    }
}

/// Credential verification and token issuance.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenSigner>,
}

impl AuthService {
    /// Create the service over the user repository and token signer.
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenSigner>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl LoginPort for AuthService {
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
        if !auth::verify_password(user.password_hash(), credentials.password()) {
            return Err(Error::unauthorized("invalid credentials"));
        }
        let token = self
            .tokens
            .issue(&user, Utc::now())
            .map_err(|err| Error::internal(err.to_string()))?;
        Ok(LoginOutcome { token, user })
    }
}
