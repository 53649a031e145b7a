//! Client use-case service.
//!
//! Implements [`ClientsPort`] over a [`ClientRepository`], applying the
//! partial-update merge and the configured delete policy.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{Client, ClientId, ClientPatch, NewClient};
use super::error::Error;
use super::ports::{ClientRepository, ClientsPort, DeletePolicy, StoreError};

/// Client CRUD service.
#[derive(Clone)]
pub struct ClientService {
    clients: Arc<dyn ClientRepository>,
    policy: DeletePolicy,
}

impl ClientService {
    /// Create the service over a repository with the configured delete
    /// policy.
    pub fn new(clients: Arc<dyn ClientRepository>, policy: DeletePolicy) -> Self {
        Self { clients, policy }
    }
}

#[async_trait]
impl ClientsPort for ClientService {
    async fn create(&self, draft: NewClient) -> Result<Client, Error> {
        Ok(self.clients.insert(&draft).await?)
    }

    async fn update(&self, id: ClientId, patch: ClientPatch) -> Result<Client, Error> {
        let current = self
            .clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("client {id} not found")))?;
        let updated = current
            .apply(patch)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.clients.update(&updated).await?;
        Ok(updated)
    }

    async fn delete(&self, id: ClientId) -> Result<(), Error> {
        match self.clients.delete(id, self.policy).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(format!("client {id} not found"))),
            Err(StoreError::ForeignKeyViolation { constraint })
                if constraint.starts_with("usuario") =>
            {
                Err(Error::conflict(format!(
                    "client {id} has a linked user and cannot be deleted"
                )))
            }
            Err(StoreError::ForeignKeyViolation { .. }) => Err(Error::conflict(format!(
                "client {id} has invoices and cannot be deleted"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: ClientId) -> Result<Client, Error> {
        self.clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("client {id} not found")))
    }

    async fn list(&self) -> Result<Vec<Client>, Error> {
        Ok(self.clients.list().await?)
    }
}
