//! Product use-case service.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Error;
use super::ports::{DeletePolicy, ProductRepository, ProductsPort, StoreError};
use super::product::{NewProduct, Product, ProductId, ProductPatch};

/// Product CRUD service.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    policy: DeletePolicy,
}

impl ProductService {
    /// Create the service over a repository with the configured delete
    /// policy.
    pub fn new(products: Arc<dyn ProductRepository>, policy: DeletePolicy) -> Self {
        Self { products, policy }
    }
}

#[async_trait]
impl ProductsPort for ProductService {
    async fn create(&self, draft: NewProduct) -> Result<Product, Error> {
        Ok(self.products.insert(&draft).await?)
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, Error> {
        let current = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))?;
        let updated = current
            .apply(patch)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.products.update(&updated).await?;
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<(), Error> {
        match self.products.delete(id, self.policy).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(format!("product {id} not found"))),
            Err(StoreError::ForeignKeyViolation { .. }) => Err(Error::conflict(format!(
                "product {id} appears on invoices and cannot be deleted"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    async fn list(&self) -> Result<Vec<Product>, Error> {
        Ok(self.products.list().await?)
    }
}
