//! Invoice use-case service: header CRUD and line-item mutations.
//!
//! Line additions snapshot the product's current price and tax rate; merges
//! keep the first-add snapshot. The whole-set replace runs through the cart
//! merge first and then a single transactional write, so a failure partway
//! can never leave the invoice half-edited.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::ClientId;
use super::error::Error;
use super::invoice::{Invoice, InvoiceId, InvoiceLine, InvoicePatch, NewInvoice};
use super::ports::{
    ClientRepository, InvoiceRepository, InvoicesPort, LineRequest, ProductRepository,
};
use super::pricing::{Cart, ProductSnapshot};
use super::product::{Product, ProductId};

/// Invoice command/query service.
#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    products: Arc<dyn ProductRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl InvoiceService {
    /// Create the service over the invoice, product, and client
    /// repositories.
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        products: Arc<dyn ProductRepository>,
        clients: Arc<dyn ClientRepository>,
    ) -> Self {
        Self {
            invoices,
            products,
            clients,
        }
    }

    async fn require_invoice(&self, id: InvoiceId) -> Result<Invoice, Error> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("invoice {id} not found")))
    }

    async fn require_product(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    async fn require_client_exists(&self, id: ClientId) -> Result<(), Error> {
        if self.clients.find_by_id(id).await?.is_none() {
            return Err(Error::invalid_request(format!(
                "client {id} does not exist"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InvoicesPort for InvoiceService {
    async fn create(&self, client_id: ClientId, issue_date: String) -> Result<Invoice, Error> {
        self.require_client_exists(client_id).await?;
        let draft = NewInvoice::new(client_id, issue_date)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(self.invoices.insert(&draft).await?)
    }

    async fn update(&self, id: InvoiceId, patch: InvoicePatch) -> Result<Invoice, Error> {
        let current = self.require_invoice(id).await?;
        if let Some(client_id) = patch.client_id {
            self.require_client_exists(client_id).await?;
        }
        let updated = current
            .apply(patch)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.invoices.update(&updated).await?;
        Ok(updated)
    }

    async fn delete(&self, id: InvoiceId) -> Result<(), Error> {
        if self.invoices.delete(id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("invoice {id} not found")))
        }
    }

    async fn get(&self, id: InvoiceId) -> Result<Invoice, Error> {
        self.require_invoice(id).await
    }

    async fn list(&self) -> Result<Vec<Invoice>, Error> {
        Ok(self.invoices.list().await?)
    }

    async fn add_line(&self, id: InvoiceId, request: LineRequest) -> Result<InvoiceLine, Error> {
        if request.quantity <= 0 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }
        self.require_invoice(id).await?;
        let product = self.require_product(request.product_id).await?;

        let line = InvoiceLine::from_parts(
            id,
            product.id(),
            request.quantity,
            product.unit_price(),
            product.tax_rate(),
        );
        Ok(self.invoices.upsert_line(&line).await?)
    }

    async fn remove_line(&self, id: InvoiceId, product_id: ProductId) -> Result<(), Error> {
        self.require_invoice(id).await?;
        if self.invoices.remove_line(id, product_id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!(
                "product {product_id} is not on invoice {id}"
            )))
        }
    }

    async fn replace_lines(
        &self,
        id: InvoiceId,
        requests: Vec<LineRequest>,
    ) -> Result<Vec<InvoiceLine>, Error> {
        self.require_invoice(id).await?;

        // Run the incoming set through the cart so duplicate products merge
        // additively before anything touches the store.
        let mut cart = Cart::new();
        for request in &requests {
            let product = self.require_product(request.product_id).await?;
            cart.add(&ProductSnapshot::from(&product), request.quantity)?;
        }

        let lines: Vec<InvoiceLine> = cart
            .lines()
            .iter()
            .map(|line| {
                InvoiceLine::from_parts(
                    id,
                    line.product_id(),
                    line.quantity(),
                    line.unit_price(),
                    line.tax_rate(),
                )
            })
            .collect();

        self.invoices.replace_lines(id, &lines).await?;
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::NewClient;
    use crate::domain::product::NewProduct;
    use crate::domain::ErrorCode;
    use crate::test_support::InMemoryStore;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: InvoiceService,
        client_id: ClientId,
        widget: ProductId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let service = InvoiceService::new(store.clone(), store.clone(), store.clone());
        let client_id = store
            .as_client_repo()
            .insert(&NewClient::new("Ana", "ana@example.com", true).expect("valid"))
            .await
            .expect("client")
            .id();
        let widget = store
            .as_product_repo()
            .insert(&NewProduct::new("Widget", dec!(9.99), Some(dec!(15.00)), true).expect("valid"))
            .await
            .expect("product")
            .id();
        Fixture {
            store,
            service,
            client_id,
            widget,
        }
    }

    #[rstest]
    fn create_rejects_unknown_client() {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let err = fx
                .service
                .create(ClientId::new(404), "2026-08-29".into())
                .await
                .expect_err("unknown client");
            assert_eq!(err.code(), ErrorCode::InvalidRequest);
        });
    }

    #[rstest]
    fn add_line_merges_and_keeps_first_snapshot() {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let invoice = fx
                .service
                .create(fx.client_id, "2026-08-29".into())
                .await
                .expect("invoice");

            fx.service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: fx.widget,
                        quantity: 2,
                    },
                )
                .await
                .expect("first add");

            // Price drifts between adds; the stored snapshot must not move.
            fx.store.set_product_price(fx.widget, dec!(12.00));

            let merged = fx
                .service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: fx.widget,
                        quantity: 3,
                    },
                )
                .await
                .expect("merge add");

            assert_eq!(merged.quantity(), 5);
            assert_eq!(merged.unit_price(), dec!(9.99));
            assert_eq!(fx.store.lines_of(invoice.id()).len(), 1);
        });
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    fn add_line_rejects_non_positive_quantity(#[case] quantity: i32) {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let invoice = fx
                .service
                .create(fx.client_id, "2026-08-29".into())
                .await
                .expect("invoice");
            let err = fx
                .service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: fx.widget,
                        quantity,
                    },
                )
                .await
                .expect_err("bad quantity");
            assert_eq!(err.code(), ErrorCode::InvalidRequest);
        });
    }

    #[rstest]
    fn add_line_for_unknown_product_is_not_found() {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let invoice = fx
                .service
                .create(fx.client_id, "2026-08-29".into())
                .await
                .expect("invoice");
            let err = fx
                .service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: ProductId::new(404),
                        quantity: 1,
                    },
                )
                .await
                .expect_err("unknown product");
            assert_eq!(err.code(), ErrorCode::NotFound);
        });
    }

    #[rstest]
    fn remove_line_deletes_the_whole_row() {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let invoice = fx
                .service
                .create(fx.client_id, "2026-08-29".into())
                .await
                .expect("invoice");
            fx.service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: fx.widget,
                        quantity: 4,
                    },
                )
                .await
                .expect("add");

            fx.service
                .remove_line(invoice.id(), fx.widget)
                .await
                .expect("remove");
            assert!(fx.store.lines_of(invoice.id()).is_empty());

            let err = fx
                .service
                .remove_line(invoice.id(), fx.widget)
                .await
                .expect_err("already gone");
            assert_eq!(err.code(), ErrorCode::NotFound);
        });
    }

    #[rstest]
    fn replace_lines_merges_duplicates_before_writing() {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let invoice = fx
                .service
                .create(fx.client_id, "2026-08-29".into())
                .await
                .expect("invoice");
            fx.service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: fx.widget,
                        quantity: 1,
                    },
                )
                .await
                .expect("seed line");

            let lines = fx
                .service
                .replace_lines(
                    invoice.id(),
                    vec![
                        LineRequest {
                            product_id: fx.widget,
                            quantity: 2,
                        },
                        LineRequest {
                            product_id: fx.widget,
                            quantity: 3,
                        },
                    ],
                )
                .await
                .expect("replace");

            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].quantity(), 5);
            assert_eq!(fx.store.lines_of(invoice.id()).len(), 1);
        });
    }

    #[rstest]
    fn delete_invoice_cascades_lines() {
        actix_rt::System::new().block_on(async {
            let fx = fixture().await;
            let invoice = fx
                .service
                .create(fx.client_id, "2026-08-29".into())
                .await
                .expect("invoice");
            fx.service
                .add_line(
                    invoice.id(),
                    LineRequest {
                        product_id: fx.widget,
                        quantity: 1,
                    },
                )
                .await
                .expect("add");

            fx.service.delete(invoice.id()).await.expect("delete");
            assert!(fx.store.lines_of(invoice.id()).is_empty());
        });
    }
}
