//! Test utilities for the backend crate.
//!
//! Provides an in-memory implementation of every repository port so unit
//! tests in `src/` and handler tests can exercise services without a
//! database. Only compiled when running tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    Client, ClientId, ClientRepository, DeletePolicy, Invoice, InvoiceId, InvoiceLine,
    InvoiceRepository, InvoiceWithClient, LineWithProduct, NewClient, NewInvoice, NewProduct,
    NewUser, Product, ProductId, ProductRepository, Role, StoreError, User, UserId,
    UserRepository,
};

#[derive(Default)]
struct State {
    clients: BTreeMap<i32, Client>,
    products: BTreeMap<i32, Product>,
    invoices: BTreeMap<i32, Invoice>,
    // Keyed by composite `(invoice, product)` identity.
    lines: BTreeMap<(i32, i32), InvoiceLine>,
    users: BTreeMap<i32, User>,
    next_client: i32,
    next_product: i32,
    next_invoice: i32,
    next_user: i32,
}

/// In-memory store implementing every repository port.
///
/// Honours the same referential rules the database adapters enforce:
/// delete policies, the unique username index, and cascading line removal.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("store mutex poisoned")
    }

    /// View as the client repository port, avoiding multi-trait method
    /// ambiguity at call sites.
    pub fn as_client_repo(&self) -> &dyn ClientRepository {
        self
    }

    /// View as the product repository port.
    pub fn as_product_repo(&self) -> &dyn ProductRepository {
        self
    }

    /// Insert an invoice header directly, bypassing service validation.
    pub fn seed_invoice(&self, client_id: ClientId, issue_date: &str) -> InvoiceId {
        let mut state = self.lock();
        state.next_invoice += 1;
        let id = state.next_invoice;
        state.invoices.insert(
            id,
            Invoice::from_parts(InvoiceId::new(id), client_id, issue_date.to_owned()),
        );
        InvoiceId::new(id)
    }

    /// Insert a line directly with an explicit snapshot.
    pub fn seed_line(
        &self,
        invoice_id: InvoiceId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
        tax_rate: Decimal,
    ) {
        let mut state = self.lock();
        state.lines.insert(
            (invoice_id.as_i32(), product_id.as_i32()),
            InvoiceLine::from_parts(invoice_id, product_id, quantity, unit_price, tax_rate),
        );
    }

    /// Seed a throwaway client, invoice, and one line referencing the given
    /// product. Returns the invoice id for later inspection.
    pub fn seed_line_for_product(&self, product_id: ProductId) -> InvoiceId {
        let client_id = {
            let mut state = self.lock();
            state.next_client += 1;
            let id = state.next_client;
            state.clients.insert(
                id,
                Client::from_parts(
                    ClientId::new(id),
                    format!("seed-client-{id}"),
                    format!("seed-{id}@example.com"),
                    true,
                ),
            );
            ClientId::new(id)
        };
        let invoice_id = self.seed_invoice(client_id, "2026-01-01");
        self.seed_line(invoice_id, product_id, 1, dec!(1.00), dec!(15.00));
        invoice_id
    }

    /// Insert a user linked to the given client, bypassing the services.
    pub fn seed_user_for_client(&self, client_id: ClientId) -> UserId {
        let mut state = self.lock();
        state.next_user += 1;
        let id = state.next_user;
        let user = User::from_parts(
            UserId::new(id),
            format!("user{id}"),
            "hash".to_owned(),
            Role::Client,
            Some(client_id),
        );
        state.users.insert(id, user);
        UserId::new(id)
    }

    /// Whether an invoice header is present.
    pub fn has_invoice(&self, id: InvoiceId) -> bool {
        self.lock().invoices.contains_key(&id.as_i32())
    }

    /// Current lines of one invoice in product-id order.
    pub fn lines_of(&self, invoice_id: InvoiceId) -> Vec<InvoiceLine> {
        self.lock()
            .lines
            .iter()
            .filter(|((inv, _), _)| *inv == invoice_id.as_i32())
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Rewrite a product's catalogue price in place, leaving existing line
    /// snapshots untouched.
    pub fn set_product_price(&self, id: ProductId, unit_price: Decimal) {
        let mut state = self.lock();
        if let Some(product) = state.products.get(&id.as_i32()) {
            let updated = Product::from_parts(
                product.id(),
                product.name().to_owned(),
                unit_price,
                product.tax_rate(),
                product.active(),
            );
            state.products.insert(id.as_i32(), updated);
        }
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn insert(&self, draft: &NewClient) -> Result<Client, StoreError> {
        let mut state = self.lock();
        state.next_client += 1;
        let id = state.next_client;
        let client = Client::from_parts(
            ClientId::new(id),
            draft.name().to_owned(),
            draft.email().to_owned(),
            draft.active(),
        );
        state.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn update(&self, client: &Client) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.clients.insert(client.id().as_i32(), client.clone());
        Ok(())
    }

    async fn delete(&self, id: ClientId, policy: DeletePolicy) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if !state.clients.contains_key(&id.as_i32()) {
            return Ok(false);
        }
        let owned: Vec<i32> = state
            .invoices
            .values()
            .filter(|invoice| invoice.client_id() == id)
            .map(|invoice| invoice.id().as_i32())
            .collect();
        let linked_user = state
            .users
            .values()
            .any(|user| user.client_id() == Some(id));
        match policy {
            DeletePolicy::Restrict if !owned.is_empty() => {
                return Err(StoreError::foreign_key("factura_cli_id_fkey"));
            }
            DeletePolicy::Restrict if linked_user => {
                return Err(StoreError::foreign_key("usuario_cli_id_fkey"));
            }
            DeletePolicy::Restrict => {}
            DeletePolicy::Cascade => {
                for invoice_id in &owned {
                    state.invoices.remove(invoice_id);
                    state.lines.retain(|(inv, _), _| inv != invoice_id);
                }
                let detached: Vec<(i32, User)> = state
                    .users
                    .values()
                    .filter(|user| user.client_id() == Some(id))
                    .map(|user| {
                        (
                            user.id().as_i32(),
                            User::from_parts(
                                user.id(),
                                user.username().to_owned(),
                                user.password_hash().to_owned(),
                                user.role(),
                                None,
                            ),
                        )
                    })
                    .collect();
                for (user_id, user) in detached {
                    state.users.insert(user_id, user);
                }
            }
        }
        state.clients.remove(&id.as_i32());
        Ok(true)
    }

    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        Ok(self.lock().clients.get(&id.as_i32()).cloned())
    }

    async fn list(&self) -> Result<Vec<Client>, StoreError> {
        Ok(self.lock().clients.values().cloned().collect())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert(&self, draft: &NewProduct) -> Result<Product, StoreError> {
        let mut state = self.lock();
        state.next_product += 1;
        let id = state.next_product;
        let product = Product::from_parts(
            ProductId::new(id),
            draft.name().to_owned(),
            draft.unit_price(),
            draft.tax_rate(),
            draft.active(),
        );
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.products.insert(product.id().as_i32(), product.clone());
        Ok(())
    }

    async fn delete(&self, id: ProductId, policy: DeletePolicy) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if !state.products.contains_key(&id.as_i32()) {
            return Ok(false);
        }
        let referenced = state.lines.keys().any(|(_, pro)| *pro == id.as_i32());
        match policy {
            DeletePolicy::Restrict if referenced => {
                return Err(StoreError::foreign_key("factura_producto_pro_id_fkey"));
            }
            DeletePolicy::Restrict => {}
            DeletePolicy::Cascade => {
                state.lines.retain(|(_, pro), _| *pro != id.as_i32());
            }
        }
        state.products.remove(&id.as_i32());
        Ok(true)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id.as_i32()).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock().products.values().cloned().collect())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn insert(&self, draft: &NewInvoice) -> Result<Invoice, StoreError> {
        let mut state = self.lock();
        state.next_invoice += 1;
        let id = state.next_invoice;
        let invoice = Invoice::from_parts(
            InvoiceId::new(id),
            draft.client_id(),
            draft.issue_date().to_owned(),
        );
        state.invoices.insert(id, invoice.clone());
        Ok(invoice)
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.invoices.insert(invoice.id().as_i32(), invoice.clone());
        Ok(())
    }

    async fn delete(&self, id: InvoiceId) -> Result<bool, StoreError> {
        let mut state = self.lock();
        let existed = state.invoices.remove(&id.as_i32()).is_some();
        if existed {
            state.lines.retain(|(inv, _), _| *inv != id.as_i32());
        }
        Ok(existed)
    }

    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        Ok(self.lock().invoices.get(&id.as_i32()).cloned())
    }

    async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        Ok(self.lock().invoices.values().cloned().collect())
    }

    async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, StoreError> {
        Ok(self
            .lock()
            .invoices
            .values()
            .filter(|invoice| invoice.client_id() == client_id)
            .cloned()
            .collect())
    }

    async fn upsert_line(&self, line: &InvoiceLine) -> Result<InvoiceLine, StoreError> {
        let mut state = self.lock();
        let key = (line.invoice_id().as_i32(), line.product_id().as_i32());
        let merged = match state.lines.get(&key) {
            Some(existing) => {
                let quantity = existing
                    .quantity()
                    .checked_add(line.quantity())
                    .ok_or_else(|| StoreError::query("facpro_cantidad out of range"))?;
                InvoiceLine::from_parts(
                    existing.invoice_id(),
                    existing.product_id(),
                    quantity,
                    existing.unit_price(),
                    existing.tax_rate(),
                )
            }
            None => line.clone(),
        };
        state.lines.insert(key, merged.clone());
        Ok(merged)
    }

    async fn remove_line(
        &self,
        invoice_id: InvoiceId,
        product_id: ProductId,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock();
        Ok(state
            .lines
            .remove(&(invoice_id.as_i32(), product_id.as_i32()))
            .is_some())
    }

    async fn replace_lines(
        &self,
        invoice_id: InvoiceId,
        lines: &[InvoiceLine],
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.lines.retain(|(inv, _), _| *inv != invoice_id.as_i32());
        for line in lines {
            state.lines.insert(
                (invoice_id.as_i32(), line.product_id().as_i32()),
                line.clone(),
            );
        }
        Ok(())
    }

    async fn lines(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceLine>, StoreError> {
        Ok(self.lines_of(invoice_id))
    }

    async fn lines_with_products(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<LineWithProduct>, StoreError> {
        let state = self.lock();
        Ok(state
            .lines
            .iter()
            .filter(|((inv, _), _)| *inv == invoice_id.as_i32())
            .map(|((_, pro), line)| LineWithProduct {
                line: line.clone(),
                product_name: state
                    .products
                    .get(pro)
                    .map(|product| product.name().to_owned())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn list_with_clients(&self) -> Result<Vec<InvoiceWithClient>, StoreError> {
        let state = self.lock();
        let mut joined: Vec<InvoiceWithClient> = state
            .invoices
            .values()
            .map(|invoice| InvoiceWithClient {
                invoice: invoice.clone(),
                client_name: state
                    .clients
                    .get(&invoice.client_id().as_i32())
                    .map(|client| client.name().to_owned())
                    .unwrap_or_default(),
            })
            .collect();
        joined.sort_by(|a, b| {
            (a.invoice.client_id(), a.invoice.id()).cmp(&(b.invoice.client_id(), b.invoice.id()))
        });
        Ok(joined)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, draft: &NewUser) -> Result<User, StoreError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|user| user.username() == draft.username())
        {
            return Err(StoreError::unique("usuario_usu_username_key"));
        }
        if draft.client_id().is_some()
            && state
                .users
                .values()
                .any(|user| user.client_id() == draft.client_id())
        {
            return Err(StoreError::unique("usuario_cli_id_key"));
        }
        state.next_user += 1;
        let id = state.next_user;
        let user = User::from_parts(
            UserId::new(id),
            draft.username().to_owned(),
            draft.password_hash().to_owned(),
            draft.role(),
            draft.client_id(),
        );
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|other| other.id() != user.id() && other.username() == user.username())
        {
            return Err(StoreError::unique("usuario_usu_username_key"));
        }
        if user.client_id().is_some()
            && state
                .users
                .values()
                .any(|other| other.id() != user.id() && other.client_id() == user.client_id())
        {
            return Err(StoreError::unique("usuario_cli_id_key"));
        }
        state.users.insert(user.id().as_i32(), user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.lock().users.remove(&id.as_i32()).is_some())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id.as_i32()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.values().cloned().collect())
    }
}
