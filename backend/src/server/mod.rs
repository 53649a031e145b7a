//! Server construction: state wiring and route registration.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

use crate::domain::{
    AuthService, ClientService, InvoiceService, ProductService, ReportService, TokenSigner,
    UserService,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{clients, invoices, products, reports, users};
use crate::outbound::persistence::{
    DbPool, DieselClientRepository, DieselInvoiceRepository, DieselProductRepository,
    DieselUserRepository,
};

/// Wire the repository-backed services into the shared HTTP state.
pub fn build_http_state(pool: DbPool, config: &AppConfig) -> web::Data<HttpState> {
    let client_repo = Arc::new(DieselClientRepository::new(pool.clone()));
    let product_repo = Arc::new(DieselProductRepository::new(pool.clone()));
    let invoice_repo = Arc::new(DieselInvoiceRepository::new(pool.clone()));
    let user_repo = Arc::new(DieselUserRepository::new(pool));

    let tokens = Arc::new(TokenSigner::new(
        config.token_secret.as_bytes().to_vec(),
        config.token_ttl,
    ));

    web::Data::new(HttpState {
        clients: Arc::new(ClientService::new(
            client_repo.clone(),
            config.delete_policy,
        )),
        products: Arc::new(ProductService::new(
            product_repo.clone(),
            config.delete_policy,
        )),
        invoices: Arc::new(InvoiceService::new(
            invoice_repo.clone(),
            product_repo,
            client_repo.clone(),
        )),
        reports: Arc::new(ReportService::new(invoice_repo, client_repo)),
        users: Arc::new(UserService::new(user_repo.clone())),
        login: Arc::new(AuthService::new(user_repo, tokens.clone())),
        tokens,
    })
}

/// Register every route the API exposes.
///
/// Shared between the production server and the handler tests so both run
/// the same routing table.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(clients::list_clients)
        .service(clients::create_client)
        .service(clients::get_client)
        .service(clients::update_client)
        .service(clients::delete_client)
        .service(products::list_products)
        .service(products::create_product)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(invoices::list_invoices)
        .service(invoices::create_invoice)
        .service(invoices::get_invoice)
        .service(invoices::update_invoice)
        .service(invoices::delete_invoice)
        .service(invoices::add_line)
        .service(invoices::replace_lines)
        .service(invoices::remove_line)
        .service(reports::clients_with_invoices)
        .service(reports::invoice_products)
        .service(reports::client_invoices)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user);
}

/// Construct the HTTP server over an already-built pool.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: &AppConfig, pool: DbPool) -> std::io::Result<Server> {
    let state = build_http_state(pool, config);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure_app)
    })
    .bind(config.bind_addr)?
    .run();
    Ok(server)
}
