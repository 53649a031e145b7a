//! Read-only reporting queries over invoices, lines, and clients.
//!
//! Totals are derived on every read by the pricing engine from the
//! snapshotted line fields; nothing here writes to the store.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::ClientId;
use super::error::Error;
use super::invoice::{Invoice, InvoiceId};
use super::ports::{
    ClientRepository, InvoiceReport, InvoiceRepository, InvoiceWithClient, ReportLine, ReportsPort,
};
use super::pricing::{invoice_total, line_totals};

/// Reporting query service.
#[derive(Clone)]
pub struct ReportService {
    invoices: Arc<dyn InvoiceRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl ReportService {
    /// Create the service over the invoice and client repositories.
    pub fn new(invoices: Arc<dyn InvoiceRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { invoices, clients }
    }

    async fn build_report(
        &self,
        invoice: Invoice,
        client_name: String,
    ) -> Result<InvoiceReport, Error> {
        let joined = self.invoices.lines_with_products(invoice.id()).await?;
        let mut lines = Vec::with_capacity(joined.len());
        let mut derived = Vec::with_capacity(joined.len());
        for entry in joined {
            let totals = line_totals(
                entry.line.unit_price(),
                entry.line.tax_rate(),
                entry.line.quantity(),
            );
            derived.push(totals);
            lines.push(ReportLine {
                product_id: entry.line.product_id(),
                product_name: entry.product_name,
                quantity: entry.line.quantity(),
                unit_price: entry.line.unit_price(),
                tax_rate: entry.line.tax_rate(),
                subtotal: totals.subtotal,
                tax: totals.tax,
                total: totals.total,
            });
        }
        let total = invoice_total(derived);
        Ok(InvoiceReport {
            invoice,
            client_name,
            lines,
            total,
        })
    }

    async fn client_name(&self, id: ClientId) -> Result<String, Error> {
        let client = self
            .clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("client {id} not found")))?;
        Ok(client.name().to_owned())
    }
}

#[async_trait]
impl ReportsPort for ReportService {
    async fn invoices_with_clients(&self) -> Result<Vec<InvoiceWithClient>, Error> {
        Ok(self.invoices.list_with_clients().await?)
    }

    async fn invoice_products(&self, id: InvoiceId) -> Result<InvoiceReport, Error> {
        let invoice = self
            .invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("invoice {id} not found")))?;
        let client_name = self.client_name(invoice.client_id()).await?;
        self.build_report(invoice, client_name).await
    }

    async fn client_invoices(&self, client_id: ClientId) -> Result<Vec<InvoiceReport>, Error> {
        let client_name = self.client_name(client_id).await?;
        let headers = self.invoices.list_for_client(client_id).await?;
        let mut reports = Vec::with_capacity(headers.len());
        for invoice in headers {
            reports.push(self.build_report(invoice, client_name.clone()).await?);
        }
        Ok(reports)
    }
}
