use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::billing::handlers::invoice_handler;
use crate::features::billing::services::InvoiceService;

pub fn routes(service: Arc<InvoiceService>) -> Router {
    Router::new()
        .route(
            "/api/billing",
            get(invoice_handler::list_invoices).post(invoice_handler::create_invoice),
        )
        .route("/api/billing/export", get(invoice_handler::export_invoices))
        .route(
            "/api/billing/{id}",
            get(invoice_handler::get_invoice)
                .put(invoice_handler::update_invoice)
                .delete(invoice_handler::cancel_invoice),
        )
        .route(
            "/api/billing/{id}/payments",
            get(invoice_handler::list_payments).post(invoice_handler::record_payment),
        )
        .route("/api/billing/{id}/pdf", get(invoice_handler::download_pdf))
        .route("/api/billing/{id}/csv", get(invoice_handler::download_csv))
        .route("/api/billing/{id}/html", get(invoice_handler::download_html))
        .with_state(service)
}
