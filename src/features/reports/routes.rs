use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::reports::handlers::report_handler;
use crate::features::reports::services::ReportService;

pub fn routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route("/api/reports/summary", get(report_handler::get_summary))
        .route("/api/reports/revenue", get(report_handler::get_revenue))
        .route(
            "/api/reports/appointments",
            get(report_handler::get_appointments),
        )
        .route(
            "/api/reports/treatments",
            get(report_handler::get_top_treatments),
        )
        .with_state(service)
}
