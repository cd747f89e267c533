use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::prescriptions::handlers::prescription_handler;
use crate::features::prescriptions::services::PrescriptionService;

pub fn routes(service: Arc<PrescriptionService>) -> Router {
    Router::new()
        .route(
            "/api/prescriptions",
            get(prescription_handler::list_prescriptions)
                .post(prescription_handler::create_prescription),
        )
        .route(
            "/api/prescriptions/{id}",
            get(prescription_handler::get_prescription)
                .put(prescription_handler::update_prescription)
                .delete(prescription_handler::delete_prescription),
        )
        .with_state(service)
}
