use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::patients::handlers::patient_handler;
use crate::features::patients::services::PatientService;

pub fn routes(service: Arc<PatientService>) -> Router {
    Router::new()
        .route(
            "/api/patients",
            get(patient_handler::list_patients).post(patient_handler::create_patient),
        )
        .route(
            "/api/patients/{id}",
            get(patient_handler::get_patient)
                .put(patient_handler::update_patient)
                .delete(patient_handler::delete_patient),
        )
        .with_state(service)
}
