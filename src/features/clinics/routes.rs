use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::clinics::handlers::clinic_handler;
use crate::features::clinics::services::ClinicService;

pub fn routes(service: Arc<ClinicService>) -> Router {
    Router::new()
        .route(
            "/api/clinics",
            get(clinic_handler::list_clinics).post(clinic_handler::create_clinic),
        )
        .route(
            "/api/clinics/{id}",
            get(clinic_handler::get_clinic)
                .put(clinic_handler::update_clinic)
                .delete(clinic_handler::delete_clinic),
        )
        .with_state(service)
}
