use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::appointments::handlers::appointment_handler;
use crate::features::appointments::services::AppointmentService;

pub fn routes(service: Arc<AppointmentService>) -> Router {
    Router::new()
        .route(
            "/api/appointments",
            get(appointment_handler::list_appointments)
                .post(appointment_handler::create_appointment),
        )
        .route(
            "/api/appointments/{id}",
            get(appointment_handler::get_appointment)
                .put(appointment_handler::update_appointment)
                .delete(appointment_handler::cancel_appointment),
        )
        .route(
            "/api/appointments/{id}/status",
            put(appointment_handler::update_appointment_status),
        )
        .with_state(service)
}
