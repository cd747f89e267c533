use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::staff::handlers::staff_handler;
use crate::features::staff::services::StaffService;

pub fn routes(service: Arc<StaffService>) -> Router {
    Router::new()
        .route(
            "/api/staff",
            get(staff_handler::list_staff).post(staff_handler::create_staff),
        )
        .route(
            "/api/staff/{id}",
            get(staff_handler::get_staff)
                .put(staff_handler::update_staff)
                .delete(staff_handler::delete_staff),
        )
        .with_state(service)
}
