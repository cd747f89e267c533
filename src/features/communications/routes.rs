use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::communications::handlers::communication_handler;
use crate::features::communications::services::CommunicationService;

pub fn routes(service: Arc<CommunicationService>) -> Router {
    Router::new()
        .route(
            "/api/communications",
            get(communication_handler::list_communications)
                .post(communication_handler::create_communication),
        )
        .route(
            "/api/communications/{id}",
            get(communication_handler::get_communication)
                .put(communication_handler::update_communication)
                .delete(communication_handler::delete_communication),
        )
        .with_state(service)
}
