use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::documents::handlers::document_handler;
use crate::features::documents::services::DocumentService;
use crate::shared::constants::MAX_DOCUMENT_SIZE;

pub fn routes(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route(
            "/api/patients/{patient_id}/documents",
            get(document_handler::list_documents).post(document_handler::upload_document),
        )
        .route_layer(DefaultBodyLimit::max(MAX_DOCUMENT_SIZE + 1024 * 1024))
        .route(
            "/api/patients/{patient_id}/documents/{id}",
            get(document_handler::get_document)
                .put(document_handler::update_document)
                .delete(document_handler::archive_document),
        )
        .route(
            "/api/patients/{patient_id}/documents/{id}/restore",
            post(document_handler::restore_document),
        )
        .route(
            "/api/patients/{patient_id}/documents/{id}/download",
            get(document_handler::download_document),
        )
        .with_state(service)
}
