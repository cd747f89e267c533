use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::features::notifications::handlers::notification_handler;
use crate::features::notifications::services::NotificationService;

pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(notification_handler::list_notifications).post(notification_handler::broadcast),
        )
        .route(
            "/api/notifications/unread-count",
            get(notification_handler::unread_count),
        )
        .route(
            "/api/notifications/read-all",
            put(notification_handler::mark_all_read),
        )
        .route(
            "/api/notifications/{id}",
            delete(notification_handler::delete_notification),
        )
        .route(
            "/api/notifications/{id}/read",
            put(notification_handler::mark_read),
        )
        .with_state(service)
}
