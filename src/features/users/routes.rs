use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::users::handlers::user_handler;
use crate::features::users::services::UserService;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users", get(user_handler::list_users))
        .route(
            "/api/users/profile",
            get(user_handler::get_profile).put(user_handler::update_profile),
        )
        .route("/api/users/password", put(user_handler::change_password))
        .route("/api/users/{id}", get(user_handler::get_user))
        .with_state(service)
}
