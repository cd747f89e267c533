use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::features::organizations::handlers::organization_handler;
use crate::features::organizations::services::OrganizationService;

pub fn routes(service: Arc<OrganizationService>) -> Router {
    Router::new()
        .route(
            "/api/organizations",
            post(organization_handler::create_organization),
        )
        .route(
            "/api/organizations/current",
            get(organization_handler::get_current).put(organization_handler::update_current),
        )
        .route(
            "/api/organizations/settings",
            get(organization_handler::get_settings).put(organization_handler::update_settings),
        )
        .route(
            "/api/organizations/search",
            get(organization_handler::search_organizations),
        )
        .route(
            "/api/organizations/{id}/join-requests",
            post(organization_handler::request_to_join),
        )
        .route(
            "/api/organizations/join-requests",
            get(organization_handler::list_join_requests),
        )
        .route(
            "/api/organizations/join-requests/mine",
            get(organization_handler::my_join_requests),
        )
        .route(
            "/api/organizations/join-requests/{id}/approve",
            put(organization_handler::approve_join_request),
        )
        .route(
            "/api/organizations/join-requests/{id}/deny",
            put(organization_handler::deny_join_request),
        )
        .route(
            "/api/organizations/members",
            get(organization_handler::list_members),
        )
        .route(
            "/api/organizations/members/{user_id}",
            delete(organization_handler::remove_member),
        )
        .route(
            "/api/organizations/members/{user_id}/role",
            put(organization_handler::change_member_role),
        )
        .with_state(service)
}
