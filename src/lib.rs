//! DentOS: multi-tenant dental clinic backend and typed API client.
//!
//! The binary in `main.rs` wires configuration, the database pool and object
//! storage into [`Services`] and serves [`api_router`]. The [`client`] module
//! is the library side used by frontends and tooling.

pub mod client;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use sqlx::PgPool;

use crate::core::middleware;
use crate::features::appointments::{routes as appointments_routes, AppointmentService};
use crate::features::auth::{routes as auth_routes, AuthService, JwtService};
use crate::features::billing::{routes as billing_routes, InvoiceService};
use crate::features::clinics::{routes as clinics_routes, ClinicService};
use crate::features::communications::{routes as communications_routes, CommunicationService};
use crate::features::documents::{routes as documents_routes, DocumentService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::organizations::{routes as organizations_routes, OrganizationService};
use crate::features::patients::{routes as patients_routes, PatientService};
use crate::features::prescriptions::{routes as prescriptions_routes, PrescriptionService};
use crate::features::reports::{routes as reports_routes, ReportService};
use crate::features::staff::{routes as staff_routes, StaffService};
use crate::features::treatments::{
    routes as treatments_routes, TreatmentPlanService, TreatmentService,
};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::storage::ObjectStorage;

/// Every feature service, shared across requests
pub struct Services {
    pub jwt: Arc<JwtService>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub organizations: Arc<OrganizationService>,
    pub clinics: Arc<ClinicService>,
    pub patients: Arc<PatientService>,
    pub documents: Arc<DocumentService>,
    pub staff: Arc<StaffService>,
    pub appointments: Arc<AppointmentService>,
    pub treatments: Arc<TreatmentService>,
    pub treatment_plans: Arc<TreatmentPlanService>,
    pub prescriptions: Arc<PrescriptionService>,
    pub invoices: Arc<InvoiceService>,
    pub notifications: Arc<NotificationService>,
    pub communications: Arc<CommunicationService>,
    pub reports: Arc<ReportService>,
}

impl Services {
    pub fn new(pool: PgPool, jwt: Arc<JwtService>, storage: Arc<dyn ObjectStorage>) -> Self {
        let users = Arc::new(UserService::new(pool.clone()));
        let auth = Arc::new(AuthService::new(
            pool.clone(),
            Arc::clone(&users),
            Arc::clone(&jwt),
        ));
        let organizations = Arc::new(OrganizationService::new(
            pool.clone(),
            Arc::clone(&users),
            Arc::clone(&auth),
        ));

        Self {
            jwt,
            auth,
            users,
            organizations,
            clinics: Arc::new(ClinicService::new(pool.clone())),
            patients: Arc::new(PatientService::new(pool.clone())),
            documents: Arc::new(DocumentService::new(pool.clone(), storage)),
            staff: Arc::new(StaffService::new(pool.clone())),
            appointments: Arc::new(AppointmentService::new(pool.clone())),
            treatments: Arc::new(TreatmentService::new(pool.clone())),
            treatment_plans: Arc::new(TreatmentPlanService::new(pool.clone())),
            prescriptions: Arc::new(PrescriptionService::new(pool.clone())),
            invoices: Arc::new(InvoiceService::new(pool.clone())),
            notifications: Arc::new(NotificationService::new(pool.clone())),
            communications: Arc::new(CommunicationService::new(pool.clone())),
            reports: Arc::new(ReportService::new(pool)),
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// API routes: register, login and health are public, everything else
/// sits behind the bearer token middleware.
pub fn api_router(services: &Services) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .merge(users_routes::routes(Arc::clone(&services.users)))
        .merge(organizations_routes::routes(Arc::clone(
            &services.organizations,
        )))
        .merge(clinics_routes::routes(Arc::clone(&services.clinics)))
        .merge(patients_routes::routes(Arc::clone(&services.patients)))
        .merge(documents_routes::routes(Arc::clone(&services.documents)))
        .merge(staff_routes::routes(Arc::clone(&services.staff)))
        .merge(appointments_routes::routes(Arc::clone(
            &services.appointments,
        )))
        .merge(treatments_routes::routes(
            Arc::clone(&services.treatments),
            Arc::clone(&services.treatment_plans),
        ))
        .merge(prescriptions_routes::routes(Arc::clone(
            &services.prescriptions,
        )))
        .merge(billing_routes::routes(Arc::clone(&services.invoices)))
        .merge(notifications_routes::routes(Arc::clone(
            &services.notifications,
        )))
        .merge(communications_routes::routes(Arc::clone(
            &services.communications,
        )))
        .merge(reports_routes::routes(Arc::clone(&services.reports)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.jwt),
            middleware::auth_middleware,
        ));

    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&services.auth)))
        .route("/health", get(health_check));

    Router::new().merge(protected_routes).merge(public_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::shared::constants::CLINIC_SCOPE_HEADER;
    use crate::shared::test_helpers::{lazy_pool, sample_user, test_auth_config, InMemoryStorage};
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;

    fn server() -> (TestServer, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::new(&test_auth_config()));
        let services = Services::new(
            lazy_pool(),
            Arc::clone(&jwt),
            Arc::new(InMemoryStorage::default()),
        );
        (TestServer::new(api_router(&services)).unwrap(), jwt)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (server, _) = server();
        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_without_token_is_unauthorized() {
        let (server, _) = server();
        let response = server.get("/api/patients").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (server, _) = server();
        let response = server
            .get("/api/billing")
            .authorization_bearer("not-a-jwt")
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_clinic_scope_is_bad_request() {
        let (server, jwt) = server();
        let token = jwt.issue(&sample_user(UserRole::Receptionist)).unwrap();

        let response = server
            .get("/api/patients")
            .authorization_bearer(token.access_token)
            .add_header(
                HeaderName::from_static(CLINIC_SCOPE_HEADER),
                HeaderValue::from_static("front-desk"),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_without_organization_is_forbidden() {
        let (server, jwt) = server();
        let mut user = sample_user(UserRole::Dentist);
        user.organization_id = None;
        let token = jwt.issue(&user).unwrap();

        let response = server
            .get("/api/appointments")
            .authorization_bearer(token.access_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_receptionist_cannot_broadcast() {
        let (server, jwt) = server();
        let token = jwt.issue(&sample_user(UserRole::Receptionist)).unwrap();

        let response = server
            .post("/api/notifications")
            .authorization_bearer(token.access_token)
            .json(&serde_json::json!({ "title": "Closed", "message": "Clinic closed today" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
