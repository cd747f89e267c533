//! Typed client for the DentOS API.
//!
//! The pieces mirror what a browser frontend keeps around:
//!
//! - [`LocalStore`]: persisted `token`, `clinicScope`, `themeMode` and
//!   `hasVisitedBefore` keys in one JSON file
//! - [`SessionStore`]: the signed-in user and token expiry
//! - [`ClinicScopeStore`]: the selected clinic, broadcast on change
//! - [`ApiClient`]: one attempt per call, bearer token and `X-Clinic-Scope`
//!   attached, 401 clears the session
//!
//! # Example
//! ```ignore
//! let local = Arc::new(LocalStore::open("dentos-state.json").await?);
//! let session = Arc::new(SessionStore::new(Arc::clone(&local)));
//! let scope = Arc::new(ClinicScopeStore::load(Arc::clone(&local)).await);
//! let api = ApiClient::new("http://localhost:5000", Arc::clone(&session), scope);
//!
//! session.login(&api, "asha@brightsmile.in", "secret-password").await?;
//! let patients = api.patients().list(&ListQuery::new().search("jane")).await?;
//! ```

mod api;
mod error;
pub mod resources;
mod scope;
mod session;
mod state;

pub use api::{ApiClient, ListQuery, Page};
pub use error::{ClientError, ClientResult, FALLBACK_ERROR_MESSAGE, LOGIN_PATH};
pub use resources::{DocumentUpload, NewPatientForm};
pub use scope::ClinicScopeStore;
pub use session::{is_token_expired, token_expiry, AuthState, SessionStore};
pub use state::{LocalStore, PersistedState, ThemeMode};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::jwt::JwtService;
    use crate::features::auth::model::UserRole;
    use crate::features::users::dtos::UserResponseDto;
    use crate::shared::scope::ClinicScope;
    use crate::shared::test_helpers::{sample_user, test_auth_config};
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post, put},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use uuid::Uuid;

    #[derive(Debug, Clone)]
    struct Recorded {
        path: String,
        authorization: Option<String>,
        clinic_scope: Option<String>,
        body: Value,
    }

    #[derive(Default)]
    struct Stub {
        requests: Mutex<Vec<Recorded>>,
        unread: AtomicI64,
    }

    impl Stub {
        fn record(&self, path: &str, headers: &HeaderMap, body: Value) {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            self.requests.lock().unwrap().push(Recorded {
                path: path.to_string(),
                authorization: header("authorization"),
                clinic_scope: header("x-clinic-scope"),
                body,
            });
        }

        fn last(&self) -> Recorded {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    fn user_json() -> Value {
        serde_json::to_value(UserResponseDto::from(sample_user(UserRole::Receptionist))).unwrap()
    }

    async fn create_patient(
        State(stub): State<Arc<Stub>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        stub.record("/api/patients", &headers, body.clone());
        let patient = json!({
            "id": Uuid::new_v4(),
            "clinicId": body["clinicId"],
            "name": body["name"],
            "phone": body["phone"],
            "address": body["address"],
            "allergies": [],
            "isActive": true,
            "createdAt": "2026-01-05T10:00:00Z",
            "updatedAt": "2026-01-05T10:00:00Z",
        });
        (
            StatusCode::CREATED,
            Json(json!({ "success": true, "data": patient, "message": "Patient created" })),
        )
    }

    async fn unread_count(State(stub): State<Arc<Stub>>) -> Json<Value> {
        let count = stub.unread.load(Ordering::SeqCst);
        Json(json!({ "success": true, "data": { "count": count } }))
    }

    async fn read_all(State(stub): State<Arc<Stub>>) -> Json<Value> {
        let updated = stub.unread.swap(0, Ordering::SeqCst);
        Json(json!({ "success": true, "data": { "updated": updated } }))
    }

    async fn expired_session() -> (StatusCode, Json<Value>) {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Token has expired" })),
        )
    }

    async fn conflict() -> (StatusCode, Json<Value>) {
        (
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "message": "Dentist already has an appointment at this time",
            })),
        )
    }

    async fn broken() -> (StatusCode, &'static str) {
        (StatusCode::BAD_GATEWAY, "<html>upstream down</html>")
    }

    async fn login(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        assert!(headers.get("authorization").is_none());
        if body["password"] == "wrong-password" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "Invalid email or password" })),
            );
        }
        let mut user = sample_user(UserRole::Dentist);
        user.email = body["email"].as_str().unwrap_or_default().to_string();
        let issued = JwtService::new(&test_auth_config()).issue(&user).unwrap();
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "accessToken": issued.access_token,
                    "tokenType": "Bearer",
                    "expiresIn": issued.expires_in,
                    "user": UserResponseDto::from(user),
                }
            })),
        )
    }

    async fn me(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> Json<Value> {
        stub.record("/api/auth/me", &headers, Value::Null);
        Json(json!({ "success": true, "data": user_json() }))
    }

    async fn spawn_stub() -> (String, Arc<Stub>) {
        let stub = Arc::new(Stub::default());
        let router = Router::new()
            .route("/api/patients", post(create_patient))
            .route("/api/notifications/unread-count", get(unread_count))
            .route("/api/notifications/read-all", put(read_all))
            .route("/api/prescriptions", get(expired_session))
            .route("/api/appointments", post(conflict))
            .route("/api/treatments", get(broken))
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .with_state(Arc::clone(&stub));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}/", addr), stub)
    }

    struct Harness {
        api: ApiClient,
        session: Arc<SessionStore>,
        local: Arc<LocalStore>,
        stub: Arc<Stub>,
        _dir: TempDir,
    }

    async fn harness(signed_in: bool) -> Harness {
        let (base_url, stub) = spawn_stub().await;
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalStore::open(dir.path().join("state.json")).await.unwrap());
        if signed_in {
            let token = JwtService::new(&test_auth_config())
                .issue(&sample_user(UserRole::Receptionist))
                .unwrap()
                .access_token;
            local.update(|s| s.token = Some(token)).await.unwrap();
        }
        let session = Arc::new(SessionStore::new(Arc::clone(&local)));
        let scope = Arc::new(ClinicScopeStore::load(Arc::clone(&local)).await);
        let api = ApiClient::new(base_url, Arc::clone(&session), scope);
        Harness {
            api,
            session,
            local,
            stub,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_add_patient_posts_full_name_and_address() {
        let h = harness(true).await;
        let clinic = Uuid::new_v4();
        h.api
            .clinic_scope()
            .select(ClinicScope::Clinic(clinic))
            .await
            .unwrap();

        let form = NewPatientForm {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: "9876543210".to_string(),
            pincode: Some("560001".to_string()),
            clinic_id: Some(clinic),
            ..Default::default()
        };
        let patient = h.api.patients().add(form).await.unwrap();
        assert_eq!(patient.name, "Jane Doe");

        let request = h.stub.last();
        assert_eq!(request.path, "/api/patients");
        assert_eq!(request.body["name"], "Jane Doe");
        assert_eq!(request.body["address"]["pincode"], "560001");
        assert!(request
            .authorization
            .as_deref()
            .unwrap()
            .starts_with("Bearer "));
        assert_eq!(request.clinic_scope, Some(clinic.to_string()));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_points_to_login() {
        let h = harness(true).await;
        assert!(h.session.token().await.is_some());

        let err = h
            .api
            .prescriptions()
            .list(&ListQuery::new())
            .await
            .unwrap_err();
        match err {
            ClientError::Unauthorized { redirect_to } => assert_eq!(redirect_to, LOGIN_PATH),
            other => panic!("unexpected {:?}", other),
        }
        assert!(h.local.snapshot().await.token.is_none());
        assert!(!h.session.state().is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_server_message() {
        let h = harness(false).await;

        let err = h
            .session
            .login(&h.api, "meera@brightsmile.in", "wrong-password")
            .await
            .unwrap_err();
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "Invalid email or password");
        match err {
            ClientError::Api { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(h.session.state(), AuthState::Unauthenticated));
    }

    #[tokio::test]
    async fn test_server_message_and_fallback() {
        let h = harness(true).await;

        let err = h
            .api
            .post::<_, Value>("/api/appointments", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dentist already has an appointment at this time"
        );

        let err = h
            .api
            .treatments()
            .list(&ListQuery::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_mark_all_read_twice_leaves_zero_unread() {
        let h = harness(true).await;
        h.stub.unread.store(3, Ordering::SeqCst);
        let notifications = h.api.notifications();

        assert_eq!(notifications.unread_count().await.unwrap(), 3);
        assert_eq!(notifications.mark_all_read().await.unwrap(), 3);
        assert_eq!(notifications.unread_count().await.unwrap(), 0);
        assert_eq!(notifications.mark_all_read().await.unwrap(), 0);
        assert_eq!(notifications.unread_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_then_restore() {
        let h = harness(false).await;
        let mut states = h.session.subscribe();

        let user = h
            .session
            .login(&h.api, " meera@brightsmile.in ", "correct-password")
            .await
            .unwrap();
        assert_eq!(user.email, "meera@brightsmile.in");
        assert!(states.has_changed().unwrap());
        assert!(states.borrow_and_update().is_authenticated());
        assert!(h.local.snapshot().await.token.is_some());

        assert!(h.session.restore(&h.api).await.unwrap());
        let request = h.stub.last();
        assert_eq!(request.path, "/api/auth/me");
        assert!(request.authorization.is_some());
        assert_eq!(request.clinic_scope.as_deref(), Some("all"));
    }

    #[tokio::test]
    async fn test_restore_without_token_stays_signed_out() {
        let h = harness(false).await;
        assert!(!h.session.restore(&h.api).await.unwrap());
        assert!(matches!(h.session.state(), AuthState::Unauthenticated));
    }
}
