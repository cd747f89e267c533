use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::CLINIC_SCOPE_HEADER;
use crate::shared::scope::{ClinicScope, TenantScope};

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Raw `X-Clinic-Scope` header; a missing header means every clinic.
fn clinic_scope(parts: &Parts) -> Result<ClinicScope, AppError> {
    match parts.headers.get(CLINIC_SCOPE_HEADER) {
        None => Ok(ClinicScope::All),
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid X-Clinic-Scope header".to_string()))?
            .parse()
            .map_err(|e: crate::shared::scope::InvalidClinicScope| {
                AppError::BadRequest(e.to_string())
            }),
    }
}

/// Resolves the caller's organization and the requested clinic narrowing.
///
/// Rejects with 403 when the caller has no organization and 400 when the
/// scope header is malformed.
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        let organization_id = user.organization()?;
        let clinic = clinic_scope(parts)?;
        Ok(TenantScope::new(organization_id, clinic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::shared::test_helpers::authenticated_user;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts(user: Option<AuthenticatedUser>, scope: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(scope) = scope {
            builder = builder.header(CLINIC_SCOPE_HEADER, scope);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    #[tokio::test]
    async fn test_missing_header_means_all() {
        let user = authenticated_user(UserRole::Receptionist);
        let org = user.organization_id.unwrap();
        let mut parts = parts(Some(user), None);

        let scope = TenantScope::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(scope.organization_id, org);
        assert!(scope.clinic.is_all());
    }

    #[tokio::test]
    async fn test_clinic_header_narrows_scope() {
        let clinic = Uuid::new_v4();
        let mut parts = parts(
            Some(authenticated_user(UserRole::Dentist)),
            Some(&clinic.to_string()),
        );

        let scope = TenantScope::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(scope.clinic_id(), Some(clinic));
    }

    #[tokio::test]
    async fn test_malformed_header_is_bad_request() {
        let mut parts = parts(
            Some(authenticated_user(UserRole::Dentist)),
            Some("clinic-one"),
        );
        let result = TenantScope::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_user_without_organization_is_forbidden() {
        let mut user = authenticated_user(UserRole::Dentist);
        user.organization_id = None;
        let mut parts = parts(Some(user), Some("all"));
        let result = TenantScope::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
