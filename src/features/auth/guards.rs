//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify they have the required role.
//!
//! Roles inside an organization:
//! - admin: manages the organization, clinics, members, settings and join requests
//! - dentist: clinical staff, writes prescriptions and treatment plans
//! - receptionist / assistant: front-desk work (patients, appointments, billing)

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

fn authenticated(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for organization administrators.
///
/// Yields the user and the organization they administer.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user, org_id): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser, pub Uuid);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        let org_id = user.organization()?;

        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Organization admin access required".to_string(),
            ));
        }

        Ok(RequireAdmin(user.clone(), org_id))
    }
}

/// Guard for clinical writes (admin or dentist).
pub struct RequireClinician(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireClinician
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        user.organization()?;

        if !user.is_clinician() {
            return Err(AppError::Forbidden(
                "Only dentists or admins can perform this action".to_string(),
            ));
        }

        Ok(RequireClinician(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::shared::test_helpers::authenticated_user;
    use axum::http::Request;

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    #[tokio::test]
    async fn test_require_admin_accepts_admin() {
        let user = authenticated_user(UserRole::Admin);
        let org = user.organization_id.unwrap();
        let mut parts = parts_with(Some(user));

        let RequireAdmin(_, org_id) = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(org_id, org);
    }

    #[tokio::test]
    async fn test_require_admin_rejects_receptionist() {
        let mut parts = parts_with(Some(authenticated_user(UserRole::Receptionist)));
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_admin_rejects_admin_without_organization() {
        let mut user = authenticated_user(UserRole::Admin);
        user.organization_id = None;
        let mut parts = parts_with(Some(user));
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_clinician() {
        let mut parts = parts_with(Some(authenticated_user(UserRole::Dentist)));
        assert!(RequireClinician::from_request_parts(&mut parts, &())
            .await
            .is_ok());

        let mut parts = parts_with(Some(authenticated_user(UserRole::Assistant)));
        assert!(RequireClinician::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let mut parts = parts_with(None);
        let result = RequireClinician::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
