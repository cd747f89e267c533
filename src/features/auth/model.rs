use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;

/// Role of a user inside their organization, matching the `user_role` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Dentist,
    Receptionist,
    Assistant,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Dentist => write!(f, "dentist"),
            UserRole::Receptionist => write!(f, "receptionist"),
            UserRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Identity carried by a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Organization the user belonged to when the token was issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins and dentists may write clinical records (prescriptions, plans)
    pub fn is_clinician(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Dentist)
    }

    /// Organization id or a 403 for users who have not joined one yet
    pub fn organization(&self) -> Result<Uuid, AppError> {
        self.organization_id.ok_or_else(|| {
            AppError::Forbidden(
                "You must create or join an organization before accessing this resource"
                    .to_string(),
            )
        })
    }
}

/// JWT claims issued by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            organization_id: claims.org,
        }
    }
}
