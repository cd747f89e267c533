use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::UserRole;
use crate::features::users::models::User;
use crate::shared::types::{default_page, default_page_size, Paginated, SortDirection};
use crate::shared::validation::PHONE_REGEX;

/// Public view of a user (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            phone: u.phone,
            organization_id: u.organization_id,
            is_active: u.is_active,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

/// Request DTO for updating the caller's own profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Phone must be a valid 10-digit mobile number"
    ))]
    pub phone: Option<String>,
}

/// Request DTO for changing the caller's password
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Query params for listing users of the caller's organization
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in name or email
    pub search: Option<String>,
    /// Filter by role
    pub role: Option<UserRole>,
    /// Filter by active flag
    pub is_active: Option<bool>,
    /// Sort direction by name (default: asc)
    #[serde(default = "asc")]
    pub sort: SortDirection,
}

fn asc() -> SortDirection {
    SortDirection::Asc
}

impl Paginated for UserQueryParams {
    fn page(&self) -> i64 {
        self.page
    }
    fn page_size(&self) -> i64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_phone_validation() {
        let bad = UpdateProfileDto {
            name: None,
            email: None,
            phone: Some("987654321".to_string()),
        };
        assert!(bad.validate().is_err());

        let good = UpdateProfileDto {
            name: Some("Dr. Rao".to_string()),
            email: Some("rao@clinic.in".to_string()),
            phone: Some("9876543210".to_string()),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_short_new_password_rejected() {
        let dto = ChangePasswordDto {
            current_password: "old-password".to_string(),
            new_password: "short".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
