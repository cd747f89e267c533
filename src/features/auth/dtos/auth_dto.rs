use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::UserRole;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::validation::PHONE_REGEX;

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Phone must be a valid 10-digit mobile number"
    ))]
    pub phone: Option<String>,

    /// Requested role; defaults to dentist. Admin is granted by creating an organization.
    pub role: Option<UserRole>,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for authentication (register/login/organization creation)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseDto {
    /// Signed JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
    /// Authenticated user info
    pub user: UserResponseDto,
}

impl AuthResponseDto {
    pub fn bearer(access_token: String, expires_in: i64, user: UserResponseDto) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, phone: Option<&str>) -> RegisterRequestDto {
        RegisterRequestDto {
            name: "Dr. Meera Iyer".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: phone.map(str::to_string),
            role: None,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("meera@smile.in", "s3cure-pass", Some("9123456789"))
            .validate()
            .is_ok());
        assert!(register("not-an-email", "s3cure-pass", None)
            .validate()
            .is_err());
        assert!(register("meera@smile.in", "short", None).validate().is_err());
        assert!(register("meera@smile.in", "s3cure-pass", Some("912345678"))
            .validate()
            .is_err());
    }

    #[test]
    fn test_register_accepts_camel_case_role() {
        let dto: RegisterRequestDto = serde_json::from_str(
            r#"{"name":"Ravi","email":"ravi@smile.in","password":"password1","role":"receptionist"}"#,
        )
        .unwrap();
        assert_eq!(dto.role, Some(UserRole::Receptionist));
    }
}
