use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::model::{AuthenticatedUser, Claims};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use crate::features::users::models::User;

/// Issues and validates HS256 access tokens signed with `JWT_SECRET`
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    leeway: u64,
}

/// A freshly issued token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl.as_secs() as i64,
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, AppError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds)
    pub fn issue_at(&self, user: &User, now: i64) -> Result<IssuedToken, AppError> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            org: user.organization_id,
            iat: now,
            exp: now + self.ttl_secs,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl_secs,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::shared::test_helpers::{sample_user, test_auth_config};

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new(&test_auth_config());
        let user = sample_user(UserRole::Dentist);

        let issued = service.issue(&user).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let validated = service.validate_token(&issued.access_token).unwrap();
        assert_eq!(validated.user_id, user.id);
        assert_eq!(validated.role, UserRole::Dentist);
        assert_eq!(validated.organization_id, user.organization_id);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new(&test_auth_config());
        let user = sample_user(UserRole::Admin);

        // Issued two hours ago with a one hour lifetime
        let issued = service
            .issue_at(&user, Utc::now().timestamp() - 7200)
            .unwrap();

        let err = service.validate_token(&issued.access_token).unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = JwtService::new(&test_auth_config());
        let mut other_config = test_auth_config();
        other_config.jwt_secret = "another-secret-that-is-long-enough-123".to_string();
        let other = JwtService::new(&other_config);

        let issued = other.issue(&sample_user(UserRole::Admin)).unwrap();
        assert!(service.validate_token(&issued.access_token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let service = JwtService::new(&test_auth_config());
        assert!(service.validate_token("not-a-jwt").is_err());
    }
}
