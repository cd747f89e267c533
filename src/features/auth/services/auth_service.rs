use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, RegisterRequestDto};
use crate::features::auth::jwt::JwtService;
use crate::features::auth::model::{AuthenticatedUser, UserRole};
use crate::features::auth::password::{hash_password, verify_password};
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::models::{User, USER_COLUMNS};
use crate::features::users::UserService;

/// Service for authentication operations (register, login, me)
pub struct AuthService {
    pool: PgPool,
    users: Arc<UserService>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(pool: PgPool, users: Arc<UserService>, jwt: Arc<JwtService>) -> Self {
        Self { pool, users, jwt }
    }

    /// Register a new user without an organization
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let role = dto.role.unwrap_or(UserRole::Dentist);
        if role == UserRole::Admin {
            return Err(AppError::BadRequest(
                "Admin role is granted by creating an organization".to_string(),
            ));
        }

        let password_hash = hash_password(dto.password).await?;

        let query = format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, phone)
            VALUES ($1, LOWER($2), $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(dto.name.trim())
            .bind(dto.email.trim())
            .bind(password_hash)
            .bind(role)
            .bind(dto.phone)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from_db(e, "Email is already registered")
            })?;

        tracing::info!("Registered user {} as {}", user.id, user.role);
        self.respond_with_token(user)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let invalid = || AppError::Auth("Invalid email or password".to_string());

        let user = self.users.find_by_email(&dto.email).await?.ok_or_else(invalid)?;

        if !verify_password(dto.password, user.password_hash.clone()).await? {
            return Err(invalid());
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record login for {}: {:?}", user.id, e);
                AppError::Database(e)
            })?;

        self.respond_with_token(user)
    }

    /// Current user, read fresh from the database
    pub async fn me(&self, user: &AuthenticatedUser) -> Result<UserResponseDto> {
        self.users.get_profile(user).await
    }

    /// Sign a token for the user's current role and organization
    pub fn respond_with_token(&self, user: User) -> Result<AuthResponseDto> {
        let issued = self.jwt.issue(&user)?;
        Ok(AuthResponseDto::bearer(
            issued.access_token,
            issued.expires_in,
            user.into(),
        ))
    }
}
