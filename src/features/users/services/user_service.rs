use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::{hash_password, verify_password};
use crate::features::users::dtos::{
    ChangePasswordDto, UpdateProfileDto, UserQueryParams, UserResponseDto,
};
use crate::features::users::models::{User, USER_COLUMNS};
use crate::shared::types::{search_pattern, Paginated};

/// Service for user accounts and profiles
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the full user row by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Fetch a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = LOWER($1)", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user by email: {:?}", e);
                AppError::Database(e)
            })
    }

    /// List users belonging to the caller's organization
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: &UserQueryParams,
    ) -> Result<(Vec<UserResponseDto>, i64)> {
        let org_id = user.organization()?;
        let pattern = search_pattern(params.search.as_deref());

        let filter = r#"
            WHERE organization_id = $1
              AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2)
              AND ($3::user_role IS NULL OR role = $3)
              AND ($4::boolean IS NULL OR is_active = $4)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {}", filter))
            .bind(org_id)
            .bind(&pattern)
            .bind(params.role)
            .bind(params.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM users {} ORDER BY name {} LIMIT $5 OFFSET $6",
            USER_COLUMNS,
            filter,
            params.sort.as_sql()
        );

        let users = sqlx::query_as::<_, User>(&query)
            .bind(org_id)
            .bind(&pattern)
            .bind(params.role)
            .bind(params.is_active)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    /// Get a user in the caller's organization (or the caller themselves)
    pub async fn get(&self, caller: &AuthenticatedUser, id: Uuid) -> Result<UserResponseDto> {
        let user = self.find_by_id(id).await?;

        let same_org = caller.organization_id.is_some()
            && user.organization_id == caller.organization_id;
        if user.id != caller.user_id && !same_org {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(user.into())
    }

    pub async fn get_profile(&self, caller: &AuthenticatedUser) -> Result<UserResponseDto> {
        Ok(self.find_by_id(caller.user_id).await?.into())
    }

    /// Update the caller's name, email or phone
    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<UserResponseDto> {
        let query = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                phone = COALESCE($4, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(caller.user_id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.email.as_deref().map(str::trim))
            .bind(dto.phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile: {:?}", e);
                AppError::from_db(e, "Email is already registered")
            })?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!("User {} updated their profile", user.id);
        Ok(user.into())
    }

    /// Change the caller's password after verifying the current one
    pub async fn change_password(
        &self,
        caller: &AuthenticatedUser,
        dto: ChangePasswordDto,
    ) -> Result<()> {
        let user = self.find_by_id(caller.user_id).await?;

        if !verify_password(dto.current_password, user.password_hash).await? {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(dto.new_password).await?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(new_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to change password: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("User {} changed their password", user.id);
        Ok(())
    }
}
