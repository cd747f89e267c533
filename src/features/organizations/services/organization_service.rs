use std::sync::Arc;

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::AuthResponseDto;
use crate::features::auth::model::{AuthenticatedUser, UserRole};
use crate::features::auth::AuthService;
use crate::features::notifications::models::{NewNotification, NotificationKind};
use crate::features::notifications::notify;
use crate::features::organizations::dtos::{
    ApproveJoinRequestDto, CreateJoinRequestDto, CreateOrganizationDto, JoinRequestQueryParams,
    JoinRequestResponseDto, OrganizationResponseDto, OrganizationSearchParams,
    OrganizationSettingsDto, OrganizationSummaryDto, UpdateOrganizationDto, UpdateSettingsDto,
};
use crate::features::organizations::models::{
    code_from_name, JoinRequest, JoinRequestStatus, Organization, OrganizationSettings,
    JOIN_REQUEST_COLUMNS, JOIN_REQUEST_FROM, ORGANIZATION_COLUMNS, SETTINGS_COLUMNS,
};
use crate::features::users::dtos::{UserQueryParams, UserResponseDto};
use crate::features::users::models::{User, USER_COLUMNS};
use crate::features::users::UserService;
use crate::shared::types::{search_pattern, Paginated};

/// Service for organizations, their settings, join requests and members
pub struct OrganizationService {
    pool: PgPool,
    users: Arc<UserService>,
    auth: Arc<AuthService>,
}

impl OrganizationService {
    pub fn new(pool: PgPool, users: Arc<UserService>, auth: Arc<AuthService>) -> Self {
        Self { pool, users, auth }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> Result<()> {
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit organization transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find(&self, id: Uuid) -> Result<Organization> {
        let query = format!(
            "SELECT {} FROM organizations WHERE id = $1",
            ORGANIZATION_COLUMNS
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch organization {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
    }

    /// Create an organization; the caller becomes its admin and receives a fresh token
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        dto: CreateOrganizationDto,
    ) -> Result<AuthResponseDto> {
        let current = self.users.find_by_id(caller.user_id).await?;
        if current.organization_id.is_some() {
            return Err(AppError::BadRequest(
                "You already belong to an organization".to_string(),
            ));
        }

        let code = dto
            .code
            .clone()
            .unwrap_or_else(|| code_from_name(&dto.name));
        if code.len() < 2 {
            return Err(AppError::BadRequest(
                "Cannot derive an organization code from this name, please provide one"
                    .to_string(),
            ));
        }

        let mut tx = self.begin().await?;

        let query = format!(
            r#"
            INSERT INTO organizations (name, code, email, phone, address, owner_id)
            VALUES ($1, $2, LOWER($3), $4, $5, $6)
            RETURNING {}
            "#,
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&query)
            .bind(dto.name.trim())
            .bind(&code)
            .bind(dto.email.as_deref().map(str::trim))
            .bind(dto.phone)
            .bind(dto.address.map(Json))
            .bind(caller.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create organization: {:?}", e);
                AppError::from_db(e, "Organization code is already taken")
            })?;

        sqlx::query("INSERT INTO organization_settings (organization_id) VALUES ($1)")
            .bind(organization.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create organization settings: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            r#"
            UPDATE users SET organization_id = $2, role = 'admin', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(caller.user_id)
            .bind(organization.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to attach owner to organization: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query(
            r#"
            UPDATE join_requests SET status = 'denied', updated_at = NOW()
            WHERE user_id = $1 AND status = 'pending'
            "#,
        )
        .bind(caller.user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to close pending join requests: {:?}", e);
            AppError::Database(e)
        })?;

        Self::commit(tx).await?;

        tracing::info!(
            "Organization {} ({}) created by {}",
            organization.id,
            organization.code,
            user.id
        );
        self.auth.respond_with_token(user)
    }

    pub async fn current(&self, org_id: Uuid) -> Result<OrganizationResponseDto> {
        Ok(self.find(org_id).await?.into())
    }

    pub async fn update_current(
        &self,
        org_id: Uuid,
        dto: UpdateOrganizationDto,
    ) -> Result<OrganizationResponseDto> {
        let query = format!(
            r#"
            UPDATE organizations SET
                name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&query)
            .bind(org_id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.email.as_deref().map(str::trim))
            .bind(dto.phone)
            .bind(dto.address.map(Json))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update organization {}: {:?}", org_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        tracing::info!("Organization {} updated", org_id);
        Ok(organization.into())
    }

    pub async fn settings(&self, org_id: Uuid) -> Result<OrganizationSettingsDto> {
        sqlx::query(
            "INSERT INTO organization_settings (organization_id) VALUES ($1) ON CONFLICT DO NOTHING",
        )
        .bind(org_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialize settings for {}: {:?}", org_id, e);
            AppError::Database(e)
        })?;

        let query = format!(
            "SELECT {} FROM organization_settings WHERE organization_id = $1",
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, OrganizationSettings>(&query)
            .bind(org_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load settings for {}: {:?}", org_id, e);
                AppError::Database(e)
            })?;

        Ok(settings.into())
    }

    pub async fn update_settings(
        &self,
        org_id: Uuid,
        dto: UpdateSettingsDto,
    ) -> Result<OrganizationSettingsDto> {
        // Ensures the row exists before updating it
        self.settings(org_id).await?;

        let query = format!(
            r#"
            UPDATE organization_settings SET
                currency = COALESCE($2, currency),
                invoice_prefix = COALESCE($3, invoice_prefix),
                default_tax_percent = COALESCE($4, default_tax_percent),
                payment_terms_days = COALESCE($5, payment_terms_days),
                updated_at = NOW()
            WHERE organization_id = $1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, OrganizationSettings>(&query)
            .bind(org_id)
            .bind(dto.currency)
            .bind(dto.invoice_prefix)
            .bind(dto.default_tax_percent)
            .bind(dto.payment_terms_days)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update settings for {}: {:?}", org_id, e);
                AppError::Database(e)
            })?;

        tracing::info!("Settings of organization {} updated", org_id);
        Ok(settings.into())
    }

    /// Find organizations to join by name or code
    pub async fn search(
        &self,
        params: &OrganizationSearchParams,
    ) -> Result<Vec<OrganizationSummaryDto>> {
        let Some(pattern) = search_pattern(Some(&params.q)) else {
            return Ok(vec![]);
        };

        let query = format!(
            r#"
            SELECT {} FROM organizations
            WHERE name ILIKE $1 OR code ILIKE $1
            ORDER BY name
            LIMIT $2
            "#,
            ORGANIZATION_COLUMNS
        );
        let organizations = sqlx::query_as::<_, Organization>(&query)
            .bind(pattern)
            .bind(params.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search organizations: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(organizations.into_iter().map(Into::into).collect())
    }

    async fn find_join_request(&self, id: Uuid) -> Result<JoinRequest> {
        let query = format!(
            "SELECT {} FROM {} WHERE jr.id = $1",
            JOIN_REQUEST_COLUMNS, JOIN_REQUEST_FROM
        );
        sqlx::query_as::<_, JoinRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch join request {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Join request not found".to_string()))
    }

    /// Ask to join an organization; its admins are notified
    pub async fn request_to_join(
        &self,
        caller: &AuthenticatedUser,
        org_id: Uuid,
        dto: CreateJoinRequestDto,
    ) -> Result<JoinRequestResponseDto> {
        let current = self.users.find_by_id(caller.user_id).await?;
        if current.organization_id.is_some() {
            return Err(AppError::BadRequest(
                "You already belong to an organization".to_string(),
            ));
        }
        let organization = self.find(org_id).await?;

        let mut tx = self.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO join_requests (organization_id, user_id, message)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(org_id)
        .bind(caller.user_id)
        .bind(dto.message.as_deref().map(str::trim))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create join request: {:?}", e);
            AppError::from_db(e, "You already have a pending request for this organization")
        })?;

        let admins: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM users WHERE organization_id = $1 AND role = 'admin' AND is_active",
        )
        .bind(org_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load admins of {}: {:?}", org_id, e);
            AppError::Database(e)
        })?;

        for admin in admins {
            notify(
                &mut *tx,
                &NewNotification {
                    user_id: admin,
                    organization_id: Some(org_id),
                    kind: NotificationKind::Organization,
                    title: "New join request".to_string(),
                    message: format!("{} asked to join {}", current.name, organization.name),
                    link: Some("/settings/team".to_string()),
                },
            )
            .await?;
        }

        Self::commit(tx).await?;

        tracing::info!("User {} requested to join {}", caller.user_id, org_id);
        Ok(self.find_join_request(id).await?.into())
    }

    pub async fn list_join_requests(
        &self,
        org_id: Uuid,
        params: &JoinRequestQueryParams,
    ) -> Result<(Vec<JoinRequestResponseDto>, i64)> {
        let filter = r#"
            WHERE jr.organization_id = $1
              AND ($2::join_request_status IS NULL OR jr.status = $2)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM join_requests jr {}", filter))
                .bind(org_id)
                .bind(params.status)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count join requests: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {} FROM {} {} ORDER BY jr.created_at DESC LIMIT $3 OFFSET $4",
            JOIN_REQUEST_COLUMNS, JOIN_REQUEST_FROM, filter
        );
        let requests = sqlx::query_as::<_, JoinRequest>(&query)
            .bind(org_id)
            .bind(params.status)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list join requests: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((requests.into_iter().map(Into::into).collect(), total))
    }

    /// The caller's own requests, newest first
    pub async fn my_join_requests(
        &self,
        caller: &AuthenticatedUser,
    ) -> Result<Vec<JoinRequestResponseDto>> {
        let query = format!(
            "SELECT {} FROM {} WHERE jr.user_id = $1 ORDER BY jr.created_at DESC",
            JOIN_REQUEST_COLUMNS, JOIN_REQUEST_FROM
        );
        let requests = sqlx::query_as::<_, JoinRequest>(&query)
            .bind(caller.user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list own join requests: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(requests.into_iter().map(Into::into).collect())
    }

    /// Lock a pending request of this organization for review
    async fn lock_pending(
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Uuid> {
        let row: Option<(Uuid, JoinRequestStatus)> = sqlx::query_as(
            r#"
            SELECT user_id, status FROM join_requests
            WHERE id = $1 AND organization_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock join request {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        let (user_id, status) =
            row.ok_or_else(|| AppError::NotFound("Join request not found".to_string()))?;
        if status != JoinRequestStatus::Pending {
            return Err(AppError::BadRequest(
                "Join request has already been reviewed".to_string(),
            ));
        }
        Ok(user_id)
    }

    async fn review(
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
        reviewer: Uuid,
        status: JoinRequestStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE join_requests
            SET status = $2, reviewed_by = $3, reviewed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to review join request {}: {:?}", id, e);
            AppError::Database(e)
        })?;
        Ok(())
    }

    /// Attach the applicant to the organization and notify them
    pub async fn approve(
        &self,
        admin: &AuthenticatedUser,
        org_id: Uuid,
        id: Uuid,
        dto: ApproveJoinRequestDto,
    ) -> Result<JoinRequestResponseDto> {
        let organization = self.find(org_id).await?;
        let mut tx = self.begin().await?;
        let user_id = Self::lock_pending(&mut tx, org_id, id).await?;

        let query = format!(
            r#"
            UPDATE users SET
                organization_id = $2,
                role = COALESCE($3, role),
                updated_at = NOW()
            WHERE id = $1 AND organization_id IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(org_id)
            .bind(dto.role)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to attach user {} to {}: {:?}", user_id, org_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| {
                AppError::Conflict("User has already joined another organization".to_string())
            })?;

        Self::review(&mut tx, id, admin.user_id, JoinRequestStatus::Approved).await?;

        sqlx::query(
            r#"
            UPDATE join_requests SET status = 'denied', updated_at = NOW()
            WHERE user_id = $1 AND status = 'pending' AND id <> $2
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to close other join requests: {:?}", e);
            AppError::Database(e)
        })?;

        notify(
            &mut *tx,
            &NewNotification {
                user_id,
                organization_id: Some(org_id),
                kind: NotificationKind::Organization,
                title: "Join request approved".to_string(),
                message: format!(
                    "You are now a member of {} as {}. Sign in again to continue.",
                    organization.name, user.role
                ),
                link: None,
            },
        )
        .await?;

        Self::commit(tx).await?;

        tracing::info!(
            "Join request {} approved by {}: user {} joined {} as {}",
            id,
            admin.user_id,
            user_id,
            org_id,
            user.role
        );
        Ok(self.find_join_request(id).await?.into())
    }

    pub async fn deny(
        &self,
        admin: &AuthenticatedUser,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<JoinRequestResponseDto> {
        let organization = self.find(org_id).await?;
        let mut tx = self.begin().await?;
        let user_id = Self::lock_pending(&mut tx, org_id, id).await?;

        Self::review(&mut tx, id, admin.user_id, JoinRequestStatus::Denied).await?;

        notify(
            &mut *tx,
            &NewNotification {
                user_id,
                organization_id: None,
                kind: NotificationKind::Organization,
                title: "Join request declined".to_string(),
                message: format!("Your request to join {} was declined", organization.name),
                link: None,
            },
        )
        .await?;

        Self::commit(tx).await?;

        tracing::info!("Join request {} denied by {}", id, admin.user_id);
        Ok(self.find_join_request(id).await?.into())
    }

    pub async fn members(
        &self,
        caller: &AuthenticatedUser,
        params: &UserQueryParams,
    ) -> Result<(Vec<UserResponseDto>, i64)> {
        self.users.list(caller, params).await
    }

    /// Member of the organization that an admin may modify
    async fn managed_member(
        &self,
        admin: &AuthenticatedUser,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<User> {
        if user_id == admin.user_id {
            return Err(AppError::BadRequest(
                "You cannot change your own membership".to_string(),
            ));
        }

        let member = self.users.find_by_id(user_id).await?;
        if member.organization_id != Some(org_id) {
            return Err(AppError::NotFound("Member not found".to_string()));
        }

        let organization = self.find(org_id).await?;
        if organization.owner_id == member.id {
            return Err(AppError::Forbidden(
                "The organization owner cannot be changed".to_string(),
            ));
        }
        Ok(member)
    }

    pub async fn change_role(
        &self,
        admin: &AuthenticatedUser,
        org_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<UserResponseDto> {
        self.managed_member(admin, org_id, user_id).await?;

        let query = format!(
            r#"
            UPDATE users SET role = $3, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(org_id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to change role of {}: {:?}", user_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        tracing::info!("User {} is now {} in {}", user_id, role, org_id);
        Ok(user.into())
    }

    /// Detach a member; their records stay with the organization
    pub async fn remove_member(
        &self,
        admin: &AuthenticatedUser,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<()> {
        self.managed_member(admin, org_id, user_id).await?;

        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET organization_id = NULL, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove member {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        sqlx::query("UPDATE staff SET user_id = NULL, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to unlink staff profile of {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;

        Self::commit(tx).await?;

        tracing::info!("User {} removed from {} by {}", user_id, org_id, admin.user_id);
        Ok(())
    }
}
