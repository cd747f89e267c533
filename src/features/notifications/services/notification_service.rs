use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::{
    BroadcastNotificationDto, NotificationQueryParams, NotificationResponseDto,
};
use crate::features::notifications::models::{
    NewNotification, Notification, NOTIFICATION_COLUMNS,
};
use crate::shared::types::Paginated;

/// Insert one notification; runs on a pool or inside a caller's transaction
pub async fn notify<'e, E>(executor: E, notification: &NewNotification) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO notifications (user_id, organization_id, kind, title, message, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.organization_id)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.link)
    .execute(executor)
    .await
    .map_err(|e| {
        tracing::error!(
            "Failed to notify user {}: {:?}",
            notification.user_id,
            e
        );
        AppError::Database(e)
    })?;

    Ok(())
}

/// Service for the caller's notification inbox
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: &NotificationQueryParams,
    ) -> Result<(Vec<NotificationResponseDto>, i64)> {
        let filter = r#"
            WHERE user_id = $1
              AND (NOT $2 OR is_read = FALSE)
              AND ($3::notification_kind IS NULL OR kind = $3)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM notifications {}", filter))
                .bind(user.user_id)
                .bind(params.unread_only)
                .bind(params.kind)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count notifications: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {} FROM notifications {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            NOTIFICATION_COLUMNS, filter
        );
        let notifications = sqlx::query_as::<_, Notification>(&query)
            .bind(user.user_id)
            .bind(params.unread_only)
            .bind(params.kind)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list notifications: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((notifications.into_iter().map(Into::into).collect(), total))
    }

    pub async fn unread_count(&self, user: &AuthenticatedUser) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count unread notifications: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Mark one notification read; already-read notifications keep their read_at
    pub async fn mark_read(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<NotificationResponseDto> {
        let query = format!(
            r#"
            UPDATE notifications SET
                is_read = TRUE,
                read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark notification {} read: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    /// Mark every unread notification read. Repeating the call is a no-op.
    pub async fn mark_all_read(&self, user: &AuthenticatedUser) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE, read_at = NOW()
            WHERE user_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(user.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notifications read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete notification {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    /// Deliver a notification to every active member (optionally by role)
    pub async fn broadcast(&self, org_id: Uuid, dto: BroadcastNotificationDto) -> Result<u64> {
        let roles: Vec<String> = dto.roles.iter().map(ToString::to_string).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, organization_id, kind, title, message, link)
            SELECT id, $1, $2, $3, $4, $5
            FROM users
            WHERE organization_id = $1
              AND is_active
              AND (cardinality($6::text[]) = 0 OR role::text = ANY($6))
            "#,
        )
        .bind(org_id)
        .bind(dto.kind)
        .bind(dto.title.trim())
        .bind(dto.message.trim())
        .bind(dto.link)
        .bind(roles)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to broadcast notification: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Broadcast notification to {} members of {}",
            result.rows_affected(),
            org_id
        );
        Ok(result.rows_affected())
    }
}
