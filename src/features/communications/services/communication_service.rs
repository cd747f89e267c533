use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::communications::dtos::{
    CommunicationQueryParams, CommunicationResponseDto, CreateCommunicationDto,
    UpdateCommunicationDto,
};
use crate::features::communications::models::{
    requires_subject, Communication, CommunicationChannel, CommunicationStatus,
    COMMUNICATION_COLUMNS,
};
use crate::features::patients::patient_clinic;
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

fn check_subject(channel: CommunicationChannel, subject: Option<&str>) -> Result<()> {
    let blank = subject.map(|s| s.trim().is_empty()).unwrap_or(true);
    if requires_subject(channel) && blank {
        return Err(AppError::BadRequest(
            "Email messages need a subject".to_string(),
        ));
    }
    Ok(())
}

/// Service for the patient communication log
pub struct CommunicationService {
    pool: PgPool,
}

impl CommunicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> Result<Communication> {
        let query = format!(
            r#"
            SELECT {} FROM communications
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            COMMUNICATION_COLUMNS
        );
        sqlx::query_as::<_, Communication>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch communication {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Communication not found".to_string()))
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &CommunicationQueryParams,
    ) -> Result<(Vec<CommunicationResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR subject ILIKE $3 OR message ILIKE $3)
              AND ($4::uuid IS NULL OR patient_id = $4)
              AND ($5::communication_channel IS NULL OR channel = $5)
              AND ($6::communication_status IS NULL OR status = $6)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM communications {}", filter))
                .bind(scope.organization_id)
                .bind(scope.clinic_id())
                .bind(&pattern)
                .bind(params.patient_id)
                .bind(params.channel)
                .bind(params.status)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count communications: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            r#"
            SELECT {} FROM communications {}
            ORDER BY COALESCE(scheduled_at, created_at) DESC
            LIMIT $7 OFFSET $8
            "#,
            COMMUNICATION_COLUMNS, filter
        );
        let communications = sqlx::query_as::<_, Communication>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.patient_id)
            .bind(params.channel)
            .bind(params.status)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list communications: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((communications.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<CommunicationResponseDto> {
        Ok(self.find(scope, id).await?.into())
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        scope: &TenantScope,
        dto: CreateCommunicationDto,
    ) -> Result<CommunicationResponseDto> {
        check_subject(dto.channel, dto.subject.as_deref())?;
        let status = CommunicationStatus::for_schedule(dto.scheduled_at, Utc::now())
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let clinic_id = patient_clinic(&self.pool, scope, dto.patient_id).await?;

        let query = format!(
            r#"
            INSERT INTO communications
                (organization_id, clinic_id, patient_id, channel, subject, message,
                 status, scheduled_at, sent_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            COMMUNICATION_COLUMNS
        );
        let communication = sqlx::query_as::<_, Communication>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.patient_id)
            .bind(dto.channel)
            .bind(dto.subject.as_deref().map(str::trim))
            .bind(dto.message.trim())
            .bind(status)
            .bind(dto.scheduled_at)
            .bind(user.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to log communication: {:?}", e);
                AppError::from_db(e, "Communication already exists")
            })?;

        tracing::info!(
            "Communication {} logged for patient {} via {:?}",
            communication.id,
            communication.patient_id,
            communication.channel
        );
        Ok(communication.into())
    }

    /// Edit a message that has not gone out yet
    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdateCommunicationDto,
    ) -> Result<CommunicationResponseDto> {
        let existing = self.find(scope, id).await?;
        if existing.status == CommunicationStatus::Sent {
            return Err(AppError::BadRequest(
                "Sent messages cannot be edited".to_string(),
            ));
        }

        let channel = dto.channel.unwrap_or(existing.channel);
        let subject = dto.subject.as_deref().or(existing.subject.as_deref());
        check_subject(channel, subject)?;

        if let Some(at) = dto.scheduled_at {
            CommunicationStatus::for_schedule(Some(at), Utc::now())
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
        }

        let query = format!(
            r#"
            UPDATE communications SET
                channel = $2,
                subject = COALESCE($3, subject),
                message = COALESCE($4, message),
                scheduled_at = COALESCE($5, scheduled_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMUNICATION_COLUMNS
        );
        let communication = sqlx::query_as::<_, Communication>(&query)
            .bind(id)
            .bind(channel)
            .bind(dto.subject.as_deref().map(str::trim))
            .bind(dto.message.as_deref().map(str::trim))
            .bind(dto.scheduled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update communication {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(communication.into())
    }

    /// Withdraw a scheduled message; the sent log is kept
    pub async fn delete(&self, scope: &TenantScope, id: Uuid) -> Result<()> {
        let existing = self.find(scope, id).await?;
        if existing.status == CommunicationStatus::Sent {
            return Err(AppError::BadRequest(
                "Sent messages cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM communications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete communication {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tracing::info!("Scheduled communication {} withdrawn", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_subject_required() {
        assert!(check_subject(CommunicationChannel::Email, None).is_err());
        assert!(check_subject(CommunicationChannel::Email, Some("  ")).is_err());
        assert!(check_subject(CommunicationChannel::Email, Some("Your invoice")).is_ok());
        assert!(check_subject(CommunicationChannel::Phone, None).is_ok());
    }
}
