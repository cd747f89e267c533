use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::clinics::dtos::{
    ClinicQueryParams, ClinicResponseDto, CreateClinicDto, UpdateClinicDto,
};
use crate::features::clinics::models::{Clinic, CLINIC_COLUMNS};
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

/// Pick and verify the clinic a new record belongs to.
///
/// The explicit id wins over the request scope. Fails with 400 when neither
/// names a clinic, and with 404 when the clinic is not an active clinic of
/// the organization.
pub async fn resolve_clinic(
    pool: &PgPool,
    scope: &TenantScope,
    explicit: Option<Uuid>,
) -> Result<Uuid> {
    let clinic_id = scope.clinic_for_create(explicit).ok_or_else(|| {
        AppError::BadRequest("clinicId is required when viewing all clinics".to_string())
    })?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM clinics WHERE id = $1 AND organization_id = $2 AND is_active)",
    )
    .bind(clinic_id)
    .bind(scope.organization_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to verify clinic {}: {:?}", clinic_id, e);
        AppError::Database(e)
    })?;

    if !exists {
        return Err(AppError::NotFound("Clinic not found".to_string()));
    }
    Ok(clinic_id)
}

/// Service for clinic operations
pub struct ClinicService {
    pool: PgPool,
}

impl ClinicService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List clinics of the organization (the clinic scope itself is not applied)
    pub async fn list(
        &self,
        org_id: Uuid,
        params: &ClinicQueryParams,
    ) -> Result<(Vec<ClinicResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::text IS NULL OR name ILIKE $2)
              AND ($3 OR is_active)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM clinics {}", filter))
            .bind(org_id)
            .bind(&pattern)
            .bind(params.include_inactive)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count clinics: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM clinics {} ORDER BY name ASC LIMIT $4 OFFSET $5",
            CLINIC_COLUMNS, filter
        );
        let clinics = sqlx::query_as::<_, Clinic>(&query)
            .bind(org_id)
            .bind(&pattern)
            .bind(params.include_inactive)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list clinics: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((clinics.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, org_id: Uuid, id: Uuid) -> Result<ClinicResponseDto> {
        let query = format!(
            "SELECT {} FROM clinics WHERE id = $1 AND organization_id = $2",
            CLINIC_COLUMNS
        );
        sqlx::query_as::<_, Clinic>(&query)
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get clinic {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Clinic not found".to_string()))
    }

    pub async fn create(&self, org_id: Uuid, dto: CreateClinicDto) -> Result<ClinicResponseDto> {
        let query = format!(
            r#"
            INSERT INTO clinics (organization_id, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CLINIC_COLUMNS
        );

        let clinic = sqlx::query_as::<_, Clinic>(&query)
            .bind(org_id)
            .bind(dto.name.trim())
            .bind(dto.phone)
            .bind(dto.email)
            .bind(dto.address.map(Json))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create clinic: {:?}", e);
                AppError::from_db(e, "A clinic with this name already exists")
            })?;

        tracing::info!("Created clinic {} in organization {}", clinic.id, org_id);
        Ok(clinic.into())
    }

    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        dto: UpdateClinicDto,
    ) -> Result<ClinicResponseDto> {
        let query = format!(
            r#"
            UPDATE clinics SET
                name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                address = COALESCE($6, address),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            CLINIC_COLUMNS
        );

        sqlx::query_as::<_, Clinic>(&query)
            .bind(id)
            .bind(org_id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.phone)
            .bind(dto.email)
            .bind(dto.address.map(Json))
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update clinic {}: {:?}", id, e);
                AppError::from_db(e, "A clinic with this name already exists")
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Clinic not found".to_string()))
    }

    /// Deactivate a clinic; its records stay readable
    pub async fn deactivate(&self, org_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE clinics SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(org_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to deactivate clinic {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Clinic not found".to_string()));
        }
        tracing::info!("Deactivated clinic {}", id);
        Ok(())
    }
}
