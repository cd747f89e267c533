use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::patients::patient_clinic;
use crate::features::prescriptions::dtos::{
    CreatePrescriptionDto, PrescriptionQueryParams, PrescriptionResponseDto,
    UpdatePrescriptionDto,
};
use crate::features::prescriptions::models::{Prescription, PRESCRIPTION_COLUMNS};
use crate::features::staff::find_dentist;
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

/// Service for prescriptions issued by dentists
pub struct PrescriptionService {
    pool: PgPool,
}

impl PrescriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &PrescriptionQueryParams,
    ) -> Result<(Vec<PrescriptionResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR diagnosis ILIKE $3)
              AND ($4::uuid IS NULL OR patient_id = $4)
              AND ($5::uuid IS NULL OR dentist_id = $5)
              AND ($6 OR is_active)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM prescriptions {}", filter))
                .bind(scope.organization_id)
                .bind(scope.clinic_id())
                .bind(&pattern)
                .bind(params.patient_id)
                .bind(params.dentist_id)
                .bind(params.include_inactive)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count prescriptions: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {} FROM prescriptions {} ORDER BY issued_at DESC LIMIT $7 OFFSET $8",
            PRESCRIPTION_COLUMNS, filter
        );
        let prescriptions = sqlx::query_as::<_, Prescription>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.patient_id)
            .bind(params.dentist_id)
            .bind(params.include_inactive)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list prescriptions: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((prescriptions.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<PrescriptionResponseDto> {
        let query = format!(
            r#"
            SELECT {} FROM prescriptions
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            PRESCRIPTION_COLUMNS
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch prescription {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Prescription not found".to_string()))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        scope: &TenantScope,
        dto: CreatePrescriptionDto,
    ) -> Result<PrescriptionResponseDto> {
        let clinic_id = patient_clinic(&self.pool, scope, dto.patient_id).await?;
        let dentist =
            find_dentist(&self.pool, scope.organization_id, clinic_id, dto.dentist_id).await?;

        let query = format!(
            r#"
            INSERT INTO prescriptions
                (organization_id, clinic_id, patient_id, dentist_id, diagnosis,
                 medications, notes, issued_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()), $9)
            RETURNING {}
            "#,
            PRESCRIPTION_COLUMNS
        );
        let prescription = sqlx::query_as::<_, Prescription>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.patient_id)
            .bind(dentist.id)
            .bind(dto.diagnosis.trim())
            .bind(Json(dto.medications))
            .bind(dto.notes)
            .bind(dto.issued_at)
            .bind(user.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create prescription: {:?}", e);
                AppError::from_db(e, "Prescription already exists")
            })?;

        tracing::info!(
            "Prescription {} issued for patient {}",
            prescription.id,
            prescription.patient_id
        );
        Ok(prescription.into())
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdatePrescriptionDto,
    ) -> Result<PrescriptionResponseDto> {
        let query = format!(
            r#"
            UPDATE prescriptions SET
                diagnosis = COALESCE($4, diagnosis),
                medications = COALESCE($5, medications),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
              AND is_active
            RETURNING {}
            "#,
            PRESCRIPTION_COLUMNS
        );

        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(dto.diagnosis.as_deref().map(str::trim))
            .bind(dto.medications.map(Json))
            .bind(dto.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update prescription {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Prescription not found".to_string()))
    }

    /// Soft delete: the prescription is voided and kept on record
    pub async fn void(&self, scope: &TenantScope, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE prescriptions SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
        )
        .bind(id)
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to void prescription {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Prescription not found".to_string()));
        }
        Ok(())
    }
}
