use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::treatments::dtos::{
    CreateTreatmentDto, TreatmentQueryParams, TreatmentResponseDto, UpdateTreatmentDto,
};
use crate::features::treatments::models::{Treatment, TREATMENT_COLUMNS};
use crate::shared::types::{search_pattern, Paginated};

const DUPLICATE_CODE: &str = "A treatment with this code already exists";

/// Service for the organization's treatment catalog
pub struct TreatmentService {
    pool: PgPool,
}

impl TreatmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        org_id: Uuid,
        params: &TreatmentQueryParams,
    ) -> Result<(Vec<TreatmentResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let is_active = params.is_active.unwrap_or(true);
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::text IS NULL OR name ILIKE $2 OR code ILIKE $2)
              AND ($3::text IS NULL OR category = $3)
              AND is_active = $4
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM treatments {}", filter))
                .bind(org_id)
                .bind(&pattern)
                .bind(&params.category)
                .bind(is_active)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count treatments: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {} FROM treatments {} ORDER BY name ASC LIMIT $5 OFFSET $6",
            TREATMENT_COLUMNS, filter
        );
        let treatments = sqlx::query_as::<_, Treatment>(&query)
            .bind(org_id)
            .bind(&pattern)
            .bind(&params.category)
            .bind(is_active)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list treatments: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((treatments.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, org_id: Uuid, id: Uuid) -> Result<TreatmentResponseDto> {
        let query = format!(
            "SELECT {} FROM treatments WHERE id = $1 AND organization_id = $2",
            TREATMENT_COLUMNS
        );
        sqlx::query_as::<_, Treatment>(&query)
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch treatment {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Treatment not found".to_string()))
    }

    pub async fn create(
        &self,
        org_id: Uuid,
        dto: CreateTreatmentDto,
    ) -> Result<TreatmentResponseDto> {
        let query = format!(
            r#"
            INSERT INTO treatments
                (organization_id, name, code, category, description, cost, duration_minutes)
            VALUES ($1, $2, UPPER($3), $4, $5, $6, $7)
            RETURNING {}
            "#,
            TREATMENT_COLUMNS
        );

        let treatment = sqlx::query_as::<_, Treatment>(&query)
            .bind(org_id)
            .bind(dto.name.trim())
            .bind(dto.code.trim())
            .bind(dto.category)
            .bind(dto.description)
            .bind(dto.cost)
            .bind(dto.duration_minutes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create treatment: {:?}", e);
                AppError::from_db(e, DUPLICATE_CODE)
            })?;

        tracing::info!("Treatment {} added to catalog of {}", treatment.code, org_id);
        Ok(treatment.into())
    }

    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        dto: UpdateTreatmentDto,
    ) -> Result<TreatmentResponseDto> {
        let query = format!(
            r#"
            UPDATE treatments SET
                name = COALESCE($3, name),
                code = COALESCE(UPPER($4), code),
                category = COALESCE($5, category),
                description = COALESCE($6, description),
                cost = COALESCE($7, cost),
                duration_minutes = COALESCE($8, duration_minutes),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            TREATMENT_COLUMNS
        );

        sqlx::query_as::<_, Treatment>(&query)
            .bind(id)
            .bind(org_id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.code.as_deref().map(str::trim))
            .bind(dto.category)
            .bind(dto.description)
            .bind(dto.cost)
            .bind(dto.duration_minutes)
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update treatment {}: {:?}", id, e);
                AppError::from_db(e, DUPLICATE_CODE)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Treatment not found".to_string()))
    }

    /// Soft delete; existing plans and invoices keep referencing the row
    pub async fn deactivate(&self, org_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE treatments SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to deactivate treatment {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Treatment not found".to_string()));
        }
        Ok(())
    }
}
