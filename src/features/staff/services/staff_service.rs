use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::clinics::resolve_clinic;
use crate::features::staff::dtos::{
    CreateStaffDto, StaffQueryParams, StaffResponseDto, UpdateStaffDto,
};
use crate::features::staff::models::{Staff, StaffRole, STAFF_COLUMNS};
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

/// Active dentist working at `clinic_id`, or 400 when the id names anyone else
pub async fn find_dentist(
    pool: &PgPool,
    organization_id: Uuid,
    clinic_id: Uuid,
    dentist_id: Uuid,
) -> Result<Staff> {
    let query = format!(
        "SELECT {} FROM staff WHERE id = $1 AND organization_id = $2",
        STAFF_COLUMNS
    );
    let staff = sqlx::query_as::<_, Staff>(&query)
        .bind(dentist_id)
        .bind(organization_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up dentist {}: {:?}", dentist_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Dentist not found".to_string()))?;

    if staff.role != StaffRole::Dentist || !staff.is_active {
        return Err(AppError::BadRequest(
            "Selected staff member is not an active dentist".to_string(),
        ));
    }
    if staff.clinic_id != clinic_id {
        return Err(AppError::BadRequest(
            "Dentist does not work at this clinic".to_string(),
        ));
    }
    Ok(staff)
}

/// Service for staff records
pub struct StaffService {
    pool: PgPool,
}

impl StaffService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<()> {
        let is_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND organization_id = $2)",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to verify staff user {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        if !is_member {
            return Err(AppError::BadRequest(
                "Linked user is not a member of this organization".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &StaffQueryParams,
    ) -> Result<(Vec<StaffResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let is_active = params.is_active.unwrap_or(true);
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3 OR phone ILIKE $3)
              AND ($4::staff_role IS NULL OR role = $4)
              AND is_active = $5
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM staff {}", filter))
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.role)
            .bind(is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count staff: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM staff {} ORDER BY name ASC LIMIT $6 OFFSET $7",
            STAFF_COLUMNS, filter
        );
        let staff = sqlx::query_as::<_, Staff>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.role)
            .bind(is_active)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list staff: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((staff.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<StaffResponseDto> {
        let query = format!(
            r#"
            SELECT {} FROM staff
            WHERE id = $1 AND organization_id = $2 AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            STAFF_COLUMNS
        );
        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get staff {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))
    }

    pub async fn create(&self, scope: &TenantScope, dto: CreateStaffDto) -> Result<StaffResponseDto> {
        let clinic_id = resolve_clinic(&self.pool, scope, dto.clinic_id).await?;
        if let Some(user_id) = dto.user_id {
            self.ensure_member(scope.organization_id, user_id).await?;
        }

        let query = format!(
            r#"
            INSERT INTO staff (
                organization_id, clinic_id, user_id, name, email, phone, role,
                specialization, joined_on
            )
            VALUES ($1, $2, $3, $4, LOWER($5), $6, $7, $8, $9)
            RETURNING {}
            "#,
            STAFF_COLUMNS
        );

        let staff = sqlx::query_as::<_, Staff>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.user_id)
            .bind(dto.name.trim())
            .bind(dto.email)
            .bind(dto.phone)
            .bind(dto.role)
            .bind(dto.specialization)
            .bind(dto.joined_on)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create staff: {:?}", e);
                AppError::from_db(e, "Staff member already exists")
            })?;

        tracing::info!("Added staff {} ({:?}) to clinic {}", staff.id, staff.role, clinic_id);
        Ok(staff.into())
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdateStaffDto,
    ) -> Result<StaffResponseDto> {
        if let Some(user_id) = dto.user_id {
            self.ensure_member(scope.organization_id, user_id).await?;
        }

        let query = format!(
            r#"
            UPDATE staff SET
                name = COALESCE($4, name),
                email = COALESCE(LOWER($5), email),
                phone = COALESCE($6, phone),
                role = COALESCE($7, role),
                specialization = COALESCE($8, specialization),
                joined_on = COALESCE($9, joined_on),
                user_id = COALESCE($10, user_id),
                is_active = COALESCE($11, is_active),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND ($3::uuid IS NULL OR clinic_id = $3)
            RETURNING {}
            "#,
            STAFF_COLUMNS
        );

        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.email)
            .bind(dto.phone)
            .bind(dto.role)
            .bind(dto.specialization)
            .bind(dto.joined_on)
            .bind(dto.user_id)
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update staff {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))
    }

    pub async fn deactivate(&self, scope: &TenantScope, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE staff SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
        )
        .bind(id)
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to deactivate staff {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Staff member not found".to_string()));
        }
        tracing::info!("Deactivated staff {}", id);
        Ok(())
    }
}
