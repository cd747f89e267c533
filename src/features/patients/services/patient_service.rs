use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::clinics::resolve_clinic;
use crate::features::patients::dtos::{
    CreatePatientDto, PatientQueryParams, PatientResponseDto, UpdatePatientDto,
};
use crate::features::patients::models::{Patient, PATIENT_COLUMNS};
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

/// Clinic of a patient visible in `scope`, or 404.
///
/// Records attached to a patient (appointments, invoices, documents) inherit
/// the patient's clinic.
pub async fn patient_clinic(pool: &PgPool, scope: &TenantScope, patient_id: Uuid) -> Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT clinic_id FROM patients
        WHERE id = $1 AND organization_id = $2
          AND ($3::uuid IS NULL OR clinic_id = $3)
        "#,
    )
    .bind(patient_id)
    .bind(scope.organization_id)
    .bind(scope.clinic_id())
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to look up patient {}: {:?}", patient_id, e);
        AppError::Database(e)
    })?
    .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
}

/// Service for patient records
pub struct PatientService {
    pool: PgPool,
}

impl PatientService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &PatientQueryParams,
    ) -> Result<(Vec<PatientResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let is_active = params.is_active.unwrap_or(true);
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR phone ILIKE $3 OR email ILIKE $3)
              AND ($4::patient_gender IS NULL OR gender = $4)
              AND is_active = $5
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM patients {}", filter))
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.gender)
            .bind(is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count patients: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM patients {} ORDER BY {} {} LIMIT $6 OFFSET $7",
            PATIENT_COLUMNS,
            filter,
            params.sort_by.as_sql(),
            params.sort.as_sql()
        );

        let patients = sqlx::query_as::<_, Patient>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.gender)
            .bind(is_active)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list patients: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((patients.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<PatientResponseDto> {
        let query = format!(
            r#"
            SELECT {} FROM patients
            WHERE id = $1 AND organization_id = $2 AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            PATIENT_COLUMNS
        );

        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get patient {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        dto: CreatePatientDto,
    ) -> Result<PatientResponseDto> {
        let clinic_id = resolve_clinic(&self.pool, scope, dto.clinic_id).await?;
        let (contact_name, contact_phone) = match dto.emergency_contact {
            Some(c) => (Some(c.name), Some(c.phone)),
            None => (None, None),
        };

        let query = format!(
            r#"
            INSERT INTO patients (
                organization_id, clinic_id, name, email, phone, gender, date_of_birth,
                blood_group, address, medical_history, allergies,
                emergency_contact_name, emergency_contact_phone
            )
            VALUES ($1, $2, $3, LOWER($4), $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            PATIENT_COLUMNS
        );

        let patient = sqlx::query_as::<_, Patient>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.name.trim())
            .bind(dto.email)
            .bind(dto.phone)
            .bind(dto.gender)
            .bind(dto.date_of_birth)
            .bind(dto.blood_group)
            .bind(dto.address.map(Json))
            .bind(dto.medical_history)
            .bind(dto.allergies)
            .bind(contact_name)
            .bind(contact_phone)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create patient: {:?}", e);
                AppError::from_db(e, "Patient already exists")
            })?;

        tracing::info!("Registered patient {} at clinic {}", patient.id, clinic_id);
        Ok(patient.into())
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdatePatientDto,
    ) -> Result<PatientResponseDto> {
        let (contact_name, contact_phone) = match dto.emergency_contact {
            Some(c) => (Some(c.name), Some(c.phone)),
            None => (None, None),
        };

        let query = format!(
            r#"
            UPDATE patients SET
                name = COALESCE($4, name),
                email = COALESCE(LOWER($5), email),
                phone = COALESCE($6, phone),
                gender = COALESCE($7, gender),
                date_of_birth = COALESCE($8, date_of_birth),
                blood_group = COALESCE($9, blood_group),
                address = COALESCE($10, address),
                medical_history = COALESCE($11, medical_history),
                allergies = COALESCE($12, allergies),
                emergency_contact_name = COALESCE($13, emergency_contact_name),
                emergency_contact_phone = COALESCE($14, emergency_contact_phone),
                is_active = COALESCE($15, is_active),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND ($3::uuid IS NULL OR clinic_id = $3)
            RETURNING {}
            "#,
            PATIENT_COLUMNS
        );

        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.email)
            .bind(dto.phone)
            .bind(dto.gender)
            .bind(dto.date_of_birth)
            .bind(dto.blood_group)
            .bind(dto.address.map(Json))
            .bind(dto.medical_history)
            .bind(dto.allergies)
            .bind(contact_name)
            .bind(contact_phone)
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update patient {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
    }

    /// Deactivate a patient; history stays attached
    pub async fn deactivate(&self, scope: &TenantScope, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE patients SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
        )
        .bind(id)
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to deactivate patient {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Patient not found".to_string()));
        }
        tracing::info!("Deactivated patient {}", id);
        Ok(())
    }
}
