use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::appointments::dtos::{
    AppointmentQueryParams, AppointmentResponseDto, CreateAppointmentDto, UpdateAppointmentDto,
};
use crate::features::appointments::models::{
    end_time, find_clash, Appointment, AppointmentStatus, BookedSlot, APPOINTMENT_COLUMNS,
    MAX_APPOINTMENT_MINUTES,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::models::{NewNotification, NotificationKind};
use crate::features::notifications::notify;
use crate::features::patients::patient_clinic;
use crate::features::staff::find_dentist;
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

/// Service for appointment booking and status tracking
pub struct AppointmentService {
    pool: PgPool,
}

impl AppointmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reject a slot that collides with another live appointment of the dentist.
    ///
    /// Locks the dentist's staff row so concurrent bookings serialize.
    async fn ensure_slot_free(
        tx: &mut Transaction<'_, Postgres>,
        dentist_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        sqlx::query("SELECT id FROM staff WHERE id = $1 FOR UPDATE")
            .bind(dentist_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock dentist {}: {:?}", dentist_id, e);
                AppError::Database(e)
            })?;

        // Any slot that can reach the requested start began at most one
        // maximum duration earlier.
        let candidates = sqlx::query_as::<_, BookedSlot>(
            r#"
            SELECT id, start_time, duration_minutes FROM appointments
            WHERE dentist_id = $1
              AND status <> 'cancelled'
              AND ($4::uuid IS NULL OR id <> $4)
              AND start_time < $3
              AND start_time > $2 - make_interval(mins => $5)
            ORDER BY start_time
            "#,
        )
        .bind(dentist_id)
        .bind(start)
        .bind(end_time(start, duration_minutes))
        .bind(exclude)
        .bind(MAX_APPOINTMENT_MINUTES)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check dentist availability: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(slot) = find_clash(&candidates, start, duration_minutes) {
            tracing::debug!("Slot for dentist {} clashes with {}", dentist_id, slot.id);
            return Err(AppError::Conflict(
                "Dentist already has an appointment in this time slot".to_string(),
            ));
        }
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> Result<Appointment> {
        let query = format!(
            r#"
            SELECT {} FROM appointments
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            APPOINTMENT_COLUMNS
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch appointment {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &AppointmentQueryParams,
    ) -> Result<(Vec<AppointmentResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR appointment_type ILIKE $3 OR notes ILIKE $3)
              AND ($4::uuid IS NULL OR patient_id = $4)
              AND ($5::uuid IS NULL OR dentist_id = $5)
              AND ($6::appointment_status IS NULL OR status = $6)
              AND ($7::timestamptz IS NULL OR start_time >= $7)
              AND ($8::timestamptz IS NULL OR start_time < $8)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM appointments {}", filter))
                .bind(scope.organization_id)
                .bind(scope.clinic_id())
                .bind(&pattern)
                .bind(params.patient_id)
                .bind(params.dentist_id)
                .bind(params.status)
                .bind(params.from)
                .bind(params.to)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count appointments: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {} FROM appointments {} ORDER BY start_time {} LIMIT $9 OFFSET $10",
            APPOINTMENT_COLUMNS,
            filter,
            params.sort.as_sql()
        );
        let appointments = sqlx::query_as::<_, Appointment>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.patient_id)
            .bind(params.dentist_id)
            .bind(params.status)
            .bind(params.from)
            .bind(params.to)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list appointments: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((appointments.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<AppointmentResponseDto> {
        Ok(self.find(scope, id).await?.into())
    }

    /// Book an appointment and notify the dentist's linked account
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        scope: &TenantScope,
        dto: CreateAppointmentDto,
    ) -> Result<AppointmentResponseDto> {
        let clinic_id = patient_clinic(&self.pool, scope, dto.patient_id).await?;
        let dentist =
            find_dentist(&self.pool, scope.organization_id, clinic_id, dto.dentist_id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Self::ensure_slot_free(&mut tx, dentist.id, dto.start_time, dto.duration_minutes, None)
            .await?;

        let query = format!(
            r#"
            INSERT INTO appointments
                (organization_id, clinic_id, patient_id, dentist_id, start_time,
                 duration_minutes, appointment_type, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        );
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.patient_id)
            .bind(dentist.id)
            .bind(dto.start_time)
            .bind(dto.duration_minutes)
            .bind(dto.appointment_type.trim())
            .bind(dto.notes)
            .bind(user.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create appointment: {:?}", e);
                AppError::from_db(e, "Appointment already exists")
            })?;

        if let Some(dentist_user) = dentist.user_id {
            let notification = NewNotification {
                user_id: dentist_user,
                organization_id: Some(scope.organization_id),
                kind: NotificationKind::Appointment,
                title: "New appointment".to_string(),
                message: format!(
                    "{} booked for {}",
                    appointment.appointment_type,
                    appointment.start_time.format("%d %b %Y %H:%M UTC")
                ),
                link: Some(format!("/appointments/{}", appointment.id)),
            };
            notify(&mut *tx, &notification).await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit appointment: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Appointment {} booked with dentist {}",
            appointment.id,
            dentist.id
        );
        Ok(appointment.into())
    }

    /// Reschedule or edit details of a live appointment
    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdateAppointmentDto,
    ) -> Result<AppointmentResponseDto> {
        let existing = self.find(scope, id).await?;
        if existing.status.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "Cannot edit a {} appointment",
                existing.status
            )));
        }

        let dentist_id = match dto.dentist_id {
            Some(dentist_id) if dentist_id != existing.dentist_id => {
                find_dentist(
                    &self.pool,
                    scope.organization_id,
                    existing.clinic_id,
                    dentist_id,
                )
                .await?
                .id
            }
            _ => existing.dentist_id,
        };
        let start_time = dto.start_time.unwrap_or(existing.start_time);
        let duration_minutes = dto.duration_minutes.unwrap_or(existing.duration_minutes);

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let rescheduled = dentist_id != existing.dentist_id
            || start_time != existing.start_time
            || duration_minutes != existing.duration_minutes;
        if rescheduled {
            Self::ensure_slot_free(&mut tx, dentist_id, start_time, duration_minutes, Some(id))
                .await?;
        }

        let query = format!(
            r#"
            UPDATE appointments SET
                dentist_id = $2,
                start_time = $3,
                duration_minutes = $4,
                appointment_type = COALESCE($5, appointment_type),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        );
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(dentist_id)
            .bind(start_time)
            .bind(duration_minutes)
            .bind(dto.appointment_type.as_deref().map(str::trim))
            .bind(dto.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update appointment {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit appointment update: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(appointment.into())
    }

    pub async fn update_status(
        &self,
        scope: &TenantScope,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentResponseDto> {
        let existing = self.find(scope, id).await?;
        if !existing.status.can_transition_to(status) {
            return Err(AppError::BadRequest(format!(
                "Cannot change appointment status from {} to {}",
                existing.status, status
            )));
        }

        let query = format!(
            r#"
            UPDATE appointments SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        );
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(existing.status)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update appointment {} status: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| {
                AppError::Conflict("Appointment was modified concurrently".to_string())
            })?;

        tracing::info!(
            "Appointment {} moved from {} to {}",
            id,
            existing.status,
            status
        );
        Ok(appointment.into())
    }

    /// Soft delete: appointments are cancelled, never removed
    pub async fn cancel(&self, scope: &TenantScope, id: Uuid) -> Result<AppointmentResponseDto> {
        self.update_status(scope, id, AppointmentStatus::Cancelled)
            .await
    }
}
