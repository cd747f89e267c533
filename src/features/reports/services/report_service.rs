use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{
    AppointmentBreakdownDto, ReportRangeParams, ReportSummaryDto, RevenuePointDto,
    StatusCountDto, TopTreatmentDto, TopTreatmentsParams,
};
use crate::shared::scope::TenantScope;

/// Read-only aggregates over the caller's organization and clinic scope
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn range(params: &ReportRangeParams) -> Result<(NaiveDate, NaiveDate)> {
        params
            .resolve(Utc::now().date_naive())
            .map_err(AppError::BadRequest)
    }

    pub async fn summary(&self, scope: &TenantScope) -> Result<ReportSummaryDto> {
        sqlx::query_as::<_, ReportSummaryDto>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM patients
                  WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
                    AND is_active) AS total_patients,
                (SELECT COUNT(*) FROM patients
                  WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
                    AND created_at >= date_trunc('month', CURRENT_DATE)) AS new_patients_this_month,
                (SELECT COUNT(*) FROM appointments
                  WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
                    AND start_time::date = CURRENT_DATE
                    AND status <> 'cancelled') AS appointments_today,
                (SELECT COUNT(*) FROM appointments
                  WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
                    AND start_time > NOW()
                    AND status IN ('scheduled', 'confirmed')) AS upcoming_appointments,
                i.open_invoices,
                i.outstanding_amount,
                (SELECT COALESCE(SUM(p.amount), 0) FROM payments p
                  JOIN invoices inv ON inv.id = p.invoice_id
                  WHERE inv.organization_id = $1 AND ($2::uuid IS NULL OR inv.clinic_id = $2)
                    AND p.paid_at >= date_trunc('month', CURRENT_DATE)) AS revenue_this_month,
                (SELECT COUNT(*) FROM treatment_plans
                  WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
                    AND status IN ('accepted', 'in_progress')) AS active_treatment_plans
            FROM (
                SELECT
                    COUNT(*) FILTER (WHERE payment_status IN ('pending', 'partial', 'overdue')) AS open_invoices,
                    COALESCE(SUM(total_amount - amount_paid)
                        FILTER (WHERE payment_status IN ('pending', 'partial', 'overdue')), 0) AS outstanding_amount
                FROM invoices
                WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
            ) i
            "#,
        )
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to build report summary: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Invoiced and collected amounts per calendar month, gaps filled with zero
    pub async fn revenue(
        &self,
        scope: &TenantScope,
        params: &ReportRangeParams,
    ) -> Result<Vec<RevenuePointDto>> {
        let (from, to) = Self::range(params)?;

        sqlx::query_as::<_, RevenuePointDto>(
            r#"
            WITH months AS (
                SELECT generate_series(
                    date_trunc('month', $3::date),
                    date_trunc('month', $4::date),
                    interval '1 month'
                )::date AS month
            ),
            billed AS (
                SELECT date_trunc('month', issue_date)::date AS month,
                       COUNT(*) AS invoice_count,
                       SUM(total_amount) AS invoiced
                FROM invoices
                WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
                  AND payment_status <> 'cancelled'
                  AND issue_date BETWEEN $3 AND $4
                GROUP BY 1
            ),
            collected AS (
                SELECT date_trunc('month', p.paid_at)::date AS month,
                       SUM(p.amount) AS collected
                FROM payments p
                JOIN invoices i ON i.id = p.invoice_id
                WHERE i.organization_id = $1 AND ($2::uuid IS NULL OR i.clinic_id = $2)
                  AND p.paid_at::date BETWEEN $3 AND $4
                GROUP BY 1
            )
            SELECT to_char(m.month, 'YYYY-MM') AS month,
                   COALESCE(b.invoice_count, 0) AS invoice_count,
                   COALESCE(b.invoiced, 0) AS invoiced,
                   COALESCE(c.collected, 0) AS collected
            FROM months m
            LEFT JOIN billed b ON b.month = m.month
            LEFT JOIN collected c ON c.month = m.month
            ORDER BY m.month
            "#,
        )
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to build revenue report: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn appointments(
        &self,
        scope: &TenantScope,
        params: &ReportRangeParams,
    ) -> Result<AppointmentBreakdownDto> {
        let (from, to) = Self::range(params)?;

        let by_status = sqlx::query_as::<_, StatusCountDto>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM appointments
            WHERE organization_id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
              AND start_time::date BETWEEN $3 AND $4
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to build appointment report: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(AppointmentBreakdownDto::new(from, to, by_status))
    }

    /// Most frequently planned treatments in the window
    pub async fn top_treatments(
        &self,
        scope: &TenantScope,
        params: &TopTreatmentsParams,
    ) -> Result<Vec<TopTreatmentDto>> {
        let (from, to) = Self::range(&params.range())?;

        sqlx::query_as::<_, TopTreatmentDto>(
            r#"
            SELECT t.id AS treatment_id, t.name, t.code,
                   COUNT(*) AS times_planned,
                   COALESCE(SUM(it.cost), 0) AS planned_value
            FROM treatment_plan_items it
            JOIN treatment_plans tp ON tp.id = it.plan_id
            JOIN treatments t ON t.id = it.treatment_id
            WHERE tp.organization_id = $1 AND ($2::uuid IS NULL OR tp.clinic_id = $2)
              AND tp.status <> 'cancelled'
              AND tp.created_at::date BETWEEN $3 AND $4
            GROUP BY t.id, t.name, t.code
            ORDER BY times_planned DESC, planned_value DESC, t.name
            LIMIT $5
            "#,
        )
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .bind(from)
        .bind(to)
        .bind(params.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to build treatment report: {:?}", e);
            AppError::Database(e)
        })
    }
}
