use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::patients::patient_clinic;
use crate::features::treatments::dtos::{
    CreateTreatmentPlanDto, TreatmentPlanItemInput, TreatmentPlanQueryParams,
    TreatmentPlanResponseDto, UpdateTreatmentPlanDto,
};
use crate::features::treatments::models::{
    plan_totals, PlanLine, TreatmentPlan, TreatmentPlanItem, TreatmentPlanStatus,
    TREATMENT_PLAN_COLUMNS, TREATMENT_PLAN_ITEM_COLUMNS,
};
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Paginated};

/// Catalog price and duration of one treatment
type CatalogEntry = (Decimal, i32);

/// Fill each line's cost and duration from the catalog unless overridden
pub fn apply_catalog_defaults(
    items: Vec<TreatmentPlanItemInput>,
    catalog: &HashMap<Uuid, CatalogEntry>,
) -> Result<Vec<PlanLine>> {
    items
        .into_iter()
        .map(|item| {
            let (cost, duration) = catalog.get(&item.treatment_id).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Treatment {} is not in the active catalog",
                    item.treatment_id
                ))
            })?;
            Ok(PlanLine {
                treatment_id: item.treatment_id,
                tooth_number: item.tooth_number,
                cost: item.cost.unwrap_or(*cost),
                duration_minutes: item.duration_minutes.unwrap_or(*duration),
                notes: item.notes,
            })
        })
        .collect()
}

/// Service for patient treatment plans
pub struct TreatmentPlanService {
    pool: PgPool,
}

impl TreatmentPlanService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn resolve_lines(
        &self,
        org_id: Uuid,
        items: Vec<TreatmentPlanItemInput>,
    ) -> Result<Vec<PlanLine>> {
        let ids: Vec<Uuid> = items.iter().map(|i| i.treatment_id).collect();
        let rows: Vec<(Uuid, Decimal, i32)> = sqlx::query_as(
            r#"
            SELECT id, cost, duration_minutes FROM treatments
            WHERE organization_id = $1 AND id = ANY($2) AND is_active
            "#,
        )
        .bind(org_id)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load catalog treatments: {:?}", e);
            AppError::Database(e)
        })?;

        let catalog: HashMap<Uuid, CatalogEntry> = rows
            .into_iter()
            .map(|(id, cost, minutes)| (id, (cost, minutes)))
            .collect();
        apply_catalog_defaults(items, &catalog)
    }

    async fn insert_items(
        tx: &mut Transaction<'_, Postgres>,
        plan_id: Uuid,
        lines: &[PlanLine],
    ) -> Result<Vec<TreatmentPlanItem>> {
        let query = format!(
            r#"
            INSERT INTO treatment_plan_items
                (plan_id, position, treatment_id, tooth_number, cost, duration_minutes, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TREATMENT_PLAN_ITEM_COLUMNS
        );

        let mut items = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let item = sqlx::query_as::<_, TreatmentPlanItem>(&query)
                .bind(plan_id)
                .bind(position as i32)
                .bind(line.treatment_id)
                .bind(&line.tooth_number)
                .bind(line.cost)
                .bind(line.duration_minutes)
                .bind(&line.notes)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to insert plan item: {:?}", e);
                    AppError::from_db(e, "Duplicate plan item")
                })?;
            items.push(item);
        }
        Ok(items)
    }

    async fn items(&self, plan_id: Uuid) -> Result<Vec<TreatmentPlanItem>> {
        let query = format!(
            "SELECT {} FROM treatment_plan_items WHERE plan_id = $1 ORDER BY position",
            TREATMENT_PLAN_ITEM_COLUMNS
        );
        sqlx::query_as::<_, TreatmentPlanItem>(&query)
            .bind(plan_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load items of plan {}: {:?}", plan_id, e);
                AppError::Database(e)
            })
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> Result<TreatmentPlan> {
        let query = format!(
            r#"
            SELECT {} FROM treatment_plans
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            TREATMENT_PLAN_COLUMNS
        );
        sqlx::query_as::<_, TreatmentPlan>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch treatment plan {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Treatment plan not found".to_string()))
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &TreatmentPlanQueryParams,
    ) -> Result<(Vec<TreatmentPlanResponseDto>, i64)> {
        let pattern = search_pattern(params.search.as_deref());
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
              AND ($4::uuid IS NULL OR patient_id = $4)
              AND ($5::treatment_plan_status IS NULL OR status = $5)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM treatment_plans {}", filter))
                .bind(scope.organization_id)
                .bind(scope.clinic_id())
                .bind(&pattern)
                .bind(params.patient_id)
                .bind(params.status)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count treatment plans: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {} FROM treatment_plans {} ORDER BY created_at DESC LIMIT $6 OFFSET $7",
            TREATMENT_PLAN_COLUMNS, filter
        );
        let plans = sqlx::query_as::<_, TreatmentPlan>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.patient_id)
            .bind(params.status)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list treatment plans: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((plans.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<TreatmentPlanResponseDto> {
        let plan = self.find(scope, id).await?;
        let items = self.items(plan.id).await?;
        Ok(TreatmentPlanResponseDto::with_items(plan, items))
    }

    /// Create a plan and its lines in one transaction
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        scope: &TenantScope,
        dto: CreateTreatmentPlanDto,
    ) -> Result<TreatmentPlanResponseDto> {
        let clinic_id = patient_clinic(&self.pool, scope, dto.patient_id).await?;
        let lines = self.resolve_lines(scope.organization_id, dto.items).await?;
        let (total_cost, total_minutes) = plan_totals(&lines)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            r#"
            INSERT INTO treatment_plans
                (organization_id, clinic_id, patient_id, name, notes,
                 total_cost, total_duration_minutes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TREATMENT_PLAN_COLUMNS
        );
        let plan = sqlx::query_as::<_, TreatmentPlan>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.patient_id)
            .bind(dto.name.trim())
            .bind(dto.notes)
            .bind(total_cost)
            .bind(total_minutes)
            .bind(user.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create treatment plan: {:?}", e);
                AppError::Database(e)
            })?;

        let items = Self::insert_items(&mut tx, plan.id, &lines).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit treatment plan: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Treatment plan {} created with {} items",
            plan.id,
            items.len()
        );
        Ok(TreatmentPlanResponseDto::with_items(plan, items))
    }

    /// Edit a plan; replacing the lines recomputes both aggregates
    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdateTreatmentPlanDto,
    ) -> Result<TreatmentPlanResponseDto> {
        let existing = self.find(scope, id).await?;
        if existing.status.is_closed() {
            return Err(AppError::BadRequest(
                "Completed or cancelled plans cannot be edited".to_string(),
            ));
        }

        let lines = match dto.items {
            Some(items) => Some(self.resolve_lines(scope.organization_id, items).await?),
            None => None,
        };
        let (total_cost, total_minutes) = match &lines {
            Some(lines) => plan_totals(lines)?,
            None => (existing.total_cost, existing.total_duration_minutes),
        };

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            r#"
            UPDATE treatment_plans SET
                name = COALESCE($2, name),
                status = COALESCE($3, status),
                notes = COALESCE($4, notes),
                total_cost = $5,
                total_duration_minutes = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TREATMENT_PLAN_COLUMNS
        );
        let plan = sqlx::query_as::<_, TreatmentPlan>(&query)
            .bind(id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.status)
            .bind(dto.notes)
            .bind(total_cost)
            .bind(total_minutes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update treatment plan {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if let Some(lines) = &lines {
            sqlx::query("DELETE FROM treatment_plan_items WHERE plan_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to clear items of plan {}: {:?}", id, e);
                    AppError::Database(e)
                })?;
            Self::insert_items(&mut tx, id, lines).await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit treatment plan update: {:?}", e);
            AppError::Database(e)
        })?;

        let items = self.items(id).await?;
        Ok(TreatmentPlanResponseDto::with_items(plan, items))
    }

    /// Soft delete: the plan is cancelled and kept for history
    pub async fn cancel(&self, scope: &TenantScope, id: Uuid) -> Result<()> {
        let existing = self.find(scope, id).await?;
        if existing.status == TreatmentPlanStatus::Completed {
            return Err(AppError::BadRequest(
                "Completed plans cannot be cancelled".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE treatment_plans SET status = 'cancelled', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to cancel treatment plan {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(treatment_id: Uuid, cost: Option<Decimal>) -> TreatmentPlanItemInput {
        TreatmentPlanItemInput {
            treatment_id,
            tooth_number: Some("46".to_string()),
            cost,
            duration_minutes: None,
            notes: None,
        }
    }

    #[test]
    fn test_catalog_defaults_and_overrides() {
        let rct = Uuid::new_v4();
        let crown = Uuid::new_v4();
        let catalog = HashMap::from([
            (rct, (Decimal::new(4500, 0), 60)),
            (crown, (Decimal::new(8000, 0), 45)),
        ]);

        let lines = apply_catalog_defaults(
            vec![input(rct, None), input(crown, Some(Decimal::new(7500, 0)))],
            &catalog,
        )
        .unwrap();

        assert_eq!(lines[0].cost, Decimal::new(4500, 0));
        assert_eq!(lines[1].cost, Decimal::new(7500, 0));
        assert_eq!(plan_totals(&lines).unwrap(), (Decimal::new(12000, 0), 105));
    }

    #[test]
    fn test_unknown_treatment_rejected() {
        let result = apply_catalog_defaults(vec![input(Uuid::new_v4(), None)], &HashMap::new());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
