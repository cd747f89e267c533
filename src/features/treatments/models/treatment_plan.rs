use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::validation::max_money;

pub const TREATMENT_PLAN_COLUMNS: &str = "id, organization_id, clinic_id, patient_id, name, \
     status, notes, total_cost, total_duration_minutes, created_by, created_at, updated_at";

pub const TREATMENT_PLAN_ITEM_COLUMNS: &str =
    "id, plan_id, position, treatment_id, tooth_number, cost, duration_minutes, notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "treatment_plan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TreatmentPlanStatus {
    Proposed,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl TreatmentPlanStatus {
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            TreatmentPlanStatus::Completed | TreatmentPlanStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TreatmentPlan {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub status: TreatmentPlanStatus,
    pub notes: Option<String>,
    pub total_cost: Decimal,
    pub total_duration_minutes: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TreatmentPlanItem {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub position: i32,
    pub treatment_id: Uuid,
    pub tooth_number: Option<String>,
    pub cost: Decimal,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

/// A plan line with catalog defaults already applied
#[derive(Debug, Clone, PartialEq)]
pub struct PlanLine {
    pub treatment_id: Uuid,
    pub tooth_number: Option<String>,
    pub cost: Decimal,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

/// Aggregate cost and chair time over the plan lines
pub fn plan_totals(lines: &[PlanLine]) -> Result<(Decimal, i32)> {
    let too_large = || AppError::BadRequest("Treatment plan total is too large".to_string());
    let (cost, minutes) = lines
        .iter()
        .try_fold((Decimal::ZERO, 0i32), |(cost, minutes), line| {
            Some((
                cost.checked_add(line.cost)?,
                minutes.checked_add(line.duration_minutes)?,
            ))
        })
        .ok_or_else(too_large)?;

    if cost > max_money() {
        return Err(too_large());
    }
    Ok((cost, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(cost: Decimal, minutes: i32) -> PlanLine {
        PlanLine {
            treatment_id: Uuid::new_v4(),
            tooth_number: Some("36".to_string()),
            cost,
            duration_minutes: minutes,
            notes: None,
        }
    }

    #[test]
    fn test_plan_totals() {
        let lines = vec![line(dec("4500.00"), 60), line(dec("1200.50"), 30), line(dec("800"), 15)];
        assert_eq!(plan_totals(&lines).unwrap(), (dec("6500.50"), 105));
    }

    #[test]
    fn test_empty_plan_totals() {
        assert_eq!(plan_totals(&[]).unwrap(), (Decimal::ZERO, 0));
    }

    #[test]
    fn test_plan_total_beyond_column_limit() {
        let lines = vec![line(dec("9999999999.99"), 60), line(dec("0.01"), 30)];
        assert!(matches!(plan_totals(&lines), Err(AppError::BadRequest(_))));

        let lines = vec![line(Decimal::MAX, 60), line(Decimal::MAX, 30)];
        assert!(matches!(plan_totals(&lines), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_closed_statuses() {
        assert!(TreatmentPlanStatus::Completed.is_closed());
        assert!(TreatmentPlanStatus::Cancelled.is_closed());
        assert!(!TreatmentPlanStatus::InProgress.is_closed());
    }
}
