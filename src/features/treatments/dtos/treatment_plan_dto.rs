use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::treatments::models::{
    TreatmentPlan, TreatmentPlanItem, TreatmentPlanStatus,
};
use crate::shared::types::{default_page, default_page_size, Paginated};
use crate::shared::validation::{validate_money, TOOTH_NUMBER_REGEX};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlanItemDto {
    pub id: Uuid,
    pub position: i32,
    pub treatment_id: Uuid,
    pub tooth_number: Option<String>,
    #[schema(value_type = String)]
    pub cost: Decimal,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

impl From<TreatmentPlanItem> for TreatmentPlanItemDto {
    fn from(i: TreatmentPlanItem) -> Self {
        Self {
            id: i.id,
            position: i.position,
            treatment_id: i.treatment_id,
            tooth_number: i.tooth_number,
            cost: i.cost,
            duration_minutes: i.duration_minutes,
            notes: i.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlanResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub status: TreatmentPlanStatus,
    pub notes: Option<String>,
    #[schema(value_type = String)]
    pub total_cost: Decimal,
    pub total_duration_minutes: i32,
    /// Omitted from list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TreatmentPlanItemDto>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreatmentPlanResponseDto {
    pub fn with_items(plan: TreatmentPlan, items: Vec<TreatmentPlanItem>) -> Self {
        let mut dto = Self::from(plan);
        dto.items = Some(items.into_iter().map(Into::into).collect());
        dto
    }
}

impl From<TreatmentPlan> for TreatmentPlanResponseDto {
    fn from(p: TreatmentPlan) -> Self {
        Self {
            id: p.id,
            clinic_id: p.clinic_id,
            patient_id: p.patient_id,
            name: p.name,
            status: p.status,
            notes: p.notes,
            total_cost: p.total_cost,
            total_duration_minutes: p.total_duration_minutes,
            items: None,
            created_by: p.created_by,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// One line of a plan; cost and duration default to the catalog values
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlanItemInput {
    pub treatment_id: Uuid,

    /// FDI tooth number (e.g. "36")
    #[validate(regex(path = *TOOTH_NUMBER_REGEX, message = "Invalid FDI tooth number"))]
    pub tooth_number: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,

    #[validate(range(min = 1, max = 480, message = "Duration must be 1-480 minutes"))]
    pub duration_minutes: Option<i32>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentPlanDto {
    pub patient_id: Uuid,

    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    #[validate(length(min = 1, message = "A plan needs at least one treatment"), nested)]
    pub items: Vec<TreatmentPlanItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTreatmentPlanDto {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,

    pub status: Option<TreatmentPlanStatus>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    /// Replaces every line when present; totals are recomputed
    #[validate(length(min = 1, message = "A plan needs at least one treatment"), nested)]
    pub items: Option<Vec<TreatmentPlanItemInput>>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TreatmentPlanQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in plan name
    pub search: Option<String>,
    pub patient_id: Option<Uuid>,
    pub status: Option<TreatmentPlanStatus>,
}

impl Paginated for TreatmentPlanQueryParams {
    fn page(&self) -> i64 {
        self.page
    }
    fn page_size(&self) -> i64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tooth: Option<&str>) -> TreatmentPlanItemInput {
        TreatmentPlanItemInput {
            treatment_id: Uuid::new_v4(),
            tooth_number: tooth.map(str::to_string),
            cost: None,
            duration_minutes: None,
            notes: None,
        }
    }

    #[test]
    fn test_plan_requires_items() {
        let dto = CreateTreatmentPlanDto {
            patient_id: Uuid::new_v4(),
            name: "Lower molars".to_string(),
            notes: None,
            items: vec![],
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_tooth_numbers_are_checked_per_item() {
        let mut dto = CreateTreatmentPlanDto {
            patient_id: Uuid::new_v4(),
            name: "Lower molars".to_string(),
            notes: None,
            items: vec![item(Some("36")), item(None)],
        };
        assert!(dto.validate().is_ok());

        dto.items.push(item(Some("39")));
        assert!(dto.validate().is_err());
    }
}
