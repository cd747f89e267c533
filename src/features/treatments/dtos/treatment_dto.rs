use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::treatments::models::Treatment;
use crate::shared::types::{default_page, default_page_size, Paginated};
use crate::shared::validation::validate_money;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentResponseDto {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String, example = "1500.00")]
    pub cost: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Treatment> for TreatmentResponseDto {
    fn from(t: Treatment) -> Self {
        Self {
            id: t.id,
            name: t.name,
            code: t.code,
            category: t.category,
            description: t.description,
            cost: t.cost,
            duration_minutes: t.duration_minutes,
            is_active: t.is_active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

fn default_duration() -> i32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentDto {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,

    /// Short catalog code, unique within the organization (e.g. "RCT")
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: String,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = String, example = "1500.00")]
    pub cost: Decimal,

    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 480, message = "Duration must be 1-480 minutes"))]
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTreatmentDto {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,

    #[validate(range(min = 1, max = 480, message = "Duration must be 1-480 minutes"))]
    pub duration_minutes: Option<i32>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TreatmentQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in name or code
    pub search: Option<String>,
    pub category: Option<String>,
    /// Filter by active flag (default: only active)
    pub is_active: Option<bool>,
}

impl Paginated for TreatmentQueryParams {
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

    #[test]
    fn test_cost_accepts_string_and_number() {
        let from_string: CreateTreatmentDto = serde_json::from_str(
            r#"{"name": "Root canal", "code": "RCT", "cost": "4500.00"}"#,
        )
        .unwrap();
        let from_number: CreateTreatmentDto =
            serde_json::from_str(r#"{"name": "Root canal", "code": "RCT", "cost": 4500}"#)
                .unwrap();
        assert_eq!(from_string.cost, from_number.cost);
        assert_eq!(from_string.duration_minutes, 30);
    }

    #[test]
    fn test_negative_cost_rejected() {
        let dto: CreateTreatmentDto =
            serde_json::from_str(r#"{"name": "Scaling", "code": "SC", "cost": "-1"}"#).unwrap();
        assert!(dto.validate().is_err());
    }
}
