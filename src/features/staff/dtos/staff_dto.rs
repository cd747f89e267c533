use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::staff::models::{Staff, StaffRole};
use crate::shared::types::{default_page, default_page_size, Paginated};
use crate::shared::validation::PHONE_REGEX;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub specialization: Option<String>,
    pub joined_on: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Staff> for StaffResponseDto {
    fn from(s: Staff) -> Self {
        Self {
            id: s.id,
            clinic_id: s.clinic_id,
            user_id: s.user_id,
            name: s.name,
            email: s.email,
            phone: s.phone,
            role: s.role,
            specialization: s.specialization,
            joined_on: s.joined_on,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    pub role: StaffRole,

    #[validate(length(max = 150))]
    pub specialization: Option<String>,

    pub joined_on: Option<NaiveDate>,

    /// Login account of this staff member, if any (must belong to the organization)
    pub user_id: Option<Uuid>,

    /// Required when the request scope is "all"
    pub clinic_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    pub role: Option<StaffRole>,

    #[validate(length(max = 150))]
    pub specialization: Option<String>,

    pub joined_on: Option<NaiveDate>,

    pub user_id: Option<Uuid>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct StaffQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in name, email or phone
    pub search: Option<String>,
    pub role: Option<StaffRole>,
    /// Filter by active flag (default: only active)
    pub is_active: Option<bool>,
}

impl Paginated for StaffQueryParams {
    fn page(&self) -> i64 {
        self.page
    }
    fn page_size(&self) -> i64 {
        self.page_size
    }
}
