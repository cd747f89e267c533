use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::clinics::models::Clinic;
use crate::shared::types::{default_page, default_page_size, Address, Paginated};
use crate::shared::validation::PHONE_REGEX;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicResponseDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Clinic> for ClinicResponseDto {
    fn from(c: Clinic) -> Self {
        Self {
            id: c.id,
            organization_id: c.organization_id,
            name: c.name,
            phone: c.phone,
            email: c.email,
            address: c.address.map(|a| a.0),
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClinicDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClinicDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ClinicQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search by name
    pub search: Option<String>,
    /// Include deactivated clinics (default: false)
    #[serde(default)]
    pub include_inactive: bool,
}

impl Paginated for ClinicQueryParams {
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
    fn test_nested_address_is_validated() {
        let dto = CreateClinicDto {
            name: "Bright Smile Indiranagar".to_string(),
            phone: Some("9845012345".to_string()),
            email: None,
            address: Some(Address {
                pincode: Some("5600".to_string()),
                ..Default::default()
            }),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.errors().contains_key("address"));
    }
}
