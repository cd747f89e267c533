use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::UserRole;
use crate::features::organizations::models::{
    JoinRequest, JoinRequestStatus, Organization, OrganizationSettings,
};
use crate::shared::types::{default_page, default_page_size, Address, Paginated};
use crate::shared::validation::{
    validate_percent, CODE_REGEX, CURRENCY_REGEX, INVOICE_PREFIX_REGEX, PHONE_REGEX,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponseDto {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponseDto {
    fn from(o: Organization) -> Self {
        Self {
            id: o.id,
            name: o.name,
            code: o.code,
            email: o.email,
            phone: o.phone,
            address: o.address.map(|a| a.0),
            owner_id: o.owner_id,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Public search result: enough to pick an organization to join
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

impl From<Organization> for OrganizationSummaryDto {
    fn from(o: Organization) -> Self {
        Self {
            id: o.id,
            name: o.name,
            code: o.code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,

    /// Unique slug; derived from the name when omitted
    #[validate(
        length(min = 2, max = 50),
        regex(path = *CODE_REGEX, message = "Code must be lowercase letters, digits and single hyphens")
    )]
    pub code: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettingsDto {
    pub currency: String,
    pub invoice_prefix: String,
    #[schema(value_type = String)]
    pub default_tax_percent: Decimal,
    /// Sequence number the next invoice will receive
    pub next_invoice_seq: i32,
    pub payment_terms_days: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<OrganizationSettings> for OrganizationSettingsDto {
    fn from(s: OrganizationSettings) -> Self {
        Self {
            currency: s.currency,
            invoice_prefix: s.invoice_prefix,
            default_tax_percent: s.default_tax_percent,
            next_invoice_seq: s.next_invoice_seq,
            payment_terms_days: s.payment_terms_days,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsDto {
    #[validate(regex(path = *CURRENCY_REGEX, message = "Currency must be a 3-letter ISO code"))]
    pub currency: Option<String>,

    #[validate(regex(
        path = *INVOICE_PREFIX_REGEX,
        message = "Invoice prefix must be 2-10 uppercase letters or digits"
    ))]
    pub invoice_prefix: Option<String>,

    #[validate(custom(function = "validate_percent"))]
    #[schema(value_type = Option<String>)]
    pub default_tax_percent: Option<Decimal>,

    #[validate(range(min = 0, max = 365, message = "Payment terms must be 0-365 days"))]
    pub payment_terms_days: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct OrganizationSearchParams {
    /// Matches name or code
    pub q: String,
    /// Maximum results (default 10)
    #[serde(default = "default_search_limit")]
    #[param(minimum = 1, maximum = 25)]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    10
}

impl OrganizationSearchParams {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 25)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestResponseDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<JoinRequest> for JoinRequestResponseDto {
    fn from(r: JoinRequest) -> Self {
        Self {
            id: r.id,
            organization_id: r.organization_id,
            organization_name: r.organization_name,
            user_id: r.user_id,
            user_name: r.user_name,
            user_email: r.user_email,
            message: r.message,
            status: r.status,
            reviewed_by: r.reviewed_by,
            reviewed_at: r.reviewed_at,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJoinRequestDto {
    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveJoinRequestDto {
    /// Role granted on approval (default: the role the user registered with)
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMemberRoleDto {
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct JoinRequestQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by status (default: all)
    pub status: Option<JoinRequestStatus>,
}

impl Paginated for JoinRequestQueryParams {
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
    use std::str::FromStr;

    #[test]
    fn test_create_without_code_is_valid() {
        let dto: CreateOrganizationDto = serde_json::from_value(serde_json::json!({
            "name": "Bright Smile Dental",
            "phone": "9876543210"
        }))
        .unwrap();
        assert!(dto.code.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_uppercase_code_rejected() {
        let dto = CreateOrganizationDto {
            name: "Bright Smile".to_string(),
            code: Some("Bright-Smile".to_string()),
            email: None,
            phone: None,
            address: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_settings_validation() {
        let valid = UpdateSettingsDto {
            currency: Some("INR".to_string()),
            invoice_prefix: Some("BSD".to_string()),
            default_tax_percent: Some(Decimal::from_str("18").unwrap()),
            payment_terms_days: Some(30),
        };
        assert!(valid.validate().is_ok());

        let bad_prefix = UpdateSettingsDto {
            invoice_prefix: Some("inv-".to_string()),
            ..valid.clone()
        };
        assert!(bad_prefix.validate().is_err());

        let bad_tax = UpdateSettingsDto {
            default_tax_percent: Some(Decimal::from_str("120").unwrap()),
            ..valid.clone()
        };
        assert!(bad_tax.validate().is_err());

        let bad_terms = UpdateSettingsDto {
            payment_terms_days: Some(-1),
            ..valid
        };
        assert!(bad_terms.validate().is_err());
    }

    #[test]
    fn test_search_limit_clamped() {
        let params: OrganizationSearchParams =
            serde_json::from_value(serde_json::json!({ "q": "smile", "limit": 100 })).unwrap();
        assert_eq!(params.limit(), 25);
    }
}
