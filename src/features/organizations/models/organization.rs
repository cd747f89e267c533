use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::Address;

pub const ORGANIZATION_COLUMNS: &str =
    "id, name, code, email, phone, address, owner_id, created_at, updated_at";

pub const SETTINGS_COLUMNS: &str = "organization_id, currency, invoice_prefix, \
     default_tax_percent, next_invoice_seq, payment_terms_days, updated_at";

pub const JOIN_REQUEST_COLUMNS: &str = "jr.id, jr.organization_id, o.name AS organization_name, \
     jr.user_id, u.name AS user_name, u.email AS user_email, jr.message, jr.status, \
     jr.reviewed_by, jr.reviewed_at, jr.created_at";

/// Join request rows always come with the organization and applicant names
pub const JOIN_REQUEST_FROM: &str = "join_requests jr \
     JOIN organizations o ON o.id = jr.organization_id \
     JOIN users u ON u.id = jr.user_id";

#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Json<Address>>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrganizationSettings {
    pub organization_id: Uuid,
    pub currency: String,
    pub invoice_prefix: String,
    pub default_tax_percent: Decimal,
    pub next_invoice_seq: i32,
    pub payment_terms_days: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "join_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, FromRow)]
pub struct JoinRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Lowercase hyphenated code derived from a display name
pub fn code_from_name(name: &str) -> String {
    let mut code = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            code.push(c.to_ascii_lowercase());
        } else if !code.is_empty() && !code.ends_with('-') {
            code.push('-');
        }
    }
    while code.ends_with('-') {
        code.pop();
    }
    code.truncate(50);
    code.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::CODE_REGEX;

    #[test]
    fn test_code_from_name() {
        assert_eq!(code_from_name("Bright Smile Dental"), "bright-smile-dental");
        assert_eq!(code_from_name("  Dr. Rao's  Clinic!! "), "dr-rao-s-clinic");
        assert_eq!(code_from_name("32 Pearls & Co."), "32-pearls-co");
        assert_eq!(code_from_name("!!!"), "");
    }

    #[test]
    fn test_generated_codes_pass_validation() {
        for name in ["Bright Smile Dental", "A--B", "Tooth Care (Pune)"] {
            assert!(CODE_REGEX.is_match(&code_from_name(name)), "{}", name);
        }
    }

    #[test]
    fn test_long_names_truncated() {
        let code = code_from_name(&"dental ".repeat(20));
        assert!(code.len() <= 50);
        assert!(!code.ends_with('-'));
    }
}
