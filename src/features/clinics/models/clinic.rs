use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::types::Address;

pub const CLINIC_COLUMNS: &str =
    "id, organization_id, name, phone, email, address, is_active, created_at, updated_at";

/// Database model for clinics
#[derive(Debug, Clone, FromRow)]
pub struct Clinic {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Json<Address>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
