use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub const TREATMENT_COLUMNS: &str = "id, organization_id, name, code, category, description, \
     cost, duration_minutes, is_active, created_at, updated_at";

/// Catalog entry priced per organization
#[derive(Debug, Clone, FromRow)]
pub struct Treatment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub cost: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
