use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const PRESCRIPTION_COLUMNS: &str = "id, organization_id, clinic_id, patient_id, dentist_id, \
     diagnosis, medications, notes, issued_at, is_active, created_by, created_at, updated_at";

/// One prescribed medicine, stored inside the `medications` JSONB array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[validate(length(min = 1, max = 150, message = "Medicine name is required"))]
    pub name: String,
    /// e.g. "500mg"
    #[validate(length(min = 1, max = 100, message = "Dosage is required"))]
    pub dosage: String,
    /// e.g. "1-0-1 after food"
    #[validate(length(min = 1, max = 100, message = "Frequency is required"))]
    pub frequency: String,
    #[validate(range(min = 1, max = 365, message = "Duration must be 1-365 days"))]
    pub duration_days: i32,
    #[validate(length(max = 500))]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Prescription {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Uuid,
    pub diagnosis: String,
    pub medications: Json<Vec<Medication>>,
    pub notes: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
