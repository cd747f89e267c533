use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DOCUMENT_COLUMNS: &str = "id, patient_id, filename, original_name, file_type, file_size, \
     path, checksum, category, description, uploaded_by, clinic_id, is_archived, created_at, updated_at";

/// What a patient document contains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "document_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    MedicalHistory,
    TreatmentPlan,
    Prescription,
    LabReport,
    ConsentForm,
    Insurance,
    Invoice,
    #[default]
    Other,
}

/// A file uploaded against a patient record. Archived, never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Name the object is stored under
    pub filename: String,
    /// Name the file had on the uploader's machine
    pub original_name: String,
    /// MIME type
    pub file_type: String,
    pub file_size: i64,
    /// Storage key
    pub path: String,
    /// SHA-256 of the content, hex encoded
    pub checksum: String,
    pub category: DocumentCategory,
    pub description: Option<String>,
    pub uploaded_by: Uuid,
    pub clinic_id: Uuid,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
