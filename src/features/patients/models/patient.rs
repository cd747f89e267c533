use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::Address;

pub const PATIENT_COLUMNS: &str = "id, organization_id, clinic_id, name, email, phone, gender, \
     date_of_birth, blood_group, address, medical_history, allergies, emergency_contact_name, \
     emergency_contact_phone, is_active, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "patient_gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PatientGender {
    Male,
    Female,
    Other,
}

/// Database model for patients
#[derive(Debug, Clone, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub gender: Option<PatientGender>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<String>,
    pub address: Option<Json<Address>>,
    pub medical_history: Option<String>,
    pub allergies: Vec<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
