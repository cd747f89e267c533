use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::prescriptions::models::{Medication, Prescription};
use crate::shared::types::{default_page, default_page_size, Paginated};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Uuid,
    pub diagnosis: String,
    pub medications: Vec<Medication>,
    pub notes: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Prescription> for PrescriptionResponseDto {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            clinic_id: p.clinic_id,
            patient_id: p.patient_id,
            dentist_id: p.dentist_id,
            diagnosis: p.diagnosis,
            medications: p.medications.0,
            notes: p.notes,
            issued_at: p.issued_at,
            is_active: p.is_active,
            created_by: p.created_by,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionDto {
    pub patient_id: Uuid,
    /// Staff id of the prescribing dentist
    pub dentist_id: Uuid,

    #[validate(length(min = 1, max = 2000, message = "Diagnosis is required"))]
    pub diagnosis: String,

    #[validate(length(min = 1, message = "At least one medication is required"), nested)]
    pub medications: Vec<Medication>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    /// Defaults to now
    pub issued_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrescriptionDto {
    #[validate(length(min = 1, max = 2000, message = "Diagnosis is required"))]
    pub diagnosis: Option<String>,

    #[validate(length(min = 1, message = "At least one medication is required"), nested)]
    pub medications: Option<Vec<Medication>>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PrescriptionQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in diagnosis
    pub search: Option<String>,
    pub patient_id: Option<Uuid>,
    pub dentist_id: Option<Uuid>,
    /// Include voided prescriptions
    #[serde(default)]
    pub include_inactive: bool,
}

impl Paginated for PrescriptionQueryParams {
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

    fn amoxicillin() -> serde_json::Value {
        serde_json::json!({
            "name": "Amoxicillin",
            "dosage": "500mg",
            "frequency": "1-1-1",
            "durationDays": 5,
            "instructions": "After food"
        })
    }

    #[test]
    fn test_medications_deserialize_camel_case() {
        let dto: CreatePrescriptionDto = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "dentistId": Uuid::new_v4(),
            "diagnosis": "Periapical abscess, 46",
            "medications": [amoxicillin()]
        }))
        .unwrap();
        assert_eq!(dto.medications[0].duration_days, 5);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_invalid_medication_fails_nested_validation() {
        let mut medication = amoxicillin();
        medication["durationDays"] = serde_json::json!(0);
        let dto: CreatePrescriptionDto = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "dentistId": Uuid::new_v4(),
            "diagnosis": "Pulpitis",
            "medications": [medication]
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_empty_medications_rejected() {
        let dto: CreatePrescriptionDto = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "dentistId": Uuid::new_v4(),
            "diagnosis": "Pulpitis",
            "medications": []
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }
}
