use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::patients::models::{Patient, PatientGender};
use crate::shared::types::{default_page, default_page_size, Address, Paginated, SortDirection};
use crate::shared::validation::PHONE_REGEX;

const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

fn validate_blood_group(value: &str) -> Result<(), ValidationError> {
    if BLOOD_GROUPS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("blood_group")
            .with_message("Blood group must be one of A+, A-, B+, B-, AB+, AB-, O+, O-".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub gender: Option<PatientGender>,
    pub date_of_birth: Option<NaiveDate>,
    /// Age in whole years, derived from the date of birth
    pub age: Option<i32>,
    pub blood_group: Option<String>,
    pub address: Option<Address>,
    pub medical_history: Option<String>,
    pub allergies: Vec<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whole years between `dob` and `today`
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

impl From<Patient> for PatientResponseDto {
    fn from(p: Patient) -> Self {
        let emergency_contact = match (p.emergency_contact_name, p.emergency_contact_phone) {
            (Some(name), Some(phone)) => Some(EmergencyContact { name, phone }),
            _ => None,
        };
        Self {
            id: p.id,
            clinic_id: p.clinic_id,
            name: p.name,
            email: p.email,
            phone: p.phone,
            gender: p.gender,
            age: p.date_of_birth.map(|dob| age_on(dob, Utc::now().date_naive())),
            date_of_birth: p.date_of_birth,
            blood_group: p.blood_group,
            address: p.address.map(|a| a.0),
            medical_history: p.medical_history,
            allergies: p.allergies,
            emergency_contact,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Request DTO for registering a patient
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: String,

    pub gender: Option<PatientGender>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(custom(function = "validate_blood_group"))]
    pub blood_group: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,

    pub medical_history: Option<String>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[validate(nested)]
    pub emergency_contact: Option<EmergencyContact>,

    /// Required when the request scope is "all"
    pub clinic_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientDto {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be a valid 10-digit mobile number"))]
    pub phone: Option<String>,

    pub gender: Option<PatientGender>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(custom(function = "validate_blood_group"))]
    pub blood_group: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,

    pub medical_history: Option<String>,

    pub allergies: Option<Vec<String>>,

    #[validate(nested)]
    pub emergency_contact: Option<EmergencyContact>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PatientSortBy {
    Name,
    #[default]
    CreatedAt,
}

impl PatientSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PatientSortBy::Name => "name",
            PatientSortBy::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PatientQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in name, phone or email
    pub search: Option<String>,
    pub gender: Option<PatientGender>,
    /// Filter by active flag (default: only active)
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_by: PatientSortBy,
    #[serde(default)]
    pub sort: SortDirection,
}

impl Paginated for PatientQueryParams {
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

    fn dto(phone: &str) -> CreatePatientDto {
        CreatePatientDto {
            name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: phone.to_string(),
            gender: Some(PatientGender::Female),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            blood_group: Some("O+".to_string()),
            address: None,
            medical_history: None,
            allergies: vec![],
            emergency_contact: None,
            clinic_id: None,
        }
    }

    #[test]
    fn test_nine_digit_phone_is_rejected() {
        assert!(dto("987654321").validate().is_err());
    }

    #[test]
    fn test_indian_mobile_is_accepted() {
        assert!(dto("9876543210").validate().is_ok());
        assert!(dto("6000000000").validate().is_ok());
        assert!(dto("5876543210").validate().is_err());
    }

    #[test]
    fn test_blood_group_is_checked() {
        let mut patient = dto("9876543210");
        patient.blood_group = Some("C+".to_string());
        assert!(patient.validate().is_err());
    }

    #[test]
    fn test_age_on() {
        let dob = NaiveDate::from_ymd_opt(1990, 4, 12).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 4, 11).unwrap()), 33);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 4, 12).unwrap()), 34);
    }

    #[test]
    fn test_create_accepts_nested_payload() {
        let json = r#"{
            "name": "Jane Doe",
            "phone": "9876543210",
            "address": {"city": "Pune", "pincode": "411001"},
            "clinicId": "7f1d1c52-2f5e-4d55-9a7e-0a8f4c3f9b11"
        }"#;
        let dto: CreatePatientDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.address.unwrap().city.as_deref(), Some("Pune"));
        assert!(dto.clinic_id.is_some());
        assert!(dto.allergies.is_empty());
    }
}
