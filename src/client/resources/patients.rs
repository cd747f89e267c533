use chrono::NaiveDate;
use uuid::Uuid;

use crate::client::api::{ApiClient, ListQuery, Page};
use crate::client::error::ClientResult;
use crate::features::patients::dtos::{
    CreatePatientDto, EmergencyContact, PatientResponseDto, UpdatePatientDto,
};
use crate::features::patients::models::PatientGender;
use crate::shared::types::Address;

pub struct PatientsApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn patients(&self) -> PatientsApi<'_> {
        PatientsApi { api: self }
    }
}

impl PatientsApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<PatientResponseDto>> {
        self.api.get_page("/api/patients", query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<PatientResponseDto> {
        self.api.get(&format!("/api/patients/{}", id)).await
    }

    pub async fn create(&self, dto: &CreatePatientDto) -> ClientResult<PatientResponseDto> {
        self.api.post("/api/patients", dto).await
    }

    /// Submit the "add patient" form
    pub async fn add(&self, form: NewPatientForm) -> ClientResult<PatientResponseDto> {
        self.create(&form.into()).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdatePatientDto,
    ) -> ClientResult<PatientResponseDto> {
        self.api.put(&format!("/api/patients/{}", id), dto).await
    }

    /// Deactivates the patient; records are kept
    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api.delete(&format!("/api/patients/{}", id)).await
    }
}

/// Fields of the add-patient form as the user fills them in
#[derive(Debug, Clone, Default)]
pub struct NewPatientForm {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub gender: Option<PatientGender>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Vec<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub clinic_id: Option<Uuid>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewPatientForm {
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<NewPatientForm> for CreatePatientDto {
    fn from(form: NewPatientForm) -> Self {
        let name = form.full_name();
        let emergency_contact = match (
            non_empty(form.emergency_contact_name),
            non_empty(form.emergency_contact_phone),
        ) {
            (Some(name), Some(phone)) => Some(EmergencyContact { name, phone }),
            _ => None,
        };

        Self {
            name,
            email: non_empty(form.email),
            phone: form.phone.trim().to_string(),
            gender: form.gender,
            date_of_birth: form.date_of_birth,
            blood_group: non_empty(form.blood_group),
            address: Some(Address {
                street: non_empty(form.street),
                city: non_empty(form.city),
                state: non_empty(form.state),
                pincode: non_empty(form.pincode),
                country: None,
            }),
            medical_history: non_empty(form.medical_history),
            allergies: form
                .allergies
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            emergency_contact,
            clinic_id: form.clinic_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn jane() -> NewPatientForm {
        NewPatientForm {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: "9876543210".to_string(),
            pincode: Some("560001".to_string()),
            city: Some(" Bengaluru ".to_string()),
            allergies: vec!["Penicillin".to_string(), " ".to_string()],
            clinic_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    #[test]
    fn test_form_builds_create_request() {
        let form = jane();
        let clinic_id = form.clinic_id;
        let dto = CreatePatientDto::from(form);

        assert_eq!(dto.name, "Jane Doe");
        assert_eq!(dto.clinic_id, clinic_id);
        assert_eq!(dto.allergies, vec!["Penicillin".to_string()]);
        let address = dto.address.as_ref().unwrap();
        assert_eq!(address.pincode.as_deref(), Some("560001"));
        assert_eq!(address.city.as_deref(), Some("Bengaluru"));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_form_serializes_nested_address() {
        let value = serde_json::to_value(CreatePatientDto::from(jane())).unwrap();
        assert_eq!(value["name"], "Jane Doe");
        assert_eq!(value["address"]["pincode"], "560001");
        assert!(value.get("firstName").is_none());
    }

    #[test]
    fn test_half_filled_emergency_contact_is_dropped() {
        let mut form = jane();
        form.emergency_contact_name = Some("John Doe".to_string());
        assert!(CreatePatientDto::from(form).emergency_contact.is_none());
    }

    #[test]
    fn test_full_name_without_last_name() {
        let form = NewPatientForm {
            first_name: " Ravi ".to_string(),
            ..Default::default()
        };
        assert_eq!(form.full_name(), "Ravi");
    }
}
