use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::appointments::models::{Appointment, AppointmentStatus};
use crate::shared::types::{default_page, default_page_size, Paginated, SortDirection};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponseDto {
    fn from(a: Appointment) -> Self {
        Self {
            end_time: a.end_time(),
            id: a.id,
            clinic_id: a.clinic_id,
            patient_id: a.patient_id,
            dentist_id: a.dentist_id,
            start_time: a.start_time,
            duration_minutes: a.duration_minutes,
            appointment_type: a.appointment_type,
            status: a.status,
            notes: a.notes,
            created_by: a.created_by,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

fn default_duration() -> i32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentDto {
    pub patient_id: Uuid,
    /// Staff id of the treating dentist
    pub dentist_id: Uuid,
    pub start_time: DateTime<Utc>,

    #[serde(default = "default_duration")]
    #[validate(range(min = 5, max = 480, message = "Duration must be 5-480 minutes"))]
    pub duration_minutes: i32,

    #[validate(length(min = 1, max = 100, message = "Appointment type must be 1-100 characters"))]
    pub appointment_type: String,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentDto {
    pub dentist_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,

    #[validate(range(min = 5, max = 480, message = "Duration must be 5-480 minutes"))]
    pub duration_minutes: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "Appointment type must be 1-100 characters"))]
    pub appointment_type: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentStatusDto {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AppointmentQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in appointment type or notes
    pub search: Option<String>,
    pub patient_id: Option<Uuid>,
    pub dentist_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Only appointments starting at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only appointments starting before this instant
    pub to: Option<DateTime<Utc>>,
    /// Sort direction by start time (default: asc)
    #[serde(default = "asc")]
    pub sort: SortDirection,
}

fn asc() -> SortDirection {
    SortDirection::Asc
}

impl Paginated for AppointmentQueryParams {
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

    #[test]
    fn test_create_defaults_to_thirty_minutes() {
        let dto: CreateAppointmentDto = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "dentistId": Uuid::new_v4(),
            "startTime": "2025-03-10T04:30:00Z",
            "appointmentType": "Scaling"
        }))
        .unwrap();
        assert_eq!(dto.duration_minutes, 30);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_duration_bounds() {
        let mut dto: CreateAppointmentDto = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "dentistId": Uuid::new_v4(),
            "startTime": "2025-03-10T04:30:00Z",
            "appointmentType": "Root canal",
            "durationMinutes": 2
        }))
        .unwrap();
        assert!(dto.validate().is_err());
        dto.duration_minutes = 600;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_status_payload() {
        let dto: UpdateAppointmentStatusDto =
            serde_json::from_str(r#"{"status": "no_show"}"#).unwrap();
        assert_eq!(dto.status, AppointmentStatus::NoShow);
    }
}
