use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::communications::models::{
    Communication, CommunicationChannel, CommunicationStatus,
};
use crate::shared::types::{default_page, default_page_size, Paginated};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub channel: CommunicationChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub status: CommunicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Communication> for CommunicationResponseDto {
    fn from(c: Communication) -> Self {
        Self {
            id: c.id,
            clinic_id: c.clinic_id,
            patient_id: c.patient_id,
            channel: c.channel,
            subject: c.subject,
            message: c.message,
            status: c.status,
            scheduled_at: c.scheduled_at,
            sent_by: c.sent_by,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunicationDto {
    pub patient_id: Uuid,
    pub channel: CommunicationChannel,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,

    /// Leave empty to log the message as sent now
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Only scheduled messages can be edited
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommunicationDto {
    pub channel: Option<CommunicationChannel>,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: Option<String>,

    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CommunicationQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in subject or message
    pub search: Option<String>,
    pub patient_id: Option<Uuid>,
    pub channel: Option<CommunicationChannel>,
    pub status: Option<CommunicationStatus>,
}

impl Paginated for CommunicationQueryParams {
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
    fn test_create_deserializes_channel() {
        let dto: CreateCommunicationDto = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "channel": "whatsapp",
            "message": "Reminder: your cleaning is tomorrow at 10:30"
        }))
        .unwrap();
        assert_eq!(dto.channel, CommunicationChannel::Whatsapp);
        assert!(dto.scheduled_at.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_empty_message_rejected() {
        let dto = CreateCommunicationDto {
            patient_id: Uuid::new_v4(),
            channel: CommunicationChannel::Sms,
            subject: None,
            message: String::new(),
            scheduled_at: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let result: Result<CreateCommunicationDto, _> = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::new_v4(),
            "channel": "pigeon",
            "message": "Hello"
        }));
        assert!(result.is_err());
    }
}
