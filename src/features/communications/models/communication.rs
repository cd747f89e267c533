use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

pub const COMMUNICATION_COLUMNS: &str = "id, organization_id, clinic_id, patient_id, channel, subject, \
     message, status, scheduled_at, sent_by, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "communication_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommunicationChannel {
    Email,
    Sms,
    Whatsapp,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "communication_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStatus {
    Sent,
    Scheduled,
}

impl CommunicationStatus {
    /// Future send time means scheduled; none means sent now
    pub fn for_schedule(
        scheduled_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, &'static str> {
        match scheduled_at {
            None => Ok(Self::Sent),
            Some(at) if at > now => Ok(Self::Scheduled),
            Some(_) => Err("Scheduled time must be in the future"),
        }
    }
}

/// Email needs a subject line, the other channels do not
pub fn requires_subject(channel: CommunicationChannel) -> bool {
    channel == CommunicationChannel::Email
}

#[derive(Debug, Clone, FromRow)]
pub struct Communication {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub channel: CommunicationChannel,
    pub subject: Option<String>,
    pub message: String,
    pub status: CommunicationStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_for_schedule() {
        let now = Utc::now();
        assert_eq!(
            CommunicationStatus::for_schedule(None, now),
            Ok(CommunicationStatus::Sent)
        );
        assert_eq!(
            CommunicationStatus::for_schedule(Some(now + Duration::hours(2)), now),
            Ok(CommunicationStatus::Scheduled)
        );
        assert!(CommunicationStatus::for_schedule(Some(now - Duration::minutes(1)), now).is_err());
    }

    #[test]
    fn test_only_email_requires_subject() {
        assert!(requires_subject(CommunicationChannel::Email));
        assert!(!requires_subject(CommunicationChannel::Whatsapp));
        assert!(!requires_subject(CommunicationChannel::Sms));
    }
}
