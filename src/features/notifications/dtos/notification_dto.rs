use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::UserRole;
use crate::features::notifications::models::{Notification, NotificationKind};
use crate::shared::types::{default_page, default_page_size, Paginated};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponseDto {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            link: n.link,
            is_read: n.is_read,
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountDto {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadDto {
    /// Notifications that changed from unread to read by this call
    pub updated: u64,
}

/// Admin broadcast to members of the organization
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastNotificationDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,

    #[serde(default)]
    pub kind: NotificationKind,

    #[validate(length(max = 500))]
    pub link: Option<String>,

    /// Only deliver to these roles (default: everyone)
    #[serde(default)]
    pub roles: Vec<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResultDto {
    pub recipients: u64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NotificationQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
    pub kind: Option<NotificationKind>,
}

impl Paginated for NotificationQueryParams {
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
    fn test_broadcast_defaults() {
        let dto: BroadcastNotificationDto = serde_json::from_str(
            r#"{"title": "Clinic closed", "message": "Closed on Monday for Diwali"}"#,
        )
        .unwrap();
        assert_eq!(dto.kind, NotificationKind::System);
        assert!(dto.roles.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_broadcast_role_filter() {
        let dto: BroadcastNotificationDto = serde_json::from_str(
            r#"{"title": "Staff meeting", "message": "5pm", "roles": ["dentist", "assistant"]}"#,
        )
        .unwrap();
        assert_eq!(dto.roles, vec![UserRole::Dentist, UserRole::Assistant]);
    }

    #[test]
    fn test_blank_title_rejected() {
        let dto = BroadcastNotificationDto {
            title: String::new(),
            message: "hello".to_string(),
            kind: NotificationKind::System,
            link: None,
            roles: vec![],
        };
        assert!(dto.validate().is_err());
    }
}
