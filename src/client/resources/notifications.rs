use uuid::Uuid;

use crate::client::api::{ApiClient, ListQuery, Page};
use crate::client::error::ClientResult;
use crate::features::notifications::dtos::{
    MarkAllReadDto, NotificationResponseDto, UnreadCountDto,
};

pub struct NotificationsApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi { api: self }
    }
}

impl NotificationsApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<NotificationResponseDto>> {
        self.api.get_page("/api/notifications", query).await
    }

    pub async fn unread_count(&self) -> ClientResult<i64> {
        let dto: UnreadCountDto = self.api.get("/api/notifications/unread-count").await?;
        Ok(dto.count)
    }

    pub async fn mark_read(&self, id: Uuid) -> ClientResult<NotificationResponseDto> {
        self.api
            .put_empty(&format!("/api/notifications/{}/read", id))
            .await
    }

    /// Returns how many notifications changed; zero on a repeat call
    pub async fn mark_all_read(&self) -> ClientResult<u64> {
        let dto: MarkAllReadDto = self.api.put_empty("/api/notifications/read-all").await?;
        Ok(dto.updated)
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api
            .delete(&format!("/api/notifications/{}", id))
            .await
    }
}
