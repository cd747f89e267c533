use uuid::Uuid;

use crate::client::api::{ApiClient, ListQuery, Page};
use crate::client::error::ClientResult;
use crate::features::communications::dtos::{
    CommunicationResponseDto, CreateCommunicationDto, UpdateCommunicationDto,
};

pub struct CommunicationsApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn communications(&self) -> CommunicationsApi<'_> {
        CommunicationsApi { api: self }
    }
}

impl CommunicationsApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<CommunicationResponseDto>> {
        self.api.get_page("/api/communications", query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<CommunicationResponseDto> {
        self.api.get(&format!("/api/communications/{}", id)).await
    }

    /// Log a sent message, or schedule one when `scheduled_at` is in the future
    pub async fn create(
        &self,
        dto: &CreateCommunicationDto,
    ) -> ClientResult<CommunicationResponseDto> {
        self.api.post("/api/communications", dto).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdateCommunicationDto,
    ) -> ClientResult<CommunicationResponseDto> {
        self.api
            .put(&format!("/api/communications/{}", id), dto)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api
            .delete(&format!("/api/communications/{}", id))
            .await
    }
}
