use uuid::Uuid;

use crate::client::api::{ApiClient, ListQuery, Page};
use crate::client::error::ClientResult;
use crate::features::treatments::dtos::{
    CreateTreatmentDto, CreateTreatmentPlanDto, TreatmentPlanResponseDto, TreatmentResponseDto,
    UpdateTreatmentDto, UpdateTreatmentPlanDto,
};

/// Treatment catalog
pub struct TreatmentsApi<'a> {
    api: &'a ApiClient,
}

/// Per-patient treatment plans
pub struct TreatmentPlansApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn treatments(&self) -> TreatmentsApi<'_> {
        TreatmentsApi { api: self }
    }

    pub fn treatment_plans(&self) -> TreatmentPlansApi<'_> {
        TreatmentPlansApi { api: self }
    }
}

impl TreatmentsApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<TreatmentResponseDto>> {
        self.api.get_page("/api/treatments", query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<TreatmentResponseDto> {
        self.api.get(&format!("/api/treatments/{}", id)).await
    }

    pub async fn create(&self, dto: &CreateTreatmentDto) -> ClientResult<TreatmentResponseDto> {
        self.api.post("/api/treatments", dto).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdateTreatmentDto,
    ) -> ClientResult<TreatmentResponseDto> {
        self.api.put(&format!("/api/treatments/{}", id), dto).await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api.delete(&format!("/api/treatments/{}", id)).await
    }
}

impl TreatmentPlansApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<TreatmentPlanResponseDto>> {
        self.api.get_page("/api/treatment-plans", query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<TreatmentPlanResponseDto> {
        self.api.get(&format!("/api/treatment-plans/{}", id)).await
    }

    pub async fn create(
        &self,
        dto: &CreateTreatmentPlanDto,
    ) -> ClientResult<TreatmentPlanResponseDto> {
        self.api.post("/api/treatment-plans", dto).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdateTreatmentPlanDto,
    ) -> ClientResult<TreatmentPlanResponseDto> {
        self.api
            .put(&format!("/api/treatment-plans/{}", id), dto)
            .await
    }

    pub async fn cancel(&self, id: Uuid) -> ClientResult<()> {
        self.api
            .delete(&format!("/api/treatment-plans/{}", id))
            .await
    }
}
