use uuid::Uuid;

use crate::client::api::{ApiClient, ListQuery, Page};
use crate::client::error::ClientResult;
use crate::features::prescriptions::dtos::{
    CreatePrescriptionDto, PrescriptionResponseDto, UpdatePrescriptionDto,
};

pub struct PrescriptionsApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn prescriptions(&self) -> PrescriptionsApi<'_> {
        PrescriptionsApi { api: self }
    }
}

impl PrescriptionsApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<PrescriptionResponseDto>> {
        self.api.get_page("/api/prescriptions", query).await
    }

    pub async fn for_patient(
        &self,
        patient_id: Uuid,
    ) -> ClientResult<Page<PrescriptionResponseDto>> {
        self.list(&ListQuery::new().filter("patient_id", patient_id))
            .await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<PrescriptionResponseDto> {
        self.api.get(&format!("/api/prescriptions/{}", id)).await
    }

    pub async fn create(
        &self,
        dto: &CreatePrescriptionDto,
    ) -> ClientResult<PrescriptionResponseDto> {
        self.api.post("/api/prescriptions", dto).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdatePrescriptionDto,
    ) -> ClientResult<PrescriptionResponseDto> {
        self.api
            .put(&format!("/api/prescriptions/{}", id), dto)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api
            .delete(&format!("/api/prescriptions/{}", id))
            .await
    }
}
