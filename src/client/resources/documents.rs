use reqwest::multipart::{Form, Part};
use uuid::Uuid;

use crate::client::api::{ApiClient, ListQuery, Page};
use crate::client::error::{ClientError, ClientResult};
use crate::features::documents::dtos::{
    DocumentDownloadDto, DocumentResponseDto, UpdateDocumentDto,
};
use crate::features::documents::models::DocumentCategory;

/// A file picked for upload
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub category: DocumentCategory,
    pub description: Option<String>,
}

impl DocumentUpload {
    fn into_form(self) -> ClientResult<Form> {
        let file = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| ClientError::Decode(format!("Invalid content type: {}", e)))?;

        let category = serde_json::to_value(self.category)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "other".to_string());

        let mut form = Form::new().part("file", file).text("category", category);
        if let Some(description) = self.description {
            form = form.text("description", description);
        }
        Ok(form)
    }
}

pub struct DocumentsApi<'a> {
    api: &'a ApiClient,
    patient_id: Uuid,
}

impl ApiClient {
    /// Documents of one patient
    pub fn documents(&self, patient_id: Uuid) -> DocumentsApi<'_> {
        DocumentsApi {
            api: self,
            patient_id,
        }
    }
}

impl DocumentsApi<'_> {
    fn path(&self, suffix: &str) -> String {
        format!("/api/patients/{}/documents{}", self.patient_id, suffix)
    }

    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<DocumentResponseDto>> {
        self.api.get_page(&self.path(""), query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<DocumentResponseDto> {
        self.api.get(&self.path(&format!("/{}", id))).await
    }

    pub async fn upload(&self, upload: DocumentUpload) -> ClientResult<DocumentResponseDto> {
        self.api
            .post_multipart(&self.path(""), upload.into_form()?)
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdateDocumentDto,
    ) -> ClientResult<DocumentResponseDto> {
        self.api.put(&self.path(&format!("/{}", id)), dto).await
    }

    pub async fn archive(&self, id: Uuid) -> ClientResult<DocumentResponseDto> {
        self.api
            .delete_returning(&self.path(&format!("/{}", id)))
            .await
    }

    pub async fn restore(&self, id: Uuid) -> ClientResult<DocumentResponseDto> {
        self.api
            .post_empty(&self.path(&format!("/{}/restore", id)))
            .await
    }

    /// Short-lived download link
    pub async fn download(&self, id: Uuid) -> ClientResult<DocumentDownloadDto> {
        self.api
            .get(&self.path(&format!("/{}/download", id)))
            .await
    }
}
