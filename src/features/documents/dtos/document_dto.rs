use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::documents::models::{Document, DocumentCategory};
use crate::shared::constants::DOCUMENT_DESCRIPTION_MAX;
use crate::shared::types::{default_page, default_page_size, Paginated};

/// MIME types accepted for patient documents
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/dicom",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

pub fn is_document_type_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_DOCUMENT_TYPES.contains(&essence.as_str())
}

/// Upload form for Swagger UI; the handler reads multipart fields directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// One of the document categories (default: other)
    #[schema(example = "lab_report")]
    pub category: Option<String>,
    /// Up to 500 characters
    pub description: Option<String>,
}

/// Metadata gathered from a multipart upload
#[derive(Debug, Clone, Validate)]
pub struct DocumentUpload {
    pub data: Vec<u8>,
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub original_name: String,
    pub content_type: String,
    pub category: DocumentCategory,
    #[validate(length(max = DOCUMENT_DESCRIPTION_MAX, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub checksum: String,
    pub category: DocumentCategory,
    pub description: Option<String>,
    pub uploaded_by: Uuid,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponseDto {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            patient_id: d.patient_id,
            clinic_id: d.clinic_id,
            filename: d.filename,
            original_name: d.original_name,
            file_type: d.file_type,
            file_size: d.file_size,
            checksum: d.checksum,
            category: d.category,
            description: d.description,
            uploaded_by: d.uploaded_by,
            is_archived: d.is_archived,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentDto {
    pub category: Option<DocumentCategory>,

    #[validate(length(max = DOCUMENT_DESCRIPTION_MAX, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Short-lived link to the stored file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDownloadDto {
    pub url: String,
    pub original_name: String,
    pub file_type: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DocumentQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    pub category: Option<DocumentCategory>,
    /// Return archived documents instead of active ones
    #[serde(default)]
    pub archived: bool,
}

impl Paginated for DocumentQueryParams {
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
    fn test_document_types() {
        assert!(is_document_type_allowed("application/pdf"));
        assert!(is_document_type_allowed("image/PNG"));
        assert!(is_document_type_allowed("text/plain; charset=utf-8"));
        assert!(!is_document_type_allowed("application/x-msdownload"));
    }

    #[test]
    fn test_description_is_bounded() {
        let ok = UpdateDocumentDto {
            category: Some(DocumentCategory::LabReport),
            description: Some("x".repeat(500)),
        };
        assert!(ok.validate().is_ok());

        let too_long = UpdateDocumentDto {
            category: None,
            description: Some("x".repeat(501)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&DocumentCategory::ConsentForm).unwrap();
        assert_eq!(json, "\"consent_form\"");
        assert!(serde_json::from_str::<DocumentCategory>("\"xray\"").is_err());
    }
}
