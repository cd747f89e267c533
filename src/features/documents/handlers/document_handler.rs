use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    is_document_type_allowed, DocumentDownloadDto, DocumentQueryParams, DocumentResponseDto,
    DocumentUpload, UpdateDocumentDto, UploadDocumentDto, ALLOWED_DOCUMENT_TYPES,
};
use crate::features::documents::models::DocumentCategory;
use crate::features::documents::services::DocumentService;
use crate::shared::constants::MAX_DOCUMENT_SIZE;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

fn parse_category(text: &str) -> Result<DocumentCategory> {
    serde_json::from_value(serde_json::Value::String(text.trim().to_string()))
        .map_err(|_| AppError::Validation(format!("Unknown document category '{}'", text)))
}

/// Collect the `file`, `category` and `description` fields of an upload form
async fn read_upload(mut multipart: Multipart) -> Result<DocumentUpload> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut category = DocumentCategory::default();
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file = Some((data.to_vec(), name, content_type));
            }
            "category" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read category field: {}", e))
                })?;
                if !text.trim().is_empty() {
                    category = parse_category(&text)?;
                }
            }
            "description" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read description field: {}", e))
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    description = Some(text.to_string());
                }
            }
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let (data, original_name, content_type) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }
    if data.len() > MAX_DOCUMENT_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_DOCUMENT_SIZE / 1024 / 1024
        )));
    }
    if !is_document_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_DOCUMENT_TYPES.join(", ")
        )));
    }

    let upload = DocumentUpload {
        data,
        original_name,
        content_type,
        category,
        description,
    };
    upload.validate()?;
    Ok(upload)
}

#[utoipa::path(
    post,
    path = "/api/patients/{patient_id}/documents",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body(content = UploadDocumentDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document uploaded", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Invalid file or field"),
        (status = 404, description = "Patient not found"),
        (status = 502, description = "Storage unavailable")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn upload_document(
    user: AuthenticatedUser,
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path(patient_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<DocumentResponseDto>>)> {
    let upload = read_upload(multipart).await?;
    let document = service.upload(&scope, &user, patient_id, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(document),
            Some("Document uploaded successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}/documents",
    params(("patient_id" = Uuid, Path, description = "Patient ID"), DocumentQueryParams),
    responses(
        (status = 200, description = "Documents retrieved", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 404, description = "Patient not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<DocumentQueryParams>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let (documents, total) = service.list(&scope, patient_id, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(documents),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}/documents/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = ApiResponse<DocumentResponseDto>),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path((patient_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let document = service.get(&scope, patient_id, id).await?;
    Ok(Json(ApiResponse::success(Some(document), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/patients/{patient_id}/documents/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Document ID")
    ),
    request_body = UpdateDocumentDto,
    responses(
        (status = 200, description = "Document updated", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn update_document(
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path((patient_id, id)): Path<(Uuid, Uuid)>,
    AppJson(dto): AppJson<UpdateDocumentDto>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    dto.validate()?;

    let document = service.update(&scope, patient_id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(document), None, None)))
}

/// Archive a document (documents are never hard-deleted)
#[utoipa::path(
    delete,
    path = "/api/patients/{patient_id}/documents/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document archived", body = ApiResponse<DocumentResponseDto>),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn archive_document(
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path((patient_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let document = service.set_archived(&scope, patient_id, id, true).await?;
    Ok(Json(ApiResponse::success(
        Some(document),
        Some("Document archived".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/patients/{patient_id}/documents/{id}/restore",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document restored", body = ApiResponse<DocumentResponseDto>),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn restore_document(
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path((patient_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let document = service.set_archived(&scope, patient_id, id, false).await?;
    Ok(Json(ApiResponse::success(
        Some(document),
        Some("Document restored".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}/documents/{id}/download",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Presigned download link", body = ApiResponse<DocumentDownloadDto>),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn download_document(
    scope: TenantScope,
    State(service): State<Arc<DocumentService>>,
    Path((patient_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DocumentDownloadDto>>> {
    let link = service.download(&scope, patient_id, id).await?;
    Ok(Json(ApiResponse::success(Some(link), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(
            parse_category(" lab_report ").unwrap(),
            DocumentCategory::LabReport
        );
        assert!(matches!(
            parse_category("x-ray"),
            Err(AppError::Validation(_))
        ));
    }
}
