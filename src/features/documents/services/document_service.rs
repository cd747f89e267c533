use std::sync::Arc;

use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    DocumentDownloadDto, DocumentQueryParams, DocumentResponseDto, DocumentUpload,
    UpdateDocumentDto,
};
use crate::features::documents::models::{Document, DOCUMENT_COLUMNS};
use crate::features::patients::patient_clinic;
use crate::modules::storage::ObjectStorage;
use crate::shared::scope::TenantScope;
use crate::shared::types::Paginated;

/// SHA-256 of `data`, hex encoded
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Strip any client-side directory components from an uploaded file name
pub fn sanitize_original_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() {
        "unnamed".to_string()
    } else {
        base.to_string()
    }
}

/// File extension for the stored object, preferring the MIME type
pub fn extension_for(content_type: &str, original_name: &str) -> String {
    let from_mime = match content_type.split(';').next().unwrap_or_default().trim() {
        "application/pdf" => Some("pdf"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "application/dicom" => Some("dcm"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        "text/plain" => Some("txt"),
        _ => None,
    };

    match from_mime {
        Some(ext) => ext.to_string(),
        None => original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8)
            .unwrap_or_else(|| "bin".to_string()),
    }
}

/// Service for patient documents
pub struct DocumentService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

impl DocumentService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { pool, storage }
    }

    /// Store the file then record its metadata against the patient
    pub async fn upload(
        &self,
        scope: &TenantScope,
        user: &AuthenticatedUser,
        patient_id: Uuid,
        upload: DocumentUpload,
    ) -> Result<DocumentResponseDto> {
        let clinic_id = patient_clinic(&self.pool, scope, patient_id).await?;

        let original_name = sanitize_original_name(&upload.original_name);
        let filename = format!(
            "{}.{}",
            Uuid::new_v4(),
            extension_for(&upload.content_type, &original_name)
        );
        let key = self
            .storage
            .key_for(&format!("patients/{}/{}", patient_id, filename));
        let file_size = upload.data.len() as i64;
        let digest = checksum(&upload.data);

        self.storage
            .put(&key, upload.data, &upload.content_type)
            .await?;
        debug!("Stored document object {}", key);

        let query = format!(
            r#"
            INSERT INTO documents (
                patient_id, filename, original_name, file_type, file_size, path, checksum,
                category, description, uploaded_by, clinic_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Document>(&query)
            .bind(patient_id)
            .bind(&filename)
            .bind(&original_name)
            .bind(&upload.content_type)
            .bind(file_size)
            .bind(&key)
            .bind(&digest)
            .bind(upload.category)
            .bind(upload.description)
            .bind(user.user_id)
            .bind(clinic_id)
            .fetch_one(&self.pool)
            .await;

        let document = match inserted {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Failed to save document metadata: {:?}", e);
                if let Err(cleanup) = self.storage.delete(&key).await {
                    warn!("Orphaned document object {}: {}", key, cleanup);
                }
                return Err(AppError::Database(e));
            }
        };

        info!(
            "Document uploaded: id={}, patient={}, size={}",
            document.id, patient_id, document.file_size
        );
        Ok(document.into())
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        patient_id: Uuid,
        params: &DocumentQueryParams,
    ) -> Result<(Vec<DocumentResponseDto>, i64)> {
        patient_clinic(&self.pool, scope, patient_id).await?;

        let filter = r#"
            WHERE patient_id = $1
              AND is_archived = $2
              AND ($3::document_category IS NULL OR category = $3)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM documents {}", filter))
            .bind(patient_id)
            .bind(params.archived)
            .bind(params.category)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count documents: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM documents {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            DOCUMENT_COLUMNS, filter
        );
        let documents = sqlx::query_as::<_, Document>(&query)
            .bind(patient_id)
            .bind(params.archived)
            .bind(params.category)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list documents: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((documents.into_iter().map(Into::into).collect(), total))
    }

    async fn find(&self, scope: &TenantScope, patient_id: Uuid, id: Uuid) -> Result<Document> {
        patient_clinic(&self.pool, scope, patient_id).await?;

        let query = format!(
            "SELECT {} FROM documents WHERE id = $1 AND patient_id = $2",
            DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get document {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }

    pub async fn get(
        &self,
        scope: &TenantScope,
        patient_id: Uuid,
        id: Uuid,
    ) -> Result<DocumentResponseDto> {
        Ok(self.find(scope, patient_id, id).await?.into())
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        patient_id: Uuid,
        id: Uuid,
        dto: UpdateDocumentDto,
    ) -> Result<DocumentResponseDto> {
        self.find(scope, patient_id, id).await?;

        let query = format!(
            r#"
            UPDATE documents SET
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND patient_id = $2
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(patient_id)
            .bind(dto.category)
            .bind(dto.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update document {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(document.into())
    }

    /// Archive or restore a document
    pub async fn set_archived(
        &self,
        scope: &TenantScope,
        patient_id: Uuid,
        id: Uuid,
        archived: bool,
    ) -> Result<DocumentResponseDto> {
        self.find(scope, patient_id, id).await?;

        let query = format!(
            r#"
            UPDATE documents SET is_archived = $3, updated_at = NOW()
            WHERE id = $1 AND patient_id = $2
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(patient_id)
            .bind(archived)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to archive document {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        info!("Document {} archived={}", id, archived);
        Ok(document.into())
    }

    /// Presigned link to the stored object
    pub async fn download(
        &self,
        scope: &TenantScope,
        patient_id: Uuid,
        id: Uuid,
    ) -> Result<DocumentDownloadDto> {
        let document = self.find(scope, patient_id, id).await?;
        let url = self.storage.presigned_url(&document.path).await?;

        Ok(DocumentDownloadDto {
            url,
            original_name: document.original_name,
            file_type: document.file_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_sha256_hex() {
        assert_eq!(
            checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sanitize_original_name() {
        assert_eq!(sanitize_original_name("C:\\scans\\opg.png"), "opg.png");
        assert_eq!(sanitize_original_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_original_name("  "), "unnamed");
        assert_eq!(sanitize_original_name("xray/"), "unnamed");
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("application/pdf", "report"), "pdf");
        assert_eq!(extension_for("image/jpeg", "photo.jpeg"), "jpg");
        assert_eq!(extension_for("application/octet-stream", "scan.STL"), "stl");
        assert_eq!(extension_for("application/octet-stream", "noext"), "bin");
    }
}
