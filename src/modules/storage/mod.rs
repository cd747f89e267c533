//! Object storage for patient documents
//!
//! Documents are written to a MinIO/S3-compatible bucket and read back either
//! directly or via short-lived presigned URLs. Services depend on the
//! [`ObjectStorage`] trait so tests can swap in an in-memory store.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Operations the documents feature needs from a blob store
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, returning the key
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String, AppError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Temporary download URL for `key`
    async fn presigned_url(&self, key: &str) -> Result<String, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Full key for a path below the configured prefix
    fn key_for(&self, path: &str) -> String;
}
