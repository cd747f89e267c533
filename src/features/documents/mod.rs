//! Files attached to patient records.
//!
//! Uploads go to object storage under a private prefix; metadata (including a
//! SHA-256 checksum) lives in `documents`. Documents are archived and restored,
//! never deleted.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::DocumentService;
