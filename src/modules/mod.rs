//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services (document storage).

pub mod storage;
