//! Per-user notification inbox.
//!
//! Other features deliver notifications through [`notify`]; admins can
//! broadcast to the whole organization.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{notify, NotificationService};
