//! Clinics (branches) of an organization.
//!
//! Any member can list clinics; only admins create, edit or deactivate them.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{resolve_clinic, ClinicService};
