//! Patient records, filtered by organization and clinic scope.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{patient_clinic, PatientService};
