//! Prescriptions. Only dentists and admins may write them.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PrescriptionService;
