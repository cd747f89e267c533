//! Dashboard aggregates. Data only; charts are drawn by the client.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::ReportService;
