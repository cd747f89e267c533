//! Invoices, payments and invoice exports.

pub mod calculator;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod words;

pub use services::InvoiceService;
