//! Clinic staff (dentists, hygienists, assistants, front desk).
//!
//! Staff records are separate from login accounts; a record may link to a
//! user so that appointment notifications reach them.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{find_dentist, StaffService};
