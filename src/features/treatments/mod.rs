//! Treatment catalog and patient treatment plans.
//!
//! Plan totals are always recomputed from the plan lines.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{TreatmentPlanService, TreatmentService};
