mod treatment_plan_service;
mod treatment_service;

pub use treatment_plan_service::{apply_catalog_defaults, TreatmentPlanService};
pub use treatment_service::TreatmentService;
