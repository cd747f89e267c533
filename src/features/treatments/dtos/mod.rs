mod treatment_dto;
mod treatment_plan_dto;

pub use treatment_dto::*;
pub use treatment_plan_dto::*;
