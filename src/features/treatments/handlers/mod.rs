pub mod treatment_handler;
pub mod treatment_plan_handler;

pub use treatment_handler::*;
pub use treatment_plan_handler::*;
