mod treatment;
mod treatment_plan;

pub use treatment::*;
pub use treatment_plan::*;
