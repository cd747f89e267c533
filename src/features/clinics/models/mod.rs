mod clinic;

pub use clinic::{Clinic, CLINIC_COLUMNS};
