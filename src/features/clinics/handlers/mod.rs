pub mod clinic_handler;

pub use clinic_handler::*;
