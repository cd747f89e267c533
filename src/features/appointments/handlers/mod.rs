pub mod appointment_handler;

pub use appointment_handler::*;
