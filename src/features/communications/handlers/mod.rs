pub mod communication_handler;

pub use communication_handler::*;
