mod appointment;

pub use appointment::*;
