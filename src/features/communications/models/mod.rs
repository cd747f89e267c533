mod communication;

pub use communication::*;
