mod communication_dto;

pub use communication_dto::*;
