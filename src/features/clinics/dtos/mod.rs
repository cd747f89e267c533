mod clinic_dto;

pub use clinic_dto::*;
