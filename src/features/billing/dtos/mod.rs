mod invoice_dto;

pub use invoice_dto::*;
