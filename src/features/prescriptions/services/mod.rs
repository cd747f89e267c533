mod prescription_service;

pub use prescription_service::PrescriptionService;
