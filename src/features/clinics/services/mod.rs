mod clinic_service;

pub use clinic_service::{resolve_clinic, ClinicService};
