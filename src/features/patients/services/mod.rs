mod patient_service;

pub use patient_service::{patient_clinic, PatientService};
