mod patient;

pub use patient::{Patient, PatientGender, PATIENT_COLUMNS};
