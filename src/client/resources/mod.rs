//! Typed wrappers over the REST resources, one per feature.
//!
//! Each wrapper borrows the [`ApiClient`](crate::client::ApiClient) and maps
//! calls onto `/api/...` paths.

mod communications;
mod documents;
mod notifications;
mod patients;
mod prescriptions;
mod treatments;

pub use communications::CommunicationsApi;
pub use documents::{DocumentUpload, DocumentsApi};
pub use notifications::NotificationsApi;
pub use patients::{NewPatientForm, PatientsApi};
pub use prescriptions::PrescriptionsApi;
pub use treatments::{TreatmentPlansApi, TreatmentsApi};
