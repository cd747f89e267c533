pub mod appointments;
pub mod auth;
pub mod billing;
pub mod clinics;
pub mod communications;
pub mod documents;
pub mod notifications;
pub mod organizations;
pub mod patients;
pub mod prescriptions;
pub mod reports;
pub mod staff;
pub mod treatments;
pub mod users;
