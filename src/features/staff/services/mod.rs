mod staff_service;

pub use staff_service::{find_dentist, StaffService};
