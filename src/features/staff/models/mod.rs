mod staff;

pub use staff::{Staff, StaffRole, STAFF_COLUMNS};
