mod prescription;

pub use prescription::*;
