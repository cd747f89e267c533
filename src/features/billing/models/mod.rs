mod invoice;

pub use invoice::*;
