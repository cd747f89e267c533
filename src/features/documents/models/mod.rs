mod document;

pub use document::{Document, DocumentCategory, DOCUMENT_COLUMNS};
