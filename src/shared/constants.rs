/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Header carrying the tenant filter: "all" or a clinic id
pub const CLINIC_SCOPE_HEADER: &str = "x-clinic-scope";

/// Textual form of the unscoped clinic filter
pub const CLINIC_SCOPE_ALL: &str = "all";

/// Maximum length of a document description
pub const DOCUMENT_DESCRIPTION_MAX: u64 = 500;

/// Maximum document upload size in bytes (10MB)
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Currency used when an organization has not configured one
pub const DEFAULT_CURRENCY: &str = "INR";

/// Invoice number prefix used when an organization has not configured one
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";
