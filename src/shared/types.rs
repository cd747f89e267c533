use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::validation::PINCODE_REGEX;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION & SORTING
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

pub fn default_page() -> i64 {
    1
}

pub fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Offset/limit arithmetic shared by every list query.
///
/// Pages are 1-indexed; page sizes are clamped to `1..=MAX_PAGE_SIZE`.
pub trait Paginated {
    fn page(&self) -> i64;
    fn page_size(&self) -> i64;

    fn limit(&self) -> i64 {
        self.page_size().clamp(1, MAX_PAGE_SIZE)
    }

    fn offset(&self) -> i64 {
        (self.page().max(1) - 1) * self.limit()
    }
}

/// Turn a free-text search into an ILIKE pattern, or None when blank
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")))
}

// =============================================================================
// ADDRESS
// =============================================================================

/// Postal address stored as JSONB on clinics, patients and organizations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(max = 255))]
    pub street: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(regex(path = *PINCODE_REGEX, message = "Pincode must be 6 digits"))]
    pub pincode: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Query {
        page: i64,
        page_size: i64,
    }

    impl Paginated for Query {
        fn page(&self) -> i64 {
            self.page
        }
        fn page_size(&self) -> i64 {
            self.page_size
        }
    }

    #[test]
    fn test_offset_and_limit() {
        let q = Query {
            page: 3,
            page_size: 20,
        };
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn test_limits_are_clamped() {
        let q = Query {
            page: 0,
            page_size: 10_000,
        };
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(Some(" Doe ")), Some("%Doe%".to_string()));
        assert_eq!(search_pattern(Some("50%")), Some("%50\\%%".to_string()));
    }

    #[test]
    fn test_address_pincode_validation() {
        let mut address = Address {
            city: Some("Kochi".to_string()),
            pincode: Some("682001".to_string()),
            ..Default::default()
        };
        assert!(address.validate().is_ok());

        address.pincode = Some("082001".to_string());
        assert!(address.validate().is_err());
    }

    #[test]
    fn test_address_uses_camel_case_keys() {
        let address: Address =
            serde_json::from_str(r#"{"street":"12 MG Road","pincode":"560001"}"#).unwrap();
        assert_eq!(address.street.as_deref(), Some("12 MG Road"));
        assert_eq!(address.country, None);
    }
}
