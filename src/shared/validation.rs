use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Regex for validating code fields (organization code, invoice prefix, etc.)
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "smile-dental", "org123", "my-org-name"
    /// - Invalid: "-org", "org-", "org--name", "Org", "org_name"
    pub static ref CODE_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Indian mobile number: 10 digits starting with 6-9
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();

    /// Indian postal code: 6 digits, first digit non-zero
    pub static ref PINCODE_REGEX: Regex = Regex::new(r"^[1-9]\d{5}$").unwrap();

    /// Invoice prefix: 2-10 uppercase letters or digits
    pub static ref INVOICE_PREFIX_REGEX: Regex = Regex::new(r"^[A-Z0-9]{2,10}$").unwrap();

    /// ISO 4217 currency code
    pub static ref CURRENCY_REGEX: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();

    /// FDI tooth notation (11-18, 21-28, 31-38, 41-48, primary 51-85)
    pub static ref TOOTH_NUMBER_REGEX: Regex =
        Regex::new(r"^(?:[1-4][1-8]|[5-8][1-5])$").unwrap();
}

/// Largest value a `NUMERIC(12, 2)` money column holds
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Largest value a `NUMERIC(10, 2)` quantity column holds
pub fn max_quantity() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Postgres stores these columns at two decimals; finer input would be
/// rounded on insert and no longer match the computed amounts.
fn has_two_decimals(value: &Decimal) -> bool {
    value.normalize().scale() <= 2
}

fn two_decimals(value: &Decimal) -> Result<(), ValidationError> {
    if !has_two_decimals(value) {
        return Err(ValidationError::new("precision")
            .with_message("At most two decimal places are allowed".into()));
    }
    Ok(())
}

/// Money amounts may be zero but never negative or beyond the column limit
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative")
            .with_message("Amount must not be negative".into()));
    }
    if *value > max_money() {
        return Err(ValidationError::new("too_large")
            .with_message("Amount is too large".into()));
    }
    two_decimals(value)
}

/// Payments must move money
pub fn validate_positive_money(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("amount")
            .with_message("Amount must be greater than zero".into()));
    }
    validate_money(value)
}

pub fn validate_quantity(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("quantity")
            .with_message("Quantity must be greater than zero".into()));
    }
    if *value > max_quantity() {
        return Err(ValidationError::new("too_large")
            .with_message("Quantity is too large".into()));
    }
    two_decimals(value)
}

/// Percentages (discount, tax) between 0 and 100 inclusive
pub fn validate_percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percent")
            .with_message("Percentage must be between 0 and 100".into()));
    }
    two_decimals(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_regex() {
        assert!(CURRENCY_REGEX.is_match("INR"));
        assert!(!CURRENCY_REGEX.is_match("inr"));
        assert!(!CURRENCY_REGEX.is_match("RUPEE"));
    }

    #[test]
    fn test_code_regex_valid() {
        assert!(CODE_REGEX.is_match("smile-dental"));
        assert!(CODE_REGEX.is_match("org123"));
        assert!(CODE_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_code_regex_invalid() {
        assert!(!CODE_REGEX.is_match("-org")); // starts with hyphen
        assert!(!CODE_REGEX.is_match("org-")); // ends with hyphen
        assert!(!CODE_REGEX.is_match("org--name")); // double hyphen
        assert!(!CODE_REGEX.is_match("Org")); // uppercase
        assert!(!CODE_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("9876543210"));
        assert!(PHONE_REGEX.is_match("6000000000"));
        assert!(!PHONE_REGEX.is_match("987654321")); // 9 digits
        assert!(!PHONE_REGEX.is_match("98765432100")); // 11 digits
        assert!(!PHONE_REGEX.is_match("5876543210")); // starts with 5
        assert!(!PHONE_REGEX.is_match("98765-43210"));
    }

    #[test]
    fn test_pincode_regex() {
        assert!(PINCODE_REGEX.is_match("560001"));
        assert!(!PINCODE_REGEX.is_match("060001"));
        assert!(!PINCODE_REGEX.is_match("56001"));
    }

    #[test]
    fn test_tooth_number_regex() {
        assert!(TOOTH_NUMBER_REGEX.is_match("11"));
        assert!(TOOTH_NUMBER_REGEX.is_match("48"));
        assert!(TOOTH_NUMBER_REGEX.is_match("85"));
        assert!(!TOOTH_NUMBER_REGEX.is_match("19"));
        assert!(!TOOTH_NUMBER_REGEX.is_match("49"));
        assert!(!TOOTH_NUMBER_REGEX.is_match("86"));
    }

    #[test]
    fn test_money_validators() {
        assert!(validate_money(&Decimal::ZERO).is_ok());
        assert!(validate_money(&Decimal::new(1050, 2)).is_ok());
        assert!(validate_money(&Decimal::new(-1, 2)).is_err());
        assert!(validate_money(&max_money()).is_ok());
        assert!(validate_money(&Decimal::new(1_000_000_000_000, 2)).is_err());

        assert!(validate_percent(&Decimal::new(18, 0)).is_ok());
        assert!(validate_percent(&Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percent(&Decimal::new(1001, 1)).is_err());
        assert!(validate_percent(&Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn test_values_finer_than_paise_rejected() {
        // 33.335 would be stored as 33.34
        assert!(validate_money(&Decimal::new(33335, 3)).is_err());
        // trailing zeros are fine
        assert!(validate_money(&Decimal::new(33340, 3)).is_ok());
        assert!(validate_quantity(&Decimal::new(1005, 3)).is_err());
        assert!(validate_percent(&Decimal::new(12125, 3)).is_err());
    }

    #[test]
    fn test_positive_money() {
        assert!(validate_positive_money(&Decimal::new(50000, 2)).is_ok());
        assert!(validate_positive_money(&Decimal::ZERO).is_err());
        // would round to 0.00 and break the payments check
        assert!(validate_positive_money(&Decimal::new(1, 3)).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(&Decimal::ONE).is_ok());
        assert!(validate_quantity(&Decimal::new(25, 1)).is_ok());
        assert!(validate_quantity(&Decimal::ZERO).is_err());
        assert!(validate_quantity(&Decimal::new(10_000_000_000, 2)).is_err());
    }
}
