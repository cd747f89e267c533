//! Amounts in words using the Indian numbering system.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::features::billing::calculator::round_money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

/// Words for a whole number, e.g. 1_25_000 → "One Lakh Twenty Five Thousand"
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let crore = n / 1_00_00_000;
    let lakh = (n / 1_00_000) % 100;
    let thousand = (n / 1_000) % 100;
    let rest = n % 1_000;

    let mut parts = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", number_to_words(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// "<words> Rupees and <words> Paise Only"; whole amounts drop the paise part
pub fn amount_in_words(amount: Decimal) -> String {
    let amount = round_money(amount.abs());
    let rupees = amount.trunc();
    let paise = ((amount - rupees) * Decimal::ONE_HUNDRED)
        .to_u64()
        .unwrap_or(0);
    let rupees = rupees.to_u64().unwrap_or(0);

    if paise == 0 {
        format!("{} Rupees Only", number_to_words(rupees))
    } else {
        format!(
            "{} Rupees and {} Paise Only",
            number_to_words(rupees),
            number_to_words(paise)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_small_numbers() {
        assert_eq!(number_to_words(7), "Seven");
        assert_eq!(number_to_words(15), "Fifteen");
        assert_eq!(number_to_words(40), "Forty");
        assert_eq!(number_to_words(99), "Ninety Nine");
        assert_eq!(number_to_words(100), "One Hundred");
        assert_eq!(number_to_words(305), "Three Hundred Five");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(number_to_words(1_000), "One Thousand");
        assert_eq!(
            number_to_words(1_25_450),
            "One Lakh Twenty Five Thousand Four Hundred Fifty"
        );
        assert_eq!(number_to_words(10_00_000), "Ten Lakh");
        assert_eq!(
            number_to_words(2_03_00_001),
            "Two Crore Three Lakh One"
        );
        assert_eq!(
            number_to_words(150_00_00_000),
            "One Hundred Fifty Crore"
        );
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(amount_in_words(Decimal::ZERO), "Zero Rupees Only");
        assert_eq!(
            amount_in_words(Decimal::from_str("1062").unwrap()),
            "One Thousand Sixty Two Rupees Only"
        );
        assert_eq!(
            amount_in_words(Decimal::from_str("1234.50").unwrap()),
            "One Thousand Two Hundred Thirty Four Rupees and Fifty Paise Only"
        );
        assert_eq!(
            amount_in_words(Decimal::from_str("0.05").unwrap()),
            "Zero Rupees and Five Paise Only"
        );
    }
}
