//! Invoice line and total arithmetic.
//!
//! `amount = (quantity × unit_price) × (1 − discount/100) × (1 + tax/100)`,
//! rounded half away from zero to two decimals. The invoice total is the sum
//! of the rounded line amounts.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::error::{AppError, Result};
use crate::shared::validation::max_money;

/// Round a money value to paise
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineInput {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineAmounts {
    /// quantity × unit price
    pub gross: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total_amount: Decimal,
}

fn too_large() -> AppError {
    AppError::BadRequest("Invoice amount is too large".to_string())
}

/// Rounded money that still fits the amount columns
fn money(value: Decimal) -> Result<Decimal> {
    let rounded = round_money(value);
    if rounded > max_money() {
        return Err(too_large());
    }
    Ok(rounded)
}

pub fn line_amounts(line: &LineInput) -> Result<LineAmounts> {
    let hundred = Decimal::ONE_HUNDRED;
    let keep = Decimal::ONE
        .checked_sub(line.discount_percent / hundred)
        .ok_or_else(too_large)?;
    let add = Decimal::ONE
        .checked_add(line.tax_percent / hundred)
        .ok_or_else(too_large)?;

    let gross = line
        .quantity
        .checked_mul(line.unit_price)
        .ok_or_else(too_large)?;
    let discounted = gross.checked_mul(keep).ok_or_else(too_large)?;
    let taxed = discounted.checked_mul(add).ok_or_else(too_large)?;

    Ok(LineAmounts {
        gross: money(gross)?,
        discount: money(gross.checked_sub(discounted).ok_or_else(too_large)?)?,
        tax: money(taxed.checked_sub(discounted).ok_or_else(too_large)?)?,
        amount: money(taxed)?,
    })
}

pub fn invoice_totals(lines: &[LineAmounts]) -> Result<InvoiceTotals> {
    let sum = |field: fn(&LineAmounts) -> Decimal| -> Result<Decimal> {
        let total = lines.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(field(line)).ok_or_else(too_large)
        })?;
        money(total)
    };

    Ok(InvoiceTotals {
        subtotal: sum(|l: &LineAmounts| l.gross)?,
        discount_total: sum(|l: &LineAmounts| l.discount)?,
        tax_total: sum(|l: &LineAmounts| l.tax)?,
        total_amount: sum(|l: &LineAmounts| l.amount)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(quantity: &str, price: &str, discount: &str, tax: &str) -> LineInput {
        LineInput {
            quantity: d(quantity),
            unit_price: d(price),
            discount_percent: d(discount),
            tax_percent: d(tax),
        }
    }

    #[test]
    fn test_plain_line() {
        let a = line_amounts(&line("2", "500", "0", "0")).unwrap();
        assert_eq!(a.gross, d("1000"));
        assert_eq!(a.amount, d("1000"));
        assert_eq!(a.discount, Decimal::ZERO);
        assert_eq!(a.tax, Decimal::ZERO);
    }

    #[test]
    fn test_discount_then_tax() {
        // 1000 less 10% = 900, plus 18% GST = 1062
        let a = line_amounts(&line("1", "1000", "10", "18")).unwrap();
        assert_eq!(a.discount, d("100"));
        assert_eq!(a.tax, d("162"));
        assert_eq!(a.amount, d("1062"));
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 10.01 less 50% = 5.005
        let a = line_amounts(&line("1", "10.01", "50", "0")).unwrap();
        assert_eq!(a.amount, d("5.01"));
        assert_eq!(a.discount, d("5.01"));
    }

    #[test]
    fn test_stored_inputs_reproduce_amount() {
        // two-decimal inputs survive NUMERIC(.., 2) unchanged, so pricing
        // the stored line again yields the stored amount
        let input = line("3", "33.34", "12.5", "18");
        let first = line_amounts(&input).unwrap();
        let stored = LineInput {
            quantity: input.quantity.round_dp(2),
            unit_price: input.unit_price.round_dp(2),
            discount_percent: input.discount_percent.round_dp(2),
            tax_percent: input.tax_percent.round_dp(2),
        };
        assert_eq!(line_amounts(&stored).unwrap(), first);
    }

    #[test]
    fn test_overflowing_line_is_bad_request() {
        let result = line_amounts(&line("10000", "79228162514264337593543950", "0", "0"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_amount_beyond_column_limit_is_bad_request() {
        // each input fits its column, the product does not
        let result = line_amounts(&line("99999999.99", "9999999999.99", "0", "0"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_total_is_sum_of_line_amounts() {
        let lines: Vec<LineAmounts> = [
            line("1", "4500", "5", "18"),
            line("2", "350.50", "0", "12"),
            line("1", "99.99", "12.5", "5"),
        ]
        .iter()
        .map(|l| line_amounts(l).unwrap())
        .collect();

        let totals = invoice_totals(&lines).unwrap();
        let sum: Decimal = lines.iter().map(|l| l.amount).sum();
        assert_eq!(totals.total_amount, sum);
        assert_eq!(totals.subtotal, d("5300.99"));
    }

    #[test]
    fn test_total_beyond_column_limit_is_bad_request() {
        let big = line_amounts(&line("1", "9999999999.99", "0", "0")).unwrap();
        assert!(matches!(
            invoice_totals(&[big, big]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_empty_invoice() {
        assert_eq!(invoice_totals(&[]).unwrap(), InvoiceTotals::default());
    }
}
