//! Invoice exports: HTML (minijinja), paginated A4 PDF and CSV.

mod csv;
mod html;
mod pdf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::error::AppError;
use crate::features::billing::calculator::round_money;
use crate::features::billing::models::{Invoice, InvoiceItem};

pub use csv::{escape_csv, invoice_csv, invoices_csv, ExportRow};
pub use html::invoice_html;
pub use pdf::{invoice_pdf, slice_pages, PageLayout, INVOICE_LAYOUT};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render invoice template: {0}")]
    Template(String),

    #[error("Failed to build invoice PDF: {0}")]
    Pdf(String),
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Everything printed on an invoice
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub organization_name: String,
    pub clinic_name: String,
    pub clinic_address: Option<String>,
    pub clinic_phone: Option<String>,
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub currency: String,
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// `<invoiceNumber>_<YYYY-MM-DD>.<ext>`
pub fn file_name(invoice_number: &str, issue_date: NaiveDate, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        invoice_number,
        issue_date.format("%Y-%m-%d"),
        extension
    )
}

/// Two-decimal money string without currency symbol
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Percentages print without trailing zeros ("18", "12.5")
pub fn format_percent(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::InvoiceDocument;
    use crate::features::billing::models::{Invoice, InvoiceItem, PaymentStatus};

    pub fn item(position: i32, description: &str, amount: i64) -> InvoiceItem {
        InvoiceItem {
            id: Uuid::new_v4(),
            invoice_id: Uuid::nil(),
            position,
            description: description.to_string(),
            treatment_id: None,
            quantity: Decimal::ONE,
            unit_price: Decimal::new(amount, 0),
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
            amount: Decimal::new(amount, 0),
        }
    }

    pub fn document(items: Vec<InvoiceItem>) -> InvoiceDocument {
        let total: Decimal = items.iter().map(|i| i.amount).sum();
        InvoiceDocument {
            organization_name: "Smile Dental".to_string(),
            clinic_name: "Indiranagar".to_string(),
            clinic_address: Some("100 Feet Road, Bengaluru 560038".to_string()),
            clinic_phone: Some("9876543210".to_string()),
            patient_name: "Jane Doe".to_string(),
            patient_phone: Some("9123456780".to_string()),
            currency: "INR".to_string(),
            invoice: Invoice {
                id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                clinic_id: Uuid::new_v4(),
                patient_id: Uuid::new_v4(),
                invoice_number: "INV-2025-00042".to_string(),
                issue_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2025, 3, 25).unwrap(),
                subtotal: total,
                discount_total: Decimal::ZERO,
                tax_total: Decimal::ZERO,
                total_amount: total,
                amount_paid: Decimal::ZERO,
                payment_status: PaymentStatus::Pending,
                notes: None,
                created_by: Uuid::new_v4(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(
            file_name("INV-2025-00042", date, "pdf"),
            "INV-2025-00042_2025-03-07.pdf"
        );
    }

    #[test]
    fn test_money_and_percent_formatting() {
        assert_eq!(format_money(Decimal::new(1062, 0)), "1062.00");
        assert_eq!(format_money(Decimal::new(100005, 3)), "100.01");
        assert_eq!(format_percent(Decimal::new(1800, 2)), "18");
        assert_eq!(format_percent(Decimal::new(125, 1)), "12.5");
    }
}
