use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

pub const INVOICE_COLUMNS: &str = "id, organization_id, clinic_id, patient_id, invoice_number, \
     issue_date, due_date, subtotal, discount_total, tax_total, total_amount, amount_paid, \
     payment_status, notes, created_by, created_at, updated_at";

pub const INVOICE_ITEM_COLUMNS: &str = "id, invoice_id, position, description, treatment_id, \
     quantity, unit_price, discount_percent, tax_percent, amount";

pub const PAYMENT_COLUMNS: &str =
    "id, invoice_id, amount, method, reference, paid_at, recorded_by, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partially Paid",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Overdue => "Overdue",
            PaymentStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Insurance,
}

/// Status implied by the amounts and due date; `cancelled` never changes.
pub fn derive_payment_status(
    current: PaymentStatus,
    total: Decimal,
    paid: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> PaymentStatus {
    if current == PaymentStatus::Cancelled {
        return PaymentStatus::Cancelled;
    }
    if paid >= total {
        PaymentStatus::Paid
    } else if paid > Decimal::ZERO {
        PaymentStatus::Partial
    } else if today > due_date {
        PaymentStatus::Overdue
    } else {
        PaymentStatus::Pending
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn balance_due(&self) -> Decimal {
        (self.total_amount - self.amount_paid).max(Decimal::ZERO)
    }

    /// Check against the locked row before editing; replacing items needs
    /// an invoice with nothing paid yet.
    pub fn ensure_editable(&self, replacing_items: bool) -> Result<()> {
        if self.payment_status == PaymentStatus::Cancelled {
            return Err(AppError::BadRequest(
                "Cancelled invoices cannot be edited".to_string(),
            ));
        }
        if replacing_items && self.amount_paid > Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Items cannot be changed after a payment has been recorded".to_string(),
            ));
        }
        Ok(())
    }

    /// Check against the locked row before cancelling
    pub fn ensure_cancellable(&self) -> Result<()> {
        if self.amount_paid > Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Invoices with recorded payments cannot be cancelled".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub treatment_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn status(total: i64, paid: i64, today: u32) -> PaymentStatus {
        derive_payment_status(
            PaymentStatus::Pending,
            Decimal::new(total, 0),
            Decimal::new(paid, 0),
            date(15),
            date(today),
        )
    }

    #[test]
    fn test_paid_when_fully_settled() {
        assert_eq!(status(1000, 1000, 10), PaymentStatus::Paid);
        assert_eq!(status(1000, 1000, 20), PaymentStatus::Paid);
    }

    #[test]
    fn test_partial_wins_over_overdue() {
        assert_eq!(status(1000, 400, 10), PaymentStatus::Partial);
        assert_eq!(status(1000, 400, 20), PaymentStatus::Partial);
    }

    #[test]
    fn test_unpaid_becomes_overdue_after_due_date() {
        assert_eq!(status(1000, 0, 15), PaymentStatus::Pending);
        assert_eq!(status(1000, 0, 16), PaymentStatus::Overdue);
    }

    #[test]
    fn test_zero_total_is_paid() {
        assert_eq!(status(0, 0, 10), PaymentStatus::Paid);
    }

    fn invoice(paid: i64, status: PaymentStatus) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            invoice_number: "INV-2025-00001".to_string(),
            issue_date: date(1),
            due_date: date(15),
            subtotal: Decimal::new(1000, 0),
            discount_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            total_amount: Decimal::new(1000, 0),
            amount_paid: Decimal::new(paid, 0),
            payment_status: status,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_paid_invoice_cannot_be_cancelled() {
        assert!(invoice(0, PaymentStatus::Pending).ensure_cancellable().is_ok());
        assert!(matches!(
            invoice(1, PaymentStatus::Partial).ensure_cancellable(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_items_frozen_after_payment() {
        let partial = invoice(400, PaymentStatus::Partial);
        assert!(partial.ensure_editable(false).is_ok());
        assert!(matches!(
            partial.ensure_editable(true),
            Err(AppError::BadRequest(_))
        ));
        assert!(invoice(0, PaymentStatus::Pending).ensure_editable(true).is_ok());
        assert!(invoice(0, PaymentStatus::Cancelled)
            .ensure_editable(false)
            .is_err());
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let s = derive_payment_status(
            PaymentStatus::Cancelled,
            Decimal::new(1000, 0),
            Decimal::new(1000, 0),
            date(15),
            date(10),
        );
        assert_eq!(s, PaymentStatus::Cancelled);
    }
}
