use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::billing::models::{
    Invoice, InvoiceItem, Payment, PaymentMethod, PaymentStatus,
};
use crate::shared::types::{default_page, default_page_size, Paginated, SortDirection};
use crate::shared::validation::{
    validate_money, validate_percent, validate_positive_money, validate_quantity,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemDto {
    pub id: Uuid,
    pub position: i32,
    pub description: String,
    pub treatment_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub discount_percent: Decimal,
    #[schema(value_type = String)]
    pub tax_percent: Decimal,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

impl From<InvoiceItem> for InvoiceItemDto {
    fn from(i: InvoiceItem) -> Self {
        Self {
            id: i.id,
            position: i.position,
            description: i.description,
            treatment_id: i.treatment_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
            discount_percent: i.discount_percent,
            tax_percent: i.tax_percent,
            amount: i.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponseDto {
    pub id: Uuid,
    pub invoice_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub recorded_by: Uuid,
}

impl From<Payment> for PaymentResponseDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            invoice_id: p.invoice_id,
            amount: p.amount,
            method: p.method,
            reference: p.reference,
            paid_at: p.paid_at,
            recorded_by: p.recorded_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponseDto {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub discount_total: Decimal,
    #[schema(value_type = String)]
    pub tax_total: Decimal,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    #[schema(value_type = String)]
    pub amount_paid: Decimal,
    #[schema(value_type = String)]
    pub balance_due: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    /// Present on single-invoice responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<InvoiceItemDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<PaymentResponseDto>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponseDto {
    fn from(i: Invoice) -> Self {
        Self {
            balance_due: i.balance_due(),
            id: i.id,
            clinic_id: i.clinic_id,
            patient_id: i.patient_id,
            invoice_number: i.invoice_number,
            issue_date: i.issue_date,
            due_date: i.due_date,
            subtotal: i.subtotal,
            discount_total: i.discount_total,
            tax_total: i.tax_total,
            total_amount: i.total_amount,
            amount_paid: i.amount_paid,
            payment_status: i.payment_status,
            notes: i.notes,
            items: None,
            payments: None,
            created_by: i.created_by,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

impl InvoiceResponseDto {
    pub fn with_details(invoice: Invoice, items: Vec<InvoiceItem>, payments: Vec<Payment>) -> Self {
        let mut dto = Self::from(invoice);
        dto.items = Some(items.into_iter().map(Into::into).collect());
        dto.payments = Some(payments.into_iter().map(Into::into).collect());
        dto
    }
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemInput {
    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: String,

    pub treatment_id: Option<Uuid>,

    #[serde(default = "default_quantity")]
    #[validate(custom(function = "validate_quantity"))]
    #[schema(value_type = String, example = "1")]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = String, example = "1500.00")]
    pub unit_price: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    #[schema(value_type = String, example = "0")]
    pub discount_percent: Decimal,

    /// Defaults to the organization's tax rate
    #[validate(custom(function = "validate_percent"))]
    #[schema(value_type = Option<String>, example = "18")]
    pub tax_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceDto {
    pub patient_id: Uuid,

    /// Defaults to today
    pub issue_date: Option<NaiveDate>,

    /// Defaults to issue date plus the organization's payment terms
    pub due_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "An invoice needs at least one item"), nested)]
    pub items: Vec<InvoiceItemInput>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceDto {
    pub due_date: Option<NaiveDate>,

    /// Replaces every item; only allowed before any payment
    #[validate(length(min = 1, message = "An invoice needs at least one item"), nested)]
    pub items: Option<Vec<InvoiceItemInput>>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentDto {
    #[validate(custom(function = "validate_positive_money"))]
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,

    pub method: PaymentMethod,

    #[validate(length(max = 100))]
    pub reference: Option<String>,

    /// Defaults to now
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct InvoiceQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Search in invoice number
    pub search: Option<String>,
    pub patient_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    /// Issued on or after
    pub from: Option<NaiveDate>,
    /// Issued on or before
    pub to: Option<NaiveDate>,
    /// Sort direction by issue date (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl Paginated for InvoiceQueryParams {
    fn page(&self) -> i64 {
        self.page
    }
    fn page_size(&self) -> i64 {
        self.page_size
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct InvoiceExportParams {
    pub status: Option<PaymentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults() {
        let item: InvoiceItemInput =
            serde_json::from_str(r#"{"description": "Scaling", "unitPrice": "1200"}"#).unwrap();
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.discount_percent, Decimal::ZERO);
        assert_eq!(item.tax_percent, None);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_item_bounds() {
        let item: InvoiceItemInput = serde_json::from_str(
            r#"{"description": "Scaling", "unitPrice": "1200", "quantity": 0, "discountPercent": 120}"#,
        )
        .unwrap();
        let errors = item.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
        assert!(errors.field_errors().contains_key("discount_percent"));
    }

    #[test]
    fn test_item_rejects_prices_beyond_storage() {
        let item: InvoiceItemInput = serde_json::from_str(
            r#"{"description": "Implant", "unitPrice": "79228162514264337593543950", "quantity": "10000"}"#,
        )
        .unwrap();
        let errors = item.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("unit_price"));

        let item: InvoiceItemInput = serde_json::from_str(
            r#"{"description": "Scaling", "unitPrice": "33.335", "quantity": "3"}"#,
        )
        .unwrap();
        let errors = item.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("unit_price"));
    }

    #[test]
    fn test_payment_below_one_paisa_rejected() {
        let dto: RecordPaymentDto =
            serde_json::from_str(r#"{"amount": "0.001", "method": "cash"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_payment_must_be_positive() {
        let dto: RecordPaymentDto =
            serde_json::from_str(r#"{"amount": "0", "method": "upi"}"#).unwrap();
        assert!(dto.validate().is_err());

        let dto: RecordPaymentDto =
            serde_json::from_str(r#"{"amount": "250.50", "method": "bank_transfer"}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.method, PaymentMethod::BankTransfer);
    }
}
