use std::sync::OnceLock;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use super::{format_money, format_percent, InvoiceDocument, RenderError};
use crate::features::billing::words::amount_in_words;

const TEMPLATE_NAME: &str = "invoice.html.jinja";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        if let Err(e) = env.add_template(
            TEMPLATE_NAME,
            include_str!("../../../../templates/invoice/invoice.html.jinja"),
        ) {
            tracing::error!("Failed to load invoice template: {}", e);
        }
        env
    })
}

#[derive(Serialize)]
struct ItemView {
    description: String,
    quantity: String,
    unit_price: String,
    discount_percent: String,
    tax_percent: String,
    amount: String,
}

#[derive(Serialize)]
struct InvoiceView<'a> {
    organization_name: &'a str,
    clinic_name: &'a str,
    clinic_address: Option<&'a str>,
    clinic_phone: Option<&'a str>,
    patient_name: &'a str,
    patient_phone: Option<&'a str>,
    invoice_number: &'a str,
    issue_date: String,
    due_date: String,
    status: &'static str,
    currency: &'a str,
    items: Vec<ItemView>,
    subtotal: String,
    discount_total: String,
    tax_total: String,
    total_amount: String,
    amount_paid: String,
    balance_due: String,
    amount_in_words: String,
    notes: Option<&'a str>,
}

impl<'a> From<&'a InvoiceDocument> for InvoiceView<'a> {
    fn from(doc: &'a InvoiceDocument) -> Self {
        let invoice = &doc.invoice;
        Self {
            organization_name: &doc.organization_name,
            clinic_name: &doc.clinic_name,
            clinic_address: doc.clinic_address.as_deref(),
            clinic_phone: doc.clinic_phone.as_deref(),
            patient_name: &doc.patient_name,
            patient_phone: doc.patient_phone.as_deref(),
            invoice_number: &invoice.invoice_number,
            issue_date: invoice.issue_date.format("%d %b %Y").to_string(),
            due_date: invoice.due_date.format("%d %b %Y").to_string(),
            status: invoice.payment_status.label(),
            currency: &doc.currency,
            items: doc
                .items
                .iter()
                .map(|item| ItemView {
                    description: item.description.clone(),
                    quantity: format_percent(item.quantity),
                    unit_price: format_money(item.unit_price),
                    discount_percent: format_percent(item.discount_percent),
                    tax_percent: format_percent(item.tax_percent),
                    amount: format_money(item.amount),
                })
                .collect(),
            subtotal: format_money(invoice.subtotal),
            discount_total: format_money(invoice.discount_total),
            tax_total: format_money(invoice.tax_total),
            total_amount: format_money(invoice.total_amount),
            amount_paid: format_money(invoice.amount_paid),
            balance_due: format_money(invoice.balance_due()),
            amount_in_words: amount_in_words(invoice.total_amount),
            notes: invoice.notes.as_deref(),
        }
    }
}

/// Render the printable HTML invoice
pub fn invoice_html(doc: &InvoiceDocument) -> Result<String, RenderError> {
    let template = environment()
        .get_template(TEMPLATE_NAME)
        .map_err(|e| RenderError::Template(e.to_string()))?;

    template
        .render(InvoiceView::from(doc))
        .map_err(|e| RenderError::Template(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::billing::render::fixtures::{document, item};

    #[test]
    fn test_html_contains_invoice_details() {
        let html = invoice_html(&document(vec![item(0, "Root canal", 4500)])).unwrap();
        assert!(html.contains("INV-2025-00042"));
        assert!(html.contains("Root canal"));
        assert!(html.contains("4500.00"));
        assert!(html.contains("Four Thousand Five Hundred Rupees Only"));
        assert!(html.contains("10 Mar 2025"));
    }

    #[test]
    fn test_html_escapes_user_input() {
        let mut doc = document(vec![item(0, "<script>alert(1)</script>", 100)]);
        doc.patient_name = "Tom & Jerry".to_string();
        let html = invoice_html(&doc).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Tom &amp; Jerry"));
    }
}
