use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{format_money, format_percent, InvoiceDocument};
use crate::features::billing::models::PaymentStatus;
use crate::features::billing::words::amount_in_words;

/// Quote a field when it contains a comma, quote or line break
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn push_row(csv: &mut String, fields: &[String]) {
    let row: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
    csv.push_str(&row.join(","));
    csv.push('\n');
}

fn summary(csv: &mut String, label: &str, value: String) {
    push_row(
        csv,
        &[
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            label.to_string(),
            value,
        ],
    );
}

/// Header, one row per line item, then the summary rows
pub fn invoice_csv(doc: &InvoiceDocument) -> String {
    let invoice = &doc.invoice;
    let mut csv = String::new();

    push_row(
        &mut csv,
        &[
            "#",
            "Description",
            "Quantity",
            "Unit Price",
            "Discount %",
            "Tax %",
            "Amount",
        ]
        .map(str::to_string),
    );

    for (index, item) in doc.items.iter().enumerate() {
        push_row(
            &mut csv,
            &[
                (index + 1).to_string(),
                item.description.clone(),
                format_percent(item.quantity),
                format_money(item.unit_price),
                format_percent(item.discount_percent),
                format_percent(item.tax_percent),
                format_money(item.amount),
            ],
        );
    }

    summary(&mut csv, "Invoice Number", invoice.invoice_number.clone());
    summary(&mut csv, "Patient", doc.patient_name.clone());
    summary(
        &mut csv,
        "Issue Date",
        invoice.issue_date.format("%Y-%m-%d").to_string(),
    );
    summary(&mut csv, "Subtotal", format_money(invoice.subtotal));
    summary(&mut csv, "Discount", format_money(invoice.discount_total));
    summary(&mut csv, "Tax", format_money(invoice.tax_total));
    summary(
        &mut csv,
        &format!("Total ({})", doc.currency),
        format_money(invoice.total_amount),
    );
    summary(&mut csv, "Amount Paid", format_money(invoice.amount_paid));
    summary(&mut csv, "Balance Due", format_money(invoice.balance_due()));
    summary(&mut csv, "Amount in Words", amount_in_words(invoice.total_amount));

    csv
}

/// One line of the organization-wide export
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExportRow {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub patient_name: String,
    pub clinic_name: String,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
}

pub fn invoices_csv(rows: &[ExportRow]) -> String {
    let mut csv = String::new();
    push_row(
        &mut csv,
        &[
            "Invoice Number",
            "Issue Date",
            "Due Date",
            "Patient",
            "Clinic",
            "Total",
            "Paid",
            "Balance",
            "Status",
        ]
        .map(str::to_string),
    );

    for row in rows {
        push_row(
            &mut csv,
            &[
                row.invoice_number.clone(),
                row.issue_date.format("%Y-%m-%d").to_string(),
                row.due_date.format("%Y-%m-%d").to_string(),
                row.patient_name.clone(),
                row.clinic_name.clone(),
                format_money(row.total_amount),
                format_money(row.amount_paid),
                format_money((row.total_amount - row.amount_paid).max(Decimal::ZERO)),
                row.payment_status.label().to_string(),
            ],
        );
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::billing::render::fixtures::{document, item};

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("Crown, zirconia"), "\"Crown, zirconia\"");
        assert_eq!(escape_csv("5\" scaler tip"), "\"5\"\" scaler tip\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_invoice_csv_layout() {
        let doc = document(vec![item(0, "Scaling, polishing", 1200), item(1, "X-ray", 300)]);
        let csv = invoice_csv(&doc);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "#,Description,Quantity,Unit Price,Discount %,Tax %,Amount"
        );
        assert_eq!(lines[1], "1,\"Scaling, polishing\",1,1200.00,0,0,1200.00");
        assert_eq!(lines[2], "2,X-ray,1,300.00,0,0,300.00");
        assert!(lines.contains(&",,,,,Total (INR),1500.00"));
        assert!(lines.contains(&",,,,,Amount in Words,One Thousand Five Hundred Rupees Only"));
    }

    #[test]
    fn test_export_balance_never_negative() {
        let row = ExportRow {
            invoice_number: "INV-2025-00001".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
            patient_name: "Doe, Jane".to_string(),
            clinic_name: "Main".to_string(),
            total_amount: Decimal::new(500, 0),
            amount_paid: Decimal::new(500, 0),
            payment_status: PaymentStatus::Paid,
        };
        let csv = invoices_csv(&[row]);
        assert_eq!(
            csv.lines().nth(1),
            Some("INV-2025-00001,2025-01-02,2025-01-17,\"Doe, Jane\",Main,500.00,500.00,0.00,Paid")
        );
    }
}
