use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::billing::calculator::{
    invoice_totals, line_amounts, InvoiceTotals, LineAmounts, LineInput,
};
use crate::features::billing::dtos::{
    CreateInvoiceDto, InvoiceExportParams, InvoiceItemInput, InvoiceQueryParams,
    InvoiceResponseDto, PaymentResponseDto, RecordPaymentDto, UpdateInvoiceDto,
};
use crate::features::billing::models::{
    derive_payment_status, Invoice, InvoiceItem, Payment, PaymentStatus, INVOICE_COLUMNS,
    INVOICE_ITEM_COLUMNS, PAYMENT_COLUMNS,
};
use crate::features::billing::render::{
    file_name, invoice_csv, invoice_html, invoice_pdf, invoices_csv, ExportRow, InvoiceDocument,
};
use crate::features::patients::patient_clinic;
use crate::shared::constants::DEFAULT_CURRENCY;
use crate::shared::scope::TenantScope;
use crate::shared::types::{search_pattern, Address, Paginated};

/// `<prefix>-<year>-<seq:05>`, e.g. INV-2025-00042
pub fn format_invoice_number(prefix: &str, year: i32, seq: i32) -> String {
    format!("{}-{}-{:05}", prefix, year, seq)
}

/// An item ready to insert: input plus computed amounts
#[derive(Debug, Clone)]
pub struct PricedItem {
    pub description: String,
    pub treatment_id: Option<Uuid>,
    pub input: LineInput,
    pub amounts: LineAmounts,
}

/// A rendered export ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Price every item, filling missing tax rates with the organization default
pub fn price_items(
    items: Vec<InvoiceItemInput>,
    default_tax_percent: Decimal,
) -> Result<(Vec<PricedItem>, InvoiceTotals)> {
    let priced = items
        .into_iter()
        .map(|item| {
            let input = LineInput {
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount_percent: item.discount_percent,
                tax_percent: item.tax_percent.unwrap_or(default_tax_percent),
            };
            Ok(PricedItem {
                description: item.description.trim().to_string(),
                treatment_id: item.treatment_id,
                amounts: line_amounts(&input)?,
                input,
            })
        })
        .collect::<Result<Vec<PricedItem>>>()?;

    let amounts: Vec<LineAmounts> = priced.iter().map(|p| p.amounts).collect();
    let totals = invoice_totals(&amounts)?;
    Ok((priced, totals))
}

#[derive(Debug, FromRow)]
struct BillingSettings {
    currency: String,
    invoice_prefix: String,
    default_tax_percent: Decimal,
    payment_terms_days: i32,
}

#[derive(Debug, FromRow)]
struct DocumentHeader {
    organization_name: String,
    currency: Option<String>,
    clinic_name: String,
    clinic_phone: Option<String>,
    clinic_address: Option<sqlx::types::Json<Address>>,
    patient_name: String,
    patient_phone: Option<String>,
}

fn single_line(address: &Address) -> Option<String> {
    let parts: Vec<&str> = [
        &address.street,
        &address.city,
        &address.state,
        &address.pincode,
        &address.country,
    ]
    .into_iter()
    .filter_map(|p| p.as_deref())
    .filter(|p| !p.trim().is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Service for invoices, line items and payments
pub struct InvoiceService {
    pool: PgPool,
}

impl InvoiceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> Result<()> {
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit billing transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Re-read the invoice under a row lock so checks and writes see the
    /// same paid amount as concurrent payments
    async fn lock(tx: &mut Transaction<'static, Postgres>, id: Uuid) -> Result<Invoice> {
        let query = format!("SELECT {} FROM invoices WHERE id = $1 FOR UPDATE", INVOICE_COLUMNS);
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock invoice {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn settings(&self, org_id: Uuid) -> Result<BillingSettings> {
        sqlx::query(
            "INSERT INTO organization_settings (organization_id) VALUES ($1) ON CONFLICT DO NOTHING",
        )
        .bind(org_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialize billing settings: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query_as::<_, BillingSettings>(
            r#"
            SELECT currency, invoice_prefix, default_tax_percent, payment_terms_days
            FROM organization_settings WHERE organization_id = $1
            "#,
        )
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load billing settings: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Organization settings not found".to_string()))
    }

    /// Reserve the next number from the organization's counter
    async fn next_invoice_number(
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        year: i32,
    ) -> Result<String> {
        let (prefix, seq): (String, i32) = sqlx::query_as(
            r#"
            UPDATE organization_settings
            SET next_invoice_seq = next_invoice_seq + 1, updated_at = NOW()
            WHERE organization_id = $1
            RETURNING invoice_prefix, next_invoice_seq - 1
            "#,
        )
        .bind(org_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reserve invoice number: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Organization settings not found".to_string()))?;

        Ok(format_invoice_number(&prefix, year, seq))
    }

    async fn insert_items(
        tx: &mut Transaction<'static, Postgres>,
        invoice_id: Uuid,
        items: &[PricedItem],
    ) -> Result<Vec<InvoiceItem>> {
        let query = format!(
            r#"
            INSERT INTO invoice_items
                (invoice_id, position, description, treatment_id, quantity, unit_price,
                 discount_percent, tax_percent, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            INVOICE_ITEM_COLUMNS
        );

        let mut rows = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let row = sqlx::query_as::<_, InvoiceItem>(&query)
                .bind(invoice_id)
                .bind(position as i32)
                .bind(&item.description)
                .bind(item.treatment_id)
                .bind(item.input.quantity)
                .bind(item.input.unit_price)
                .bind(item.input.discount_percent)
                .bind(item.input.tax_percent)
                .bind(item.amounts.amount)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to insert invoice item: {:?}", e);
                    AppError::from_db(e, "Duplicate invoice item")
                })?;
            rows.push(row);
        }
        Ok(rows)
    }

    async fn ensure_treatments(&self, org_id: Uuid, items: &[InvoiceItemInput]) -> Result<()> {
        let mut ids: Vec<Uuid> = items.iter().filter_map(|i| i.treatment_id).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(());
        }

        let found: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM treatments WHERE organization_id = $1 AND id = ANY($2)",
        )
        .bind(org_id)
        .bind(&ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to verify invoice treatments: {:?}", e);
            AppError::Database(e)
        })?;

        if found != ids.len() as i64 {
            return Err(AppError::BadRequest(
                "Invoice references an unknown treatment".to_string(),
            ));
        }
        Ok(())
    }

    /// Pending invoices past their due date become overdue
    async fn refresh_overdue(&self, org_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE invoices SET payment_status = 'overdue', updated_at = NOW()
            WHERE organization_id = $1
              AND payment_status = 'pending'
              AND amount_paid = 0
              AND due_date < CURRENT_DATE
            "#,
        )
        .bind(org_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to refresh overdue invoices: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> Result<Invoice> {
        let query = format!(
            r#"
            SELECT {} FROM invoices
            WHERE id = $1 AND organization_id = $2
              AND ($3::uuid IS NULL OR clinic_id = $3)
            "#,
            INVOICE_COLUMNS
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch invoice {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
    }

    async fn items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>> {
        let query = format!(
            "SELECT {} FROM invoice_items WHERE invoice_id = $1 ORDER BY position",
            INVOICE_ITEM_COLUMNS
        );
        sqlx::query_as::<_, InvoiceItem>(&query)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load items of invoice {}: {:?}", invoice_id, e);
                AppError::Database(e)
            })
    }

    async fn payments(&self, invoice_id: Uuid) -> Result<Vec<Payment>> {
        let query = format!(
            "SELECT {} FROM payments WHERE invoice_id = $1 ORDER BY paid_at",
            PAYMENT_COLUMNS
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load payments of invoice {}: {:?}", invoice_id, e);
                AppError::Database(e)
            })
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &InvoiceQueryParams,
    ) -> Result<(Vec<InvoiceResponseDto>, i64)> {
        self.refresh_overdue(scope.organization_id).await?;

        let pattern = search_pattern(params.search.as_deref());
        let filter = r#"
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
              AND ($3::text IS NULL OR invoice_number ILIKE $3)
              AND ($4::uuid IS NULL OR patient_id = $4)
              AND ($5::payment_status IS NULL OR payment_status = $5)
              AND ($6::date IS NULL OR issue_date >= $6)
              AND ($7::date IS NULL OR issue_date <= $7)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM invoices {}", filter))
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.patient_id)
            .bind(params.status)
            .bind(params.from)
            .bind(params.to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count invoices: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM invoices {} ORDER BY issue_date {}, invoice_number {} LIMIT $8 OFFSET $9",
            INVOICE_COLUMNS,
            filter,
            params.sort.as_sql(),
            params.sort.as_sql()
        );
        let invoices = sqlx::query_as::<_, Invoice>(&query)
            .bind(scope.organization_id)
            .bind(scope.clinic_id())
            .bind(&pattern)
            .bind(params.patient_id)
            .bind(params.status)
            .bind(params.from)
            .bind(params.to)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list invoices: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((invoices.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<InvoiceResponseDto> {
        self.refresh_overdue(scope.organization_id).await?;

        let invoice = self.find(scope, id).await?;
        let items = self.items(id).await?;
        let payments = self.payments(id).await?;
        Ok(InvoiceResponseDto::with_details(invoice, items, payments))
    }

    /// Number, price and store an invoice with its items in one transaction
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        scope: &TenantScope,
        dto: CreateInvoiceDto,
    ) -> Result<InvoiceResponseDto> {
        let clinic_id = patient_clinic(&self.pool, scope, dto.patient_id).await?;
        self.ensure_treatments(scope.organization_id, &dto.items)
            .await?;

        let settings = self.settings(scope.organization_id).await?;
        let today = Utc::now().date_naive();
        let issue_date = dto.issue_date.unwrap_or(today);
        let due_date = dto.due_date.unwrap_or_else(|| {
            issue_date + Duration::days(i64::from(settings.payment_terms_days))
        });
        if due_date < issue_date {
            return Err(AppError::BadRequest(
                "Due date cannot be before the issue date".to_string(),
            ));
        }

        let (items, totals) = price_items(dto.items, settings.default_tax_percent)?;
        let status = derive_payment_status(
            PaymentStatus::Pending,
            totals.total_amount,
            Decimal::ZERO,
            due_date,
            today,
        );

        let mut tx = self.begin().await?;
        let invoice_number =
            Self::next_invoice_number(&mut tx, scope.organization_id, issue_date.year()).await?;

        let query = format!(
            r#"
            INSERT INTO invoices
                (organization_id, clinic_id, patient_id, invoice_number, issue_date, due_date,
                 subtotal, discount_total, tax_total, total_amount, payment_status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(scope.organization_id)
            .bind(clinic_id)
            .bind(dto.patient_id)
            .bind(&invoice_number)
            .bind(issue_date)
            .bind(due_date)
            .bind(totals.subtotal)
            .bind(totals.discount_total)
            .bind(totals.tax_total)
            .bind(totals.total_amount)
            .bind(status)
            .bind(dto.notes)
            .bind(user.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create invoice: {:?}", e);
                AppError::from_db(e, "Invoice number already in use")
            })?;

        let rows = Self::insert_items(&mut tx, invoice.id, &items).await?;
        Self::commit(tx).await?;

        tracing::info!(
            "Invoice {} created for {} {}",
            invoice.invoice_number,
            settings.currency,
            invoice.total_amount
        );
        Ok(InvoiceResponseDto::with_details(invoice, rows, vec![]))
    }

    /// Edit due date or notes; items may be replaced until a payment is recorded
    pub async fn update(
        &self,
        scope: &TenantScope,
        id: Uuid,
        dto: UpdateInvoiceDto,
    ) -> Result<InvoiceResponseDto> {
        let existing = self.find(scope, id).await?;
        existing.ensure_editable(dto.items.is_some())?;

        let due_date = dto.due_date.unwrap_or(existing.due_date);
        if due_date < existing.issue_date {
            return Err(AppError::BadRequest(
                "Due date cannot be before the issue date".to_string(),
            ));
        }

        let repriced = match dto.items {
            Some(items) => {
                self.ensure_treatments(scope.organization_id, &items)
                    .await?;
                let settings = self.settings(scope.organization_id).await?;
                Some(price_items(items, settings.default_tax_percent)?)
            }
            None => None,
        };

        let mut tx = self.begin().await?;
        let locked = Self::lock(&mut tx, id).await?;
        locked.ensure_editable(repriced.is_some())?;

        let totals = match &repriced {
            Some((_, totals)) => *totals,
            None => InvoiceTotals {
                subtotal: locked.subtotal,
                discount_total: locked.discount_total,
                tax_total: locked.tax_total,
                total_amount: locked.total_amount,
            },
        };
        let status = derive_payment_status(
            locked.payment_status,
            totals.total_amount,
            locked.amount_paid,
            due_date,
            Utc::now().date_naive(),
        );

        let query = format!(
            r#"
            UPDATE invoices SET
                due_date = $2,
                subtotal = $3,
                discount_total = $4,
                tax_total = $5,
                total_amount = $6,
                payment_status = $7,
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(due_date)
            .bind(totals.subtotal)
            .bind(totals.discount_total)
            .bind(totals.tax_total)
            .bind(totals.total_amount)
            .bind(status)
            .bind(dto.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update invoice {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if let Some((items, _)) = &repriced {
            sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to clear items of invoice {}: {:?}", id, e);
                    AppError::Database(e)
                })?;
            Self::insert_items(&mut tx, id, items).await?;
        }
        Self::commit(tx).await?;

        let items = self.items(id).await?;
        let payments = self.payments(id).await?;
        Ok(InvoiceResponseDto::with_details(invoice, items, payments))
    }

    /// Soft delete; invoices with payments must be settled instead
    pub async fn cancel(&self, scope: &TenantScope, id: Uuid) -> Result<()> {
        self.find(scope, id).await?.ensure_cancellable()?;

        let mut tx = self.begin().await?;
        let locked = Self::lock(&mut tx, id).await?;
        locked.ensure_cancellable()?;

        sqlx::query(
            r#"
            UPDATE invoices SET payment_status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to cancel invoice {}: {:?}", id, e);
            AppError::Database(e)
        })?;
        Self::commit(tx).await?;

        tracing::info!("Invoice {} cancelled", locked.invoice_number);
        Ok(())
    }

    /// Record a payment against the outstanding balance
    pub async fn record_payment(
        &self,
        user: &AuthenticatedUser,
        scope: &TenantScope,
        id: Uuid,
        dto: RecordPaymentDto,
    ) -> Result<InvoiceResponseDto> {
        self.find(scope, id).await?;

        let mut tx = self.begin().await?;
        let invoice = Self::lock(&mut tx, id).await?;

        match invoice.payment_status {
            PaymentStatus::Cancelled => {
                return Err(AppError::BadRequest(
                    "Cannot record a payment on a cancelled invoice".to_string(),
                ))
            }
            PaymentStatus::Paid => {
                return Err(AppError::BadRequest(
                    "Invoice is already fully paid".to_string(),
                ))
            }
            _ => {}
        }

        let balance = invoice.balance_due();
        if dto.amount > balance {
            return Err(AppError::BadRequest(format!(
                "Payment exceeds the outstanding balance of {:.2}",
                balance
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO payments (invoice_id, amount, method, reference, paid_at, recorded_by)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6)
            "#,
        )
        .bind(id)
        .bind(dto.amount)
        .bind(dto.method)
        .bind(dto.reference)
        .bind(dto.paid_at)
        .bind(user.user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record payment on invoice {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        let amount_paid = invoice.amount_paid + dto.amount;
        let status = derive_payment_status(
            invoice.payment_status,
            invoice.total_amount,
            amount_paid,
            invoice.due_date,
            Utc::now().date_naive(),
        );

        let query = format!(
            r#"
            UPDATE invoices SET amount_paid = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(amount_paid)
            .bind(status)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update paid amount of invoice {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Self::commit(tx).await?;

        tracing::info!(
            "Payment of {} recorded on invoice {} ({:?})",
            dto.amount,
            invoice.invoice_number,
            invoice.payment_status
        );

        let items = self.items(id).await?;
        let payments = self.payments(id).await?;
        Ok(InvoiceResponseDto::with_details(invoice, items, payments))
    }

    pub async fn list_payments(
        &self,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<Vec<PaymentResponseDto>> {
        self.find(scope, id).await?;
        Ok(self
            .payments(id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Invoice with the letterhead and patient details needed for exports
    pub async fn document(&self, scope: &TenantScope, id: Uuid) -> Result<InvoiceDocument> {
        let invoice = self.find(scope, id).await?;
        let items = self.items(id).await?;

        let header = sqlx::query_as::<_, DocumentHeader>(
            r#"
            SELECT o.name AS organization_name, s.currency,
                   c.name AS clinic_name, c.phone AS clinic_phone, c.address AS clinic_address,
                   p.name AS patient_name, p.phone AS patient_phone
            FROM invoices i
            JOIN organizations o ON o.id = i.organization_id
            LEFT JOIN organization_settings s ON s.organization_id = i.organization_id
            JOIN clinics c ON c.id = i.clinic_id
            JOIN patients p ON p.id = i.patient_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load invoice {} letterhead: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(InvoiceDocument {
            organization_name: header.organization_name,
            clinic_name: header.clinic_name,
            clinic_address: header.clinic_address.as_ref().and_then(|a| single_line(a)),
            clinic_phone: header.clinic_phone,
            patient_name: header.patient_name,
            patient_phone: header.patient_phone,
            currency: header
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            invoice,
            items,
        })
    }

    pub async fn pdf(&self, scope: &TenantScope, id: Uuid) -> Result<RenderedFile> {
        let doc = self.document(scope, id).await?;
        let name = file_name(&doc.invoice.invoice_number, doc.invoice.issue_date, "pdf");

        let body = tokio::task::spawn_blocking(move || invoice_pdf(&doc))
            .await
            .map_err(|e| AppError::Internal(format!("PDF rendering task failed: {}", e)))??;

        Ok(RenderedFile {
            file_name: name,
            content_type: "application/pdf",
            body,
        })
    }

    pub async fn csv(&self, scope: &TenantScope, id: Uuid) -> Result<RenderedFile> {
        let doc = self.document(scope, id).await?;
        Ok(RenderedFile {
            file_name: file_name(&doc.invoice.invoice_number, doc.invoice.issue_date, "csv"),
            content_type: "text/csv; charset=utf-8",
            body: invoice_csv(&doc).into_bytes(),
        })
    }

    pub async fn html(&self, scope: &TenantScope, id: Uuid) -> Result<RenderedFile> {
        let doc = self.document(scope, id).await?;
        Ok(RenderedFile {
            file_name: file_name(&doc.invoice.invoice_number, doc.invoice.issue_date, "html"),
            content_type: "text/html; charset=utf-8",
            body: invoice_html(&doc)?.into_bytes(),
        })
    }

    /// Organization-wide invoice register as CSV
    pub async fn export(
        &self,
        scope: &TenantScope,
        params: &InvoiceExportParams,
    ) -> Result<RenderedFile> {
        let rows = self.export_rows(scope, params).await?;
        tracing::info!("Exporting {} invoices", rows.len());

        Ok(RenderedFile {
            file_name: format!("invoices_{}.csv", Utc::now().date_naive().format("%Y-%m-%d")),
            content_type: "text/csv; charset=utf-8",
            body: invoices_csv(&rows).into_bytes(),
        })
    }

    /// Rows for the organization-wide CSV export
    async fn export_rows(
        &self,
        scope: &TenantScope,
        params: &InvoiceExportParams,
    ) -> Result<Vec<ExportRow>> {
        self.refresh_overdue(scope.organization_id).await?;

        sqlx::query_as::<_, ExportRow>(
            r#"
            SELECT i.invoice_number, i.issue_date, i.due_date,
                   p.name AS patient_name, c.name AS clinic_name,
                   i.total_amount, i.amount_paid, i.payment_status
            FROM invoices i
            JOIN patients p ON p.id = i.patient_id
            JOIN clinics c ON c.id = i.clinic_id
            WHERE i.organization_id = $1
              AND ($2::uuid IS NULL OR i.clinic_id = $2)
              AND ($3::payment_status IS NULL OR i.payment_status = $3)
              AND ($4::date IS NULL OR i.issue_date >= $4)
              AND ($5::date IS NULL OR i.issue_date <= $5)
            ORDER BY i.issue_date, i.invoice_number
            "#,
        )
        .bind(scope.organization_id)
        .bind(scope.clinic_id())
        .bind(params.status)
        .bind(params.from)
        .bind(params.to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to export invoices: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(price: &str, tax: Option<&str>) -> InvoiceItemInput {
        InvoiceItemInput {
            description: "  Composite filling ".to_string(),
            treatment_id: None,
            quantity: Decimal::ONE,
            unit_price: d(price),
            discount_percent: Decimal::ZERO,
            tax_percent: tax.map(d),
        }
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(format_invoice_number("INV", 2025, 42), "INV-2025-00042");
        assert_eq!(format_invoice_number("SDC", 2026, 123456), "SDC-2026-123456");
    }

    #[test]
    fn test_price_items_uses_default_tax() {
        let (items, totals) =
            price_items(vec![input("1000", None), input("500", Some("0"))], d("18")).unwrap();

        assert_eq!(items[0].input.tax_percent, d("18"));
        assert_eq!(items[0].amounts.amount, d("1180"));
        assert_eq!(items[1].amounts.amount, d("500"));
        assert_eq!(items[0].description, "Composite filling");
        assert_eq!(totals.subtotal, d("1500"));
        assert_eq!(totals.tax_total, d("180"));
        assert_eq!(totals.total_amount, d("1680"));
    }

    #[test]
    fn test_price_items_rejects_overflow() {
        let mut huge = input("79228162514264337593543950", Some("0"));
        huge.quantity = d("10000");
        let result = price_items(vec![input("1000", None), huge], d("18"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_single_line_address() {
        let address = Address {
            street: Some("12 MG Road".to_string()),
            city: Some("Pune".to_string()),
            state: None,
            pincode: Some("411001".to_string()),
            country: Some(" ".to_string()),
        };
        assert_eq!(
            single_line(&address).as_deref(),
            Some("12 MG Road, Pune, 411001")
        );
        assert_eq!(single_line(&Address::default()), None);
    }
}
