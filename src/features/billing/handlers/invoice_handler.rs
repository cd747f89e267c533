use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::billing::dtos::{
    CreateInvoiceDto, InvoiceExportParams, InvoiceQueryParams, InvoiceResponseDto,
    PaymentResponseDto, RecordPaymentDto, UpdateInvoiceDto,
};
use crate::features::billing::services::{InvoiceService, RenderedFile};
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

fn attachment(file: RenderedFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.body,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/billing",
    params(InvoiceQueryParams),
    responses(
        (status = 200, description = "Invoices retrieved", body = ApiResponse<Vec<InvoiceResponseDto>>)
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn list_invoices(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Query(params): Query<InvoiceQueryParams>,
) -> Result<Json<ApiResponse<Vec<InvoiceResponseDto>>>> {
    let (invoices, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(invoices),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/billing/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice with items and payments", body = ApiResponse<InvoiceResponseDto>),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn get_invoice(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceResponseDto>>> {
    let invoice = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(invoice), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/billing",
    request_body = CreateInvoiceDto,
    responses(
        (status = 201, description = "Invoice created", body = ApiResponse<InvoiceResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Patient not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn create_invoice(
    user: AuthenticatedUser,
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    AppJson(dto): AppJson<CreateInvoiceDto>,
) -> Result<(StatusCode, Json<ApiResponse<InvoiceResponseDto>>)> {
    dto.validate()?;

    let invoice = service.create(&user, &scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(invoice),
            Some("Invoice created".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/billing/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceDto,
    responses(
        (status = 200, description = "Invoice updated", body = ApiResponse<InvoiceResponseDto>),
        (status = 400, description = "Invoice is cancelled or already paid into"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn update_invoice(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateInvoiceDto>,
) -> Result<Json<ApiResponse<InvoiceResponseDto>>> {
    dto.validate()?;

    let invoice = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(invoice), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/billing/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice cancelled"),
        (status = 400, description = "Invoice has payments"),
        (status = 403, description = "Organization admin access required")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn cancel_invoice(
    _admin: RequireAdmin,
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.cancel(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Invoice cancelled".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/billing/{id}/payments",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Payments retrieved", body = ApiResponse<Vec<PaymentResponseDto>>),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PaymentResponseDto>>>> {
    let payments = service.list_payments(&scope, id).await?;
    let total = payments.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(payments),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/billing/{id}/payments",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = RecordPaymentDto,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<InvoiceResponseDto>),
        (status = 400, description = "Overpayment, cancelled or settled invoice"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    user: AuthenticatedUser,
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RecordPaymentDto>,
) -> Result<(StatusCode, Json<ApiResponse<InvoiceResponseDto>>)> {
    dto.validate()?;

    let invoice = service.record_payment(&user, &scope, id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(invoice),
            Some("Payment recorded".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/billing/{id}/pdf",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice PDF", content_type = "application/pdf"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn download_pdf(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    Ok(attachment(service.pdf(&scope, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/billing/{id}/csv",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice CSV", content_type = "text/csv"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn download_csv(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    Ok(attachment(service.csv(&scope, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/billing/{id}/html",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Printable HTML invoice", content_type = "text/html"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn download_html(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    Ok(attachment(service.html(&scope, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/billing/export",
    params(InvoiceExportParams),
    responses(
        (status = 200, description = "Invoice register as CSV", content_type = "text/csv")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn export_invoices(
    scope: TenantScope,
    State(service): State<Arc<InvoiceService>>,
    Query(params): Query<InvoiceExportParams>,
) -> Result<Response> {
    Ok(attachment(service.export(&scope, &params).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_attachment_headers() {
        let response = attachment(RenderedFile {
            file_name: "INV-2025-00001_2025-03-01.csv".to_string(),
            content_type: "text/csv; charset=utf-8",
            body: b"a,b\n".to_vec(),
        });

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"INV-2025-00001_2025-03-01.csv\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"a,b\n");
    }
}
