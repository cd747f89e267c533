use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::reports::dtos::{
    AppointmentBreakdownDto, ReportRangeParams, ReportSummaryDto, RevenuePointDto,
    TopTreatmentDto, TopTreatmentsParams,
};
use crate::features::reports::services::ReportService;
use crate::shared::scope::TenantScope;
use crate::shared::types::ApiResponse;

#[utoipa::path(
    get,
    path = "/api/reports/summary",
    responses(
        (status = 200, description = "Headline counters", body = ApiResponse<ReportSummaryDto>)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn get_summary(
    scope: TenantScope,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<ReportSummaryDto>>> {
    let summary = service.summary(&scope).await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    params(ReportRangeParams),
    responses(
        (status = 200, description = "Monthly revenue", body = ApiResponse<Vec<RevenuePointDto>>),
        (status = 400, description = "Invalid date range")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn get_revenue(
    scope: TenantScope,
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportRangeParams>,
) -> Result<Json<ApiResponse<Vec<RevenuePointDto>>>> {
    let points = service.revenue(&scope, &params).await?;
    Ok(Json(ApiResponse::success(Some(points), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/reports/appointments",
    params(ReportRangeParams),
    responses(
        (status = 200, description = "Appointments by status", body = ApiResponse<AppointmentBreakdownDto>),
        (status = 400, description = "Invalid date range")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn get_appointments(
    scope: TenantScope,
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportRangeParams>,
) -> Result<Json<ApiResponse<AppointmentBreakdownDto>>> {
    let breakdown = service.appointments(&scope, &params).await?;
    Ok(Json(ApiResponse::success(Some(breakdown), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/reports/treatments",
    params(TopTreatmentsParams),
    responses(
        (status = 200, description = "Most planned treatments", body = ApiResponse<Vec<TopTreatmentDto>>),
        (status = 400, description = "Invalid date range")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn get_top_treatments(
    scope: TenantScope,
    State(service): State<Arc<ReportService>>,
    Query(params): Query<TopTreatmentsParams>,
) -> Result<Json<ApiResponse<Vec<TopTreatmentDto>>>> {
    let treatments = service.top_treatments(&scope, &params).await?;
    Ok(Json(ApiResponse::success(Some(treatments), None, None)))
}
