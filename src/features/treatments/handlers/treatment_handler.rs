use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::treatments::dtos::{
    CreateTreatmentDto, TreatmentQueryParams, TreatmentResponseDto, UpdateTreatmentDto,
};
use crate::features::treatments::services::TreatmentService;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/treatments",
    params(TreatmentQueryParams),
    responses(
        (status = 200, description = "Treatment catalog", body = ApiResponse<Vec<TreatmentResponseDto>>)
    ),
    tag = "treatments",
    security(("bearer_auth" = []))
)]
pub async fn list_treatments(
    scope: TenantScope,
    State(service): State<Arc<TreatmentService>>,
    Query(params): Query<TreatmentQueryParams>,
) -> Result<Json<ApiResponse<Vec<TreatmentResponseDto>>>> {
    let (treatments, total) = service.list(scope.organization_id, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(treatments),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/treatments/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Treatment found", body = ApiResponse<TreatmentResponseDto>),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    security(("bearer_auth" = []))
)]
pub async fn get_treatment(
    scope: TenantScope,
    State(service): State<Arc<TreatmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TreatmentResponseDto>>> {
    let treatment = service.get(scope.organization_id, id).await?;
    Ok(Json(ApiResponse::success(Some(treatment), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/treatments",
    request_body = CreateTreatmentDto,
    responses(
        (status = 201, description = "Treatment added", body = ApiResponse<TreatmentResponseDto>),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Code already in use")
    ),
    tag = "treatments",
    security(("bearer_auth" = []))
)]
pub async fn create_treatment(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<TreatmentService>>,
    AppJson(dto): AppJson<CreateTreatmentDto>,
) -> Result<(StatusCode, Json<ApiResponse<TreatmentResponseDto>>)> {
    dto.validate()?;

    let treatment = service.create(org_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(treatment), None, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/treatments/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    request_body = UpdateTreatmentDto,
    responses(
        (status = 200, description = "Treatment updated", body = ApiResponse<TreatmentResponseDto>),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    security(("bearer_auth" = []))
)]
pub async fn update_treatment(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<TreatmentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTreatmentDto>,
) -> Result<Json<ApiResponse<TreatmentResponseDto>>> {
    dto.validate()?;

    let treatment = service.update(org_id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(treatment), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/treatments/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Treatment deactivated"),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    security(("bearer_auth" = []))
)]
pub async fn delete_treatment(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<TreatmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.deactivate(org_id, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Treatment deactivated".to_string()),
        None,
    )))
}
