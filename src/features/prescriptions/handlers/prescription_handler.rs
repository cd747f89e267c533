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
use crate::features::auth::guards::RequireClinician;
use crate::features::prescriptions::dtos::{
    CreatePrescriptionDto, PrescriptionQueryParams, PrescriptionResponseDto,
    UpdatePrescriptionDto,
};
use crate::features::prescriptions::services::PrescriptionService;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/prescriptions",
    params(PrescriptionQueryParams),
    responses(
        (status = 200, description = "Prescriptions retrieved", body = ApiResponse<Vec<PrescriptionResponseDto>>)
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn list_prescriptions(
    scope: TenantScope,
    State(service): State<Arc<PrescriptionService>>,
    Query(params): Query<PrescriptionQueryParams>,
) -> Result<Json<ApiResponse<Vec<PrescriptionResponseDto>>>> {
    let (prescriptions, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(prescriptions),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription found", body = ApiResponse<PrescriptionResponseDto>),
        (status = 404, description = "Prescription not found")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn get_prescription(
    scope: TenantScope,
    State(service): State<Arc<PrescriptionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PrescriptionResponseDto>>> {
    let prescription = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(prescription), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/prescriptions",
    request_body = CreatePrescriptionDto,
    responses(
        (status = 201, description = "Prescription issued", body = ApiResponse<PrescriptionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Dentists and admins only")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn create_prescription(
    RequireClinician(user): RequireClinician,
    scope: TenantScope,
    State(service): State<Arc<PrescriptionService>>,
    AppJson(dto): AppJson<CreatePrescriptionDto>,
) -> Result<(StatusCode, Json<ApiResponse<PrescriptionResponseDto>>)> {
    dto.validate()?;

    let prescription = service.create(&user, &scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(prescription), None, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    request_body = UpdatePrescriptionDto,
    responses(
        (status = 200, description = "Prescription updated", body = ApiResponse<PrescriptionResponseDto>),
        (status = 404, description = "Prescription not found")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn update_prescription(
    _clinician: RequireClinician,
    scope: TenantScope,
    State(service): State<Arc<PrescriptionService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePrescriptionDto>,
) -> Result<Json<ApiResponse<PrescriptionResponseDto>>> {
    dto.validate()?;

    let prescription = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(prescription), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription voided"),
        (status = 404, description = "Prescription not found")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn delete_prescription(
    _clinician: RequireClinician,
    scope: TenantScope,
    State(service): State<Arc<PrescriptionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.void(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Prescription voided".to_string()),
        None,
    )))
}
