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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clinics::dtos::{
    ClinicQueryParams, ClinicResponseDto, CreateClinicDto, UpdateClinicDto,
};
use crate::features::clinics::services::ClinicService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/clinics",
    params(ClinicQueryParams),
    responses(
        (status = 200, description = "Clinics retrieved", body = ApiResponse<Vec<ClinicResponseDto>>),
        (status = 403, description = "No organization")
    ),
    tag = "clinics",
    security(("bearer_auth" = []))
)]
pub async fn list_clinics(
    user: AuthenticatedUser,
    State(service): State<Arc<ClinicService>>,
    Query(params): Query<ClinicQueryParams>,
) -> Result<Json<ApiResponse<Vec<ClinicResponseDto>>>> {
    let (clinics, total) = service.list(user.organization()?, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(clinics),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/clinics/{id}",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    responses(
        (status = 200, description = "Clinic found", body = ApiResponse<ClinicResponseDto>),
        (status = 404, description = "Clinic not found")
    ),
    tag = "clinics",
    security(("bearer_auth" = []))
)]
pub async fn get_clinic(
    user: AuthenticatedUser,
    State(service): State<Arc<ClinicService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClinicResponseDto>>> {
    let clinic = service.get(user.organization()?, id).await?;
    Ok(Json(ApiResponse::success(Some(clinic), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/clinics",
    request_body = CreateClinicDto,
    responses(
        (status = 201, description = "Clinic created", body = ApiResponse<ClinicResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Duplicate clinic name")
    ),
    tag = "clinics",
    security(("bearer_auth" = []))
)]
pub async fn create_clinic(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<ClinicService>>,
    AppJson(dto): AppJson<CreateClinicDto>,
) -> Result<(StatusCode, Json<ApiResponse<ClinicResponseDto>>)> {
    dto.validate()?;

    let clinic = service.create(org_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(clinic),
            Some("Clinic created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/clinics/{id}",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    request_body = UpdateClinicDto,
    responses(
        (status = 200, description = "Clinic updated", body = ApiResponse<ClinicResponseDto>),
        (status = 404, description = "Clinic not found")
    ),
    tag = "clinics",
    security(("bearer_auth" = []))
)]
pub async fn update_clinic(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<ClinicService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateClinicDto>,
) -> Result<Json<ApiResponse<ClinicResponseDto>>> {
    dto.validate()?;

    let clinic = service.update(org_id, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(clinic),
        Some("Clinic updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/clinics/{id}",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    responses(
        (status = 200, description = "Clinic deactivated"),
        (status = 404, description = "Clinic not found")
    ),
    tag = "clinics",
    security(("bearer_auth" = []))
)]
pub async fn delete_clinic(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<ClinicService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.deactivate(org_id, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Clinic deactivated".to_string()),
        None,
    )))
}
