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
use crate::features::patients::dtos::{
    CreatePatientDto, PatientQueryParams, PatientResponseDto, UpdatePatientDto,
};
use crate::features::patients::services::PatientService;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/patients",
    params(
        PatientQueryParams,
        ("X-Clinic-Scope" = Option<String>, Header, description = "\"all\" or a clinic id")
    ),
    responses(
        (status = 200, description = "Patients retrieved", body = ApiResponse<Vec<PatientResponseDto>>),
        (status = 400, description = "Invalid clinic scope")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn list_patients(
    scope: TenantScope,
    State(service): State<Arc<PatientService>>,
    Query(params): Query<PatientQueryParams>,
) -> Result<Json<ApiResponse<Vec<PatientResponseDto>>>> {
    let (patients, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(patients),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient found", body = ApiResponse<PatientResponseDto>),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn get_patient(
    scope: TenantScope,
    State(service): State<Arc<PatientService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PatientResponseDto>>> {
    let patient = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(patient), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatientDto,
    responses(
        (status = 201, description = "Patient created", body = ApiResponse<PatientResponseDto>),
        (status = 400, description = "Validation error or missing clinic"),
        (status = 404, description = "Clinic not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn create_patient(
    scope: TenantScope,
    State(service): State<Arc<PatientService>>,
    AppJson(dto): AppJson<CreatePatientDto>,
) -> Result<(StatusCode, Json<ApiResponse<PatientResponseDto>>)> {
    dto.validate()?;

    let patient = service.create(&scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(patient),
            Some("Patient added successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    request_body = UpdatePatientDto,
    responses(
        (status = 200, description = "Patient updated", body = ApiResponse<PatientResponseDto>),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn update_patient(
    scope: TenantScope,
    State(service): State<Arc<PatientService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePatientDto>,
) -> Result<Json<ApiResponse<PatientResponseDto>>> {
    dto.validate()?;

    let patient = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(patient),
        Some("Patient updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deactivated"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn delete_patient(
    scope: TenantScope,
    State(service): State<Arc<PatientService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.deactivate(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Patient deactivated".to_string()),
        None,
    )))
}
