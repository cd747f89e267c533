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
use crate::features::treatments::dtos::{
    CreateTreatmentPlanDto, TreatmentPlanQueryParams, TreatmentPlanResponseDto,
    UpdateTreatmentPlanDto,
};
use crate::features::treatments::services::TreatmentPlanService;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/treatment-plans",
    params(TreatmentPlanQueryParams),
    responses(
        (status = 200, description = "Treatment plans retrieved", body = ApiResponse<Vec<TreatmentPlanResponseDto>>)
    ),
    tag = "treatment-plans",
    security(("bearer_auth" = []))
)]
pub async fn list_treatment_plans(
    scope: TenantScope,
    State(service): State<Arc<TreatmentPlanService>>,
    Query(params): Query<TreatmentPlanQueryParams>,
) -> Result<Json<ApiResponse<Vec<TreatmentPlanResponseDto>>>> {
    let (plans, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(plans),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/treatment-plans/{id}",
    params(("id" = Uuid, Path, description = "Treatment plan ID")),
    responses(
        (status = 200, description = "Treatment plan with items", body = ApiResponse<TreatmentPlanResponseDto>),
        (status = 404, description = "Treatment plan not found")
    ),
    tag = "treatment-plans",
    security(("bearer_auth" = []))
)]
pub async fn get_treatment_plan(
    scope: TenantScope,
    State(service): State<Arc<TreatmentPlanService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TreatmentPlanResponseDto>>> {
    let plan = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(plan), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/treatment-plans",
    request_body = CreateTreatmentPlanDto,
    responses(
        (status = 201, description = "Treatment plan created", body = ApiResponse<TreatmentPlanResponseDto>),
        (status = 400, description = "Validation error or unknown treatment"),
        (status = 403, description = "Dentists and admins only")
    ),
    tag = "treatment-plans",
    security(("bearer_auth" = []))
)]
pub async fn create_treatment_plan(
    RequireClinician(user): RequireClinician,
    scope: TenantScope,
    State(service): State<Arc<TreatmentPlanService>>,
    AppJson(dto): AppJson<CreateTreatmentPlanDto>,
) -> Result<(StatusCode, Json<ApiResponse<TreatmentPlanResponseDto>>)> {
    dto.validate()?;

    let plan = service.create(&user, &scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(plan), None, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/treatment-plans/{id}",
    params(("id" = Uuid, Path, description = "Treatment plan ID")),
    request_body = UpdateTreatmentPlanDto,
    responses(
        (status = 200, description = "Treatment plan updated", body = ApiResponse<TreatmentPlanResponseDto>),
        (status = 400, description = "Plan is closed"),
        (status = 404, description = "Treatment plan not found")
    ),
    tag = "treatment-plans",
    security(("bearer_auth" = []))
)]
pub async fn update_treatment_plan(
    _clinician: RequireClinician,
    scope: TenantScope,
    State(service): State<Arc<TreatmentPlanService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTreatmentPlanDto>,
) -> Result<Json<ApiResponse<TreatmentPlanResponseDto>>> {
    dto.validate()?;

    let plan = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(plan), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/treatment-plans/{id}",
    params(("id" = Uuid, Path, description = "Treatment plan ID")),
    responses(
        (status = 200, description = "Treatment plan cancelled"),
        (status = 404, description = "Treatment plan not found")
    ),
    tag = "treatment-plans",
    security(("bearer_auth" = []))
)]
pub async fn cancel_treatment_plan(
    _clinician: RequireClinician,
    scope: TenantScope,
    State(service): State<Arc<TreatmentPlanService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.cancel(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Treatment plan cancelled".to_string()),
        None,
    )))
}
