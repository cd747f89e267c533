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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::communications::dtos::{
    CommunicationQueryParams, CommunicationResponseDto, CreateCommunicationDto,
    UpdateCommunicationDto,
};
use crate::features::communications::services::CommunicationService;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/communications",
    params(CommunicationQueryParams),
    responses(
        (status = 200, description = "Communications retrieved", body = ApiResponse<Vec<CommunicationResponseDto>>)
    ),
    tag = "communications",
    security(("bearer_auth" = []))
)]
pub async fn list_communications(
    scope: TenantScope,
    State(service): State<Arc<CommunicationService>>,
    Query(params): Query<CommunicationQueryParams>,
) -> Result<Json<ApiResponse<Vec<CommunicationResponseDto>>>> {
    let (communications, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(communications),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/communications/{id}",
    params(("id" = Uuid, Path, description = "Communication ID")),
    responses(
        (status = 200, description = "Communication found", body = ApiResponse<CommunicationResponseDto>),
        (status = 404, description = "Communication not found")
    ),
    tag = "communications",
    security(("bearer_auth" = []))
)]
pub async fn get_communication(
    scope: TenantScope,
    State(service): State<Arc<CommunicationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CommunicationResponseDto>>> {
    let communication = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(communication), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/communications",
    request_body = CreateCommunicationDto,
    responses(
        (status = 201, description = "Communication logged", body = ApiResponse<CommunicationResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Patient not found")
    ),
    tag = "communications",
    security(("bearer_auth" = []))
)]
pub async fn create_communication(
    user: AuthenticatedUser,
    scope: TenantScope,
    State(service): State<Arc<CommunicationService>>,
    AppJson(dto): AppJson<CreateCommunicationDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommunicationResponseDto>>)> {
    dto.validate()?;

    let communication = service.create(&user, &scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(communication), None, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/communications/{id}",
    params(("id" = Uuid, Path, description = "Communication ID")),
    request_body = UpdateCommunicationDto,
    responses(
        (status = 200, description = "Communication updated", body = ApiResponse<CommunicationResponseDto>),
        (status = 400, description = "Message already sent"),
        (status = 404, description = "Communication not found")
    ),
    tag = "communications",
    security(("bearer_auth" = []))
)]
pub async fn update_communication(
    scope: TenantScope,
    State(service): State<Arc<CommunicationService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCommunicationDto>,
) -> Result<Json<ApiResponse<CommunicationResponseDto>>> {
    dto.validate()?;

    let communication = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(communication), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/communications/{id}",
    params(("id" = Uuid, Path, description = "Communication ID")),
    responses(
        (status = 200, description = "Scheduled communication withdrawn"),
        (status = 400, description = "Message already sent"),
        (status = 404, description = "Communication not found")
    ),
    tag = "communications",
    security(("bearer_auth" = []))
)]
pub async fn delete_communication(
    scope: TenantScope,
    State(service): State<Arc<CommunicationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Communication withdrawn".to_string()),
        None,
    )))
}
