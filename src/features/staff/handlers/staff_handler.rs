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
use crate::features::staff::dtos::{
    CreateStaffDto, StaffQueryParams, StaffResponseDto, UpdateStaffDto,
};
use crate::features::staff::services::StaffService;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/staff",
    params(StaffQueryParams),
    responses(
        (status = 200, description = "Staff retrieved", body = ApiResponse<Vec<StaffResponseDto>>)
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn list_staff(
    scope: TenantScope,
    State(service): State<Arc<StaffService>>,
    Query(params): Query<StaffQueryParams>,
) -> Result<Json<ApiResponse<Vec<StaffResponseDto>>>> {
    let (staff, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(staff),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member found", body = ApiResponse<StaffResponseDto>),
        (status = 404, description = "Staff member not found")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn get_staff(
    scope: TenantScope,
    State(service): State<Arc<StaffService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StaffResponseDto>>> {
    let staff = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(staff), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = CreateStaffDto,
    responses(
        (status = 201, description = "Staff member added", body = ApiResponse<StaffResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn create_staff(
    _admin: RequireAdmin,
    scope: TenantScope,
    State(service): State<Arc<StaffService>>,
    AppJson(dto): AppJson<CreateStaffDto>,
) -> Result<(StatusCode, Json<ApiResponse<StaffResponseDto>>)> {
    dto.validate()?;

    let staff = service.create(&scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(staff),
            Some("Staff member added successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = UpdateStaffDto,
    responses(
        (status = 200, description = "Staff member updated", body = ApiResponse<StaffResponseDto>),
        (status = 404, description = "Staff member not found")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn update_staff(
    _admin: RequireAdmin,
    scope: TenantScope,
    State(service): State<Arc<StaffService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateStaffDto>,
) -> Result<Json<ApiResponse<StaffResponseDto>>> {
    dto.validate()?;

    let staff = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(staff),
        Some("Staff member updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member deactivated"),
        (status = 404, description = "Staff member not found")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn delete_staff(
    _admin: RequireAdmin,
    scope: TenantScope,
    State(service): State<Arc<StaffService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.deactivate(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Staff member deactivated".to_string()),
        None,
    )))
}
