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
use crate::features::auth::dtos::AuthResponseDto;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::organizations::dtos::{
    ApproveJoinRequestDto, ChangeMemberRoleDto, CreateJoinRequestDto, CreateOrganizationDto,
    JoinRequestQueryParams, JoinRequestResponseDto, OrganizationResponseDto,
    OrganizationSearchParams, OrganizationSettingsDto, OrganizationSummaryDto,
    UpdateOrganizationDto, UpdateSettingsDto,
};
use crate::features::organizations::services::OrganizationService;
use crate::features::users::dtos::{UserQueryParams, UserResponseDto};
use crate::shared::types::{ApiResponse, Meta};

/// Create an organization and become its admin
///
/// The response carries a new token that includes the organization.
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationDto,
    responses(
        (status = 201, description = "Organization created", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error or already a member"),
        (status = 409, description = "Code already taken")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn create_organization(
    user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
    AppJson(dto): AppJson<CreateOrganizationDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    dto.validate()?;

    let auth = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(auth),
            Some("Organization created".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/organizations/current",
    responses(
        (status = 200, description = "Caller's organization", body = ApiResponse<OrganizationResponseDto>),
        (status = 403, description = "No organization")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn get_current(
    user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
) -> Result<Json<ApiResponse<OrganizationResponseDto>>> {
    let organization = service.current(user.organization()?).await?;
    Ok(Json(ApiResponse::success(Some(organization), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/organizations/current",
    request_body = UpdateOrganizationDto,
    responses(
        (status = 200, description = "Organization updated", body = ApiResponse<OrganizationResponseDto>),
        (status = 403, description = "Organization admin access required")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn update_current(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    AppJson(dto): AppJson<UpdateOrganizationDto>,
) -> Result<Json<ApiResponse<OrganizationResponseDto>>> {
    dto.validate()?;

    let organization = service.update_current(org_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(organization), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/organizations/settings",
    responses(
        (status = 200, description = "Billing settings", body = ApiResponse<OrganizationSettingsDto>),
        (status = 403, description = "No organization")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn get_settings(
    user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
) -> Result<Json<ApiResponse<OrganizationSettingsDto>>> {
    let settings = service.settings(user.organization()?).await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/organizations/settings",
    request_body = UpdateSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<OrganizationSettingsDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Organization admin access required")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn update_settings(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    AppJson(dto): AppJson<UpdateSettingsDto>,
) -> Result<Json<ApiResponse<OrganizationSettingsDto>>> {
    dto.validate()?;

    let settings = service.update_settings(org_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/organizations/search",
    params(OrganizationSearchParams),
    responses(
        (status = 200, description = "Matching organizations", body = ApiResponse<Vec<OrganizationSummaryDto>>)
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn search_organizations(
    _user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
    Query(params): Query<OrganizationSearchParams>,
) -> Result<Json<ApiResponse<Vec<OrganizationSummaryDto>>>> {
    let organizations = service.search(&params).await?;
    Ok(Json(ApiResponse::success(Some(organizations), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/join-requests",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = CreateJoinRequestDto,
    responses(
        (status = 201, description = "Join request sent", body = ApiResponse<JoinRequestResponseDto>),
        (status = 400, description = "Already a member of an organization"),
        (status = 409, description = "A pending request already exists")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn request_to_join(
    user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateJoinRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<JoinRequestResponseDto>>)> {
    dto.validate()?;

    let request = service.request_to_join(&user, id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(request),
            Some("Join request sent".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/organizations/join-requests",
    params(JoinRequestQueryParams),
    responses(
        (status = 200, description = "Join requests for the organization", body = ApiResponse<Vec<JoinRequestResponseDto>>),
        (status = 403, description = "Organization admin access required")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn list_join_requests(
    RequireAdmin(_admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    Query(params): Query<JoinRequestQueryParams>,
) -> Result<Json<ApiResponse<Vec<JoinRequestResponseDto>>>> {
    let (requests, total) = service.list_join_requests(org_id, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(requests),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/organizations/join-requests/mine",
    responses(
        (status = 200, description = "Caller's join requests", body = ApiResponse<Vec<JoinRequestResponseDto>>)
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn my_join_requests(
    user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
) -> Result<Json<ApiResponse<Vec<JoinRequestResponseDto>>>> {
    let requests = service.my_join_requests(&user).await?;
    Ok(Json(ApiResponse::success(Some(requests), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/organizations/join-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Join request ID")),
    request_body = ApproveJoinRequestDto,
    responses(
        (status = 200, description = "Request approved", body = ApiResponse<JoinRequestResponseDto>),
        (status = 400, description = "Already reviewed"),
        (status = 409, description = "User joined another organization")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn approve_join_request(
    RequireAdmin(admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ApproveJoinRequestDto>,
) -> Result<Json<ApiResponse<JoinRequestResponseDto>>> {
    let request = service.approve(&admin, org_id, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(request),
        Some("Join request approved".to_string()),
        None,
    )))
}

#[utoipa::path(
    put,
    path = "/api/organizations/join-requests/{id}/deny",
    params(("id" = Uuid, Path, description = "Join request ID")),
    responses(
        (status = 200, description = "Request denied", body = ApiResponse<JoinRequestResponseDto>),
        (status = 400, description = "Already reviewed")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn deny_join_request(
    RequireAdmin(admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JoinRequestResponseDto>>> {
    let request = service.deny(&admin, org_id, id).await?;
    Ok(Json(ApiResponse::success(
        Some(request),
        Some("Join request denied".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/organizations/members",
    params(UserQueryParams),
    responses(
        (status = 200, description = "Organization members", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "No organization")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn list_members(
    user: AuthenticatedUser,
    State(service): State<Arc<OrganizationService>>,
    Query(params): Query<UserQueryParams>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (members, total) = service.members(&user, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(members),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    put,
    path = "/api/organizations/members/{user_id}/role",
    params(("user_id" = Uuid, Path, description = "Member user ID")),
    request_body = ChangeMemberRoleDto,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Cannot change own role"),
        (status = 403, description = "Owner cannot be changed"),
        (status = 404, description = "Member not found")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn change_member_role(
    RequireAdmin(admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    Path(user_id): Path<Uuid>,
    AppJson(dto): AppJson<ChangeMemberRoleDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let member = service.change_role(&admin, org_id, user_id, dto.role).await?;
    Ok(Json(ApiResponse::success(Some(member), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/members/{user_id}",
    params(("user_id" = Uuid, Path, description = "Member user ID")),
    responses(
        (status = 200, description = "Member removed"),
        (status = 400, description = "Cannot remove yourself"),
        (status = 403, description = "Owner cannot be removed"),
        (status = 404, description = "Member not found")
    ),
    tag = "organizations",
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    RequireAdmin(admin, org_id): RequireAdmin,
    State(service): State<Arc<OrganizationService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.remove_member(&admin, org_id, user_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Member removed".to_string()),
        None,
    )))
}
