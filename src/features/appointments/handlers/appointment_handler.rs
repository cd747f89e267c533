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
use crate::features::appointments::dtos::{
    AppointmentQueryParams, AppointmentResponseDto, CreateAppointmentDto, UpdateAppointmentDto,
    UpdateAppointmentStatusDto,
};
use crate::features::appointments::services::AppointmentService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::scope::TenantScope;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/appointments",
    params(AppointmentQueryParams),
    responses(
        (status = 200, description = "Appointments retrieved", body = ApiResponse<Vec<AppointmentResponseDto>>)
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn list_appointments(
    scope: TenantScope,
    State(service): State<Arc<AppointmentService>>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<ApiResponse<Vec<AppointmentResponseDto>>>> {
    let (appointments, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(appointments),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment found", body = ApiResponse<AppointmentResponseDto>),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn get_appointment(
    scope: TenantScope,
    State(service): State<Arc<AppointmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let appointment = service.get(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(appointment), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentDto,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<AppointmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Dentist is already booked")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn create_appointment(
    user: AuthenticatedUser,
    scope: TenantScope,
    State(service): State<Arc<AppointmentService>>,
    AppJson(dto): AppJson<CreateAppointmentDto>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentResponseDto>>)> {
    dto.validate()?;

    let appointment = service.create(&user, &scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(appointment),
            Some("Appointment booked".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentDto,
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<AppointmentResponseDto>),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Dentist is already booked")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn update_appointment(
    scope: TenantScope,
    State(service): State<Arc<AppointmentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateAppointmentDto>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    dto.validate()?;

    let appointment = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(appointment), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<AppointmentResponseDto>),
        (status = 400, description = "Transition not allowed")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn update_appointment_status(
    scope: TenantScope,
    State(service): State<Arc<AppointmentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateAppointmentStatusDto>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let appointment = service.update_status(&scope, id, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(appointment), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = ApiResponse<AppointmentResponseDto>),
        (status = 400, description = "Appointment can no longer be cancelled")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn cancel_appointment(
    scope: TenantScope,
    State(service): State<Arc<AppointmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let appointment = service.cancel(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        Some(appointment),
        Some("Appointment cancelled".to_string()),
        None,
    )))
}
