//! JSON handlers for schedules.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use porchlight_app::ports::{DeviceRegistry, DeviceTransport, ScheduleRepository};
use porchlight_domain::schedule::{Schedule, ScheduleId};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a schedule.
#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub time: String,
    pub action: String,
    pub days: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Schedule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and toggle endpoints.
pub enum GetResponse {
    Ok(Json<Schedule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Schedule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

#[derive(Serialize)]
pub struct DeletedBody {
    pub success: bool,
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Deleted,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Deleted => Json(DeletedBody { success: true }).into_response(),
        }
    }
}

/// `GET /schedules`
pub async fn list<G, T, R>(
    State(state): State<AppState<G, T, R>>,
) -> Result<ListResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let schedules = state.schedule_service.list_schedules().await?;
    Ok(ListResponse::Ok(Json(schedules)))
}

/// `GET /schedules/{id}`
pub async fn get<G, T, R>(
    State(state): State<AppState<G, T, R>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let id = ScheduleId::from_str(&id)?;
    let schedule = state.schedule_service.get_schedule(id).await?;
    Ok(GetResponse::Ok(Json(schedule)))
}

/// `POST /schedules`
pub async fn create<G, T, R>(
    State(state): State<AppState<G, T, R>>,
    body: Result<Json<CreateScheduleRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let created = state
        .schedule_service
        .create_schedule(&req.time, &req.action, req.days.as_deref())
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `DELETE /schedules/{id}`
pub async fn delete<G, T, R>(
    State(state): State<AppState<G, T, R>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let id = ScheduleId::from_str(&id)?;
    state.schedule_service.delete_schedule(id).await?;
    Ok(DeleteResponse::Deleted)
}

/// `PUT /schedules/{id}/toggle`
pub async fn toggle<G, T, R>(
    State(state): State<AppState<G, T, R>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let id = ScheduleId::from_str(&id)?;
    let schedule = state.schedule_service.toggle_schedule(id).await?;
    Ok(GetResponse::Ok(Json(schedule)))
}
