//! JSON handlers for devices and on/off commands.

use std::net::IpAddr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use porchlight_app::ports::{DeviceRegistry, DeviceTransport, ScheduleRepository};
use porchlight_domain::device::Device;
use porchlight_domain::dispatch::DeviceOutcome;
use porchlight_domain::error::{PorchlightError, ValidationError};
use porchlight_domain::intent::Intent;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of a single-device command response.
#[derive(Serialize)]
pub struct CommandBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Possible responses from the single-device command endpoints.
pub enum CommandResponse {
    Delivered(Json<CommandBody>),
    Failed(Json<CommandBody>),
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Delivered(json) => json.into_response(),
            Self::Failed(json) => (StatusCode::BAD_GATEWAY, json).into_response(),
        }
    }
}

/// Body of a fan-out response.
#[derive(Serialize)]
pub struct FanOutBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<DeviceOutcome>,
}

/// Possible responses from the fan-out endpoints.
pub enum FanOutResponse {
    Ok(Json<FanOutBody>),
    Partial(Json<FanOutBody>),
}

impl IntoResponse for FanOutResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Partial(json) => (StatusCode::BAD_GATEWAY, json).into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /devices`
pub async fn list<G, T, R>(
    State(state): State<AppState<G, T, R>>,
) -> Result<ListResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let devices = state.dispatcher.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `POST /on/{address}`
pub async fn turn_on<G, T, R>(
    State(state): State<AppState<G, T, R>>,
    Path(address): Path<String>,
) -> Result<CommandResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    command(&state, &address, Intent::On).await
}

/// `POST /off/{address}`
pub async fn turn_off<G, T, R>(
    State(state): State<AppState<G, T, R>>,
    Path(address): Path<String>,
) -> Result<CommandResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    command(&state, &address, Intent::Off).await
}

async fn command<G, T, R>(
    state: &AppState<G, T, R>,
    address: &str,
    intent: Intent,
) -> Result<CommandResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let address: IpAddr = address
        .parse()
        .map_err(|_| ValidationError::InvalidAddress(address.to_string()))?;

    match state.dispatcher.dispatch_address(address, intent).await {
        Ok(response) => {
            tracing::info!(%address, %intent, %response, "command accepted");
            Ok(CommandResponse::Delivered(Json(CommandBody {
                success: true,
                response: Some(response),
                error: None,
            })))
        }
        Err(PorchlightError::Dispatch(err)) => {
            tracing::error!(%address, %intent, error = %err, "command failed");
            Ok(CommandResponse::Failed(Json(CommandBody {
                success: false,
                response: None,
                error: Some(err.detail),
            })))
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /on_all`
pub async fn turn_on_all<G, T, R>(
    State(state): State<AppState<G, T, R>>,
) -> Result<FanOutResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    fan_out(&state, Intent::On).await
}

/// `POST /off_all`
pub async fn turn_off_all<G, T, R>(
    State(state): State<AppState<G, T, R>>,
) -> Result<FanOutResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    fan_out(&state, Intent::Off).await
}

async fn fan_out<G, T, R>(
    state: &AppState<G, T, R>,
    intent: Intent,
) -> Result<FanOutResponse, ApiError>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let report = state.dispatcher.dispatch_all(intent).await?;
    let error = report.failure_summary();
    let body = FanOutBody {
        success: error.is_none(),
        error,
        results: report.outcomes,
    };
    if body.success {
        Ok(FanOutResponse::Ok(Json(body)))
    } else {
        Ok(FanOutResponse::Partial(Json(body)))
    }
}
