//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use porchlight_domain::error::{PorchlightError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PorchlightError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(PorchlightError);

impl From<PorchlightError> for ApiError {
    fn from(err: PorchlightError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ValidationError::InvalidBody(rejection.body_text()).into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PorchlightError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PorchlightError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            PorchlightError::Dispatch(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            PorchlightError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
