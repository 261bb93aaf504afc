use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::ValidationErrors;
use wayfare_booking::IntakeError;

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationErrors),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "error": "validation failed",
                    "details": errors,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

/// Intake failures map onto the response contract: missing/inactive trip is
/// 404, capacity exhaustion is 409, storage trouble is 500.
pub fn from_intake(error: IntakeError) -> AppError {
    match error {
        IntakeError::TripNotFound => AppError::NotFound("trip not found".to_string()),
        IntakeError::NotEnoughSeats => AppError::Conflict("not enough seats".to_string()),
        IntakeError::Store(inner) => AppError::Internal(inner.to_string()),
    }
}
