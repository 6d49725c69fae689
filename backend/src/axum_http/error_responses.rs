use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use domain::value_objects::enums::plans::Plan;

/// Uniform error body. The dashboard only reads `error`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The 403 quota body carries what the upgrade prompt needs.
#[derive(Debug, Serialize)]
pub struct QuotaExceededResponse {
    pub error: String,
    pub message: String,
    pub upgrade: bool,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("You've reached your {plan} plan limit of {limit} emails/month")]
    QuotaExceeded { plan: Plan, limit: i64 },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::QuotaExceeded { plan, limit } => (
                StatusCode::FORBIDDEN,
                Json(QuotaExceededResponse {
                    error: "Quota exceeded".to_string(),
                    message: format!(
                        "You've reached your {plan} plan limit of {limit} emails/month"
                    ),
                    upgrade: plan == Plan::Free,
                }),
            )
                .into_response(),
            AppError::Unauthorized => {
                error_response(StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AppError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => error_response(StatusCode::NOT_FOUND, message),
            AppError::Internal(_) => {
                // Don't leak internal error detail to client
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

pub fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Messages the usecases raise for caller mistakes. Anything not listed
/// here (and not a not-found) is treated as an internal failure.
const VALIDATION_MESSAGES: &[&str] = &[
    "Name is required",
    "Leads array is required",
    "No pending leads to send to",
    "Subject and email body are required",
    "Invalid action",
    "Email missing from token",
    "Gmail not connected",
];

impl AppError {
    /// Buckets a usecase error by its user-facing message so handlers can
    /// stay a one-line `map_err`.
    pub fn from_usecase(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if message.ends_with("not found") || message.ends_with("Not found") {
            return AppError::NotFound(message);
        }
        if VALIDATION_MESSAGES.contains(&message.as_str()) {
            return AppError::BadRequest(message);
        }
        AppError::Internal(err)
    }
}
