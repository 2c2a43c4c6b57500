//! API error types and handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sites_shared::ValidationError;

use crate::subscribers::SubscribeError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation errors
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Internal errors
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Validation
            ApiError::Validation(ValidationError::InvalidEmail) => {
                (StatusCode::BAD_REQUEST, "Please provide a valid email address".to_string())
            }
            ApiError::Validation(ValidationError::InvalidSite) => {
                (StatusCode::BAD_REQUEST, "Unknown site".to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            // Internal (details stay in the logs)
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to subscribe, please try again".to_string(),
            ),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SubscribeError> for ApiError {
    fn from(err: SubscribeError) -> Self {
        match err {
            SubscribeError::Validation(e) => ApiError::Validation(e),
            SubscribeError::Persistence(e) => {
                tracing::error!(error = %e, "Failed to persist subscriber");
                ApiError::Storage(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
