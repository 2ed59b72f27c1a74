use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tastemap_core::errors::EngineError;
use tastemap_db::StoreError;

/// Single mapping from engine failures to HTTP responses so no handler
/// branches on error kinds itself.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        };

        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(event_name = "api.store_unavailable", error = %self.0, "record store failure");
        }

        let body = ErrorBody { error: self.0.to_string(), message: self.0.user_message() };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(value: EngineError) -> Self {
        Self(value)
    }
}

/// The adapter propagates store failures without retrying; every flavor of
/// store error is retryable from the caller's point of view.
pub fn store_failure(error: StoreError) -> EngineError {
    EngineError::StoreUnavailable(error.to_string())
}
