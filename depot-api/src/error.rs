//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use depot_core::error::DepotError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, "CONFLICT")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }

    /// Upstream weather lookup failed.
    pub fn weather_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message, "WEATHER_UNAVAILABLE")
    }

    /// Upstream weather lookup took too long.
    pub fn weather_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message, "WEATHER_TIMEOUT")
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<DepotError> for ApiError {
    fn from(err: DepotError) -> Self {
        match &err {
            DepotError::ValidationError(_) => ApiError::validation(err.to_string()),
            DepotError::DuplicateWarehouse(_) => ApiError::conflict(err.to_string()),
            DepotError::WarehouseNotFound(_) => ApiError::not_found(err.to_string()),
            DepotError::FetchTimeout { .. } => {
                tracing::warn!(error = %err, "Weather lookup timed out");
                ApiError::weather_timeout(err.to_string())
            }
            DepotError::FetchFailed { .. } => {
                tracing::warn!(error = %err, "Weather lookup failed");
                ApiError::weather_unavailable(err.to_string())
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_depot_error_mapping() {
        let cases = [
            (DepotError::WarehouseNotFound(7), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                DepotError::ValidationError("city_code".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                DepotError::DuplicateWarehouse("DEN".into()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                DepotError::FetchFailed {
                    key: "1".into(),
                    source: Arc::new(DepotError::HttpError("reset".into())),
                },
                StatusCode::BAD_GATEWAY,
                "WEATHER_UNAVAILABLE",
            ),
            (
                DepotError::FetchTimeout {
                    key: "1".into(),
                    timeout: Duration::from_secs(10),
                },
                StatusCode::GATEWAY_TIMEOUT,
                "WEATHER_TIMEOUT",
            ),
            (
                DepotError::InternalError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_internal_message_is_generic() {
        let api = ApiError::from(DepotError::InternalError("db password=hunter2".into()));
        assert_eq!(api.message, "An internal error occurred");
    }
}
