use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upstream request failed: {0}")]
    UpstreamFailure(anyhow::Error),

    #[error("Upstream response invalid: {0}")]
    UpstreamInvalidResponse(anyhow::Error),

    #[error("Upstream timed out: {0}")]
    GatewayTimeout(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// JSON body for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    /// Status and client-facing body. Only client-input errors echo their
    /// detail; upstream and internal failures use fixed text.
    pub fn parts(&self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request",
                    message: msg.clone(),
                },
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse {
                    error: "Payload Too Large",
                    message: msg.clone(),
                },
            ),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorResponse {
                    error: "Unsupported Media Type",
                    message: msg.clone(),
                },
            ),
            AppError::UpstreamFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Server Error",
                    message: "Upstream service request failed".to_string(),
                },
            ),
            AppError::UpstreamInvalidResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Server Error",
                    message: "Upstream service returned an invalid response".to_string(),
                },
            ),
            AppError::GatewayTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorResponse {
                    error: "Gateway Timeout",
                    message: "Upstream service did not respond in time".to_string(),
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Server Error",
                    message: "Internal server error".to_string(),
                },
            ),
            AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Server Error",
                    message: "Configuration error".to_string(),
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();

        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failure_hides_raw_error_text() {
        let err = AppError::UpstreamFailure(anyhow::anyhow!(
            "error sending request for url (https://example.com/?key=secret)"
        ));
        let (status, body) = err.parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Server Error");
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let (status, body) = AppError::GatewayTimeout(anyhow::anyhow!("elapsed")).parts();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body.error, "Gateway Timeout");
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let (status, body) = AppError::BadRequest("query parameter is required".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "query parameter is required");
    }

    #[test]
    fn unsupported_media_type_maps_to_415() {
        let (status, body) =
            AppError::UnsupportedMediaType("Expected request with `Content-Type: application/json`".into())
                .parts();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body.error, "Unsupported Media Type");
    }

    #[test]
    fn error_response_serializes_error_and_message() {
        let (_, body) = AppError::InternalError(anyhow::anyhow!("boom")).parts();
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["error"], "Server Error");
        assert_eq!(value["message"], "Internal server error");
    }
}
