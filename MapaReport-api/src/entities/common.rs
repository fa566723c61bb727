use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use mapa_report_domain::services::MapaServiceError;

/// Error response format for the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Stored data can no longer be processed
    pub fn precondition_failed(message: &str) -> Self {
        Self {
            error: "precondition_failed".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "precondition_failed" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<MapaServiceError> for ErrorResponse {
    fn from(err: MapaServiceError) -> Self {
        match err {
            MapaServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            MapaServiceError::NotFound(msg) => Self {
                error: "not_found".to_string(),
                message: msg,
                details: None,
            },
            MapaServiceError::Precondition(msg) => ErrorResponse::precondition_failed(&msg),
            MapaServiceError::RepositoryError(msg) => {
                error!("Repository failure: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (MapaServiceError::ValidationError("bad".to_string()), StatusCode::BAD_REQUEST),
            (MapaServiceError::NotFound("gone".to_string()), StatusCode::NOT_FOUND),
            (MapaServiceError::Precondition("stale".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (MapaServiceError::RepositoryError("io".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = ErrorResponse::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_repository_details_are_hidden() {
        let response = ErrorResponse::from(MapaServiceError::RepositoryError("disk full".to_string()));
        assert_eq!(response.message, "An unexpected error occurred");
    }
}
