use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;

use crate::domain::DomainError;

/// Error returned by REST handlers.
///
/// Renders as `{"error": <message>, "code": <CODE>}`. Storage failures are
/// logged and reported with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Domain(DomainError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            ApiError::Domain(DomainError::NotFound { .. }) => ("NOT_FOUND", self.to_string()),
            ApiError::Domain(DomainError::Validation(msg)) => ("VALIDATION_ERROR", msg.clone()),
            ApiError::Domain(DomainError::Conflict(msg)) => ("CONFLICT", msg.clone()),
            ApiError::Domain(DomainError::Storage(err)) => {
                error!("Internal error: {:#}", err);
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (self.status_code(), axum::Json(body)).into_response()
    }
}
