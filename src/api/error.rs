use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::handlers::RegistryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("payload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("missing or invalid shared secret")]
    Unauthorized,
    #[error("handler not found: {0}")]
    HandlerNotFound(String),
    #[error("event not supported: {0}")]
    EventNotSupported(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::HandlerNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EventNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::HandlerNotFound(_) => "HANDLER_NOT_FOUND",
            ApiError::EventNotSupported(_) => "EVENT_NOT_SUPPORTED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::EventNotRegistered { .. } => {
                ApiError::EventNotSupported(value.to_string())
            }
            RegistryError::CollectionNotFound(_)
            | RegistryError::FunctionNotFound(_)
            | RegistryError::AuthProviderNotFound(_) => {
                ApiError::HandlerNotFound(value.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
