use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_typed_multipart::TypedMultipartError;
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidContentType(_)
            | AppError::DurationExceeded { .. }
            | AppError::Validation(_) => Self::ValidationError(err.to_string()),
            AppError::Probe(detail) => {
                tracing::warn!(code = "probe", "Upload rejected by probe: {detail}");
                Self::ValidationError("Cannot get audio duration".to_string())
            }
            AppError::NotFound(msg) => Self::NotFound(msg),
            _ => {
                tracing::error!(code = err.code(), "Internal error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl From<TypedMultipartError> for ApiError {
    fn from(err: TypedMultipartError) -> Self {
        let message = err.to_string();
        match err.into_response().status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(message),
            status if status.is_client_error() => Self::ValidationError(message),
            _ => {
                tracing::error!("Multipart extraction failed: {message}");
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InternalError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            Self::ValidationError(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::PayloadTooLarge(message) => (StatusCode::PAYLOAD_TOO_LARGE, message),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { message },
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    message: String,
}
