//! Domain error types for the test hub.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data
    #[error("{0}")]
    InvalidInput(String),

    /// Uniqueness constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Authentication failed
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated caller lacks permission
    #[error("{0}")]
    Forbidden(String),

    /// Target system could not be reached
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Target system did not answer in time
    #[error("{0}")]
    UpstreamTimeout(String),

    /// Target system request failed for another reason
    #[error("{0}")]
    Upstream(String),

    /// Unexpected local failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                "An internal database error occurred".to_string()
            }
            AppError::Internal(err_str) => {
                tracing::error!("Internal error: {}", err_str);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { detail })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return AppError::Conflict(format!("Record already exists: {}", msg));
        }
        AppError::Database(err.to_string())
    }
}

/// Answer malformed JSON bodies with the same `{"detail": ...}` shape.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid JSON body: {}", err)).into()
}

/// Answer malformed form bodies with the same `{"detail": ...}` shape.
pub fn form_error_handler(
    err: actix_web::error::UrlencodedError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid form body: {}", err)).into()
}

/// Answer malformed query strings with the same `{"detail": ...}` shape.
pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid query string: {}", err)).into()
}

/// Answer non-numeric path ids with the same `{"detail": ...}` shape.
pub fn path_error_handler(
    err: actix_web::error::PathError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid path parameter: {}", err)).into()
}
