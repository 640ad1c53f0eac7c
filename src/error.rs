//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: String,
    pub error_code: String,
}

const INTERNAL_MESSAGE: &str = "internal server error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),

            // 401 Unauthorized
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),

            AppError::Domain(domain_err) => {
                // Server-side failures were logged where they happened
                if !domain_err.is_client_error() {
                    return internal_error("internal_error");
                }
                let (status, code) = match domain_err {
                    DomainError::InsufficientBalance => (StatusCode::BAD_REQUEST, "insufficient_balance"),
                    DomainError::SelfTransfer => (StatusCode::BAD_REQUEST, "self_transfer"),
                    DomainError::UserNotFound => (StatusCode::BAD_REQUEST, "user_not_found"),
                    DomainError::ItemNotFound => (StatusCode::BAD_REQUEST, "item_not_found"),
                    DomainError::WrongPassword => (StatusCode::BAD_REQUEST, "wrong_password"),
                    DomainError::UserAlreadyExists => (StatusCode::CONFLICT, "user_already_exists"),
                    DomainError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
                };
                (status, code, domain_err.to_string())
            }
        };

        let body = ErrorResponse {
            errors: message,
            error_code: error_code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Generic 500 response; the cause has already been logged
fn internal_error(error_code: &str) -> Response {
    let body = ErrorResponse {
        errors: INTERNAL_MESSAGE.to_string(),
        error_code: error_code.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
