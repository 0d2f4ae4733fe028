//! # Centralized Error Handling
//!
//! Application-wide error type [`AppError`] used across all backend modules,
//! following the `thiserror` pattern.
//!
//! Errors map to HTTP statuses at the service boundary:
//!
//! 1. **Client errors** (4xx)
//!    - [`InvalidIdentifier`](AppError::InvalidIdentifier) → 400
//!    - [`EmptyRequest`](AppError::EmptyRequest) → 400
//!    - [`Unauthorized`](AppError::Unauthorized) → 401
//!    - [`Forbidden`](AppError::Forbidden) → 403
//!    - [`NotFound`](AppError::NotFound) → 404
//!    - [`Conflict`](AppError::Conflict) → 409
//! 2. **Server errors** (5xx)
//!    - [`Upstream`](AppError::Upstream) → 502 (asset host, generation API,
//!      mail)
//!    - [`Internal`](AppError::Internal) → 500
//!
//! Nothing here is fatal to the process; every handler isolates its own
//! failure. Delivery-channel push failures never surface as `AppError` at
//! all; the push layer is best-effort and swallows them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed participant reference (not a well-formed user id).
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// AI ask (or message send) with no content at all.
    #[error("Empty request: {0}")]
    EmptyRequest(String),

    /// Missing or invalid session credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Operation on a resource the caller does not own.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation (e.g. signup with an existing email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External collaborator failure (asset host, generation API, mail).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier(_) | AppError::EmptyRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-facing error message.
    ///
    /// Upstream and internal detail stays in the logs; callers get a generic
    /// message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidIdentifier(msg)
            | AppError::EmptyRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Upstream(_) => "Service temporarily unavailable".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidIdentifier(_) => "InvalidIdentifier",
            AppError::EmptyRequest(_) => "EmptyRequest",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Upstream(_) => "Upstream",
            AppError::Internal(_) => "Internal",
        }
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        if status.is_client_error() {
            tracing::debug!("Client error: {}", self);
        } else {
            tracing::error!("Server error: {}", self);
        }

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `sqlx::Error` to `AppError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}
