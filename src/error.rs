//! Error types for Devfolio
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication failed (401)
    #[error("Invalid credentials")]
    Unauthorized,

    /// Validation error (400)
    ///
    /// A required-field or pattern constraint failed. The message names
    /// the first field that failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violation (409)
    ///
    /// A username or email collided with an existing account. The unique
    /// index in SQLite is the source of truth; this is the mapped form.
    #[error("Already taken: {0}")]
    Uniqueness(String),

    /// Cascade delete failure (500)
    ///
    /// Dependent posts could not be removed, so the owning account was
    /// left in place. Distinct from `NotFound`.
    #[error("Cascade delete failed: {0}")]
    Cascade(String),

    /// Password hashing failure (500)
    ///
    /// Internal detail stays in the log, never in the response body.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Uniqueness(msg) => (StatusCode::CONFLICT, msg.clone(), "uniqueness"),
            AppError::Cascade(_) => {
                tracing::error!(error = %self, "cascade delete failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Cascade delete failed".to_string(),
                    "cascade",
                )
            }
            AppError::Hashing(_) => {
                tracing::error!(error = %self, "password hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "hashing",
                )
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL
            .with_label_values(&[error_type, "unknown"])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
