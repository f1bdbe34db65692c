//! Application error types and handling.
//!
//! `AppError` is what the song server reports over HTTP; `ClientError` is
//! what the player sees when a remote call fails.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

/// API error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type/code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists under a conflicting name.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Create a not found error for a song.
    pub fn song_not_found(filename: &str) -> Self {
        Self::NotFound(format!("Song not found: {}", filename))
    }

    /// Create a validation error for path traversal attempt.
    pub fn path_traversal() -> Self {
        Self::BadRequest("Invalid path: path traversal not allowed".to_string())
    }

    /// Create a conflict error for names differing only by case.
    pub fn case_collision(requested: &str, existing: &str) -> Self {
        Self::Conflict(format!(
            "'{}' collides with existing song '{}' (names differ only by case)",
            requested, existing
        ))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ErrorResponse::new(self.error_code(), self.to_string());

        if status.is_server_error() {
            tracing::error!(
                error_code = %self.error_code(),
                status = %status.as_u16(),
                message = %self.to_string(),
                "API error"
            );
        } else {
            tracing::warn!(
                error_code = %self.error_code(),
                status = %status.as_u16(),
                message = %self.to_string(),
                "API request rejected"
            );
        }

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by remote File Service calls on the player side.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The requested song does not exist on the server.
    #[error("Song not found on server: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The server could not be reached or the call failed in transit.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local file I/O failed.
    #[error("Local IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A name or path supplied locally cannot be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Whether the failure means the song is absent remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
