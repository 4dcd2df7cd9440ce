//! Error types for the chirpy server.
//!
//! [`Error`] covers configuration loading. Store failures at start-up carry
//! their own [`chirpy_db::Error`].
//! [`ApiError`] covers request handling and renders itself as an HTTP
//! response with a `{"error": "..."}` body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::io;
use thiserror::Error;

/// The error type for loading chirpy configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized Result type for chirpy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned from HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or path could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// The chirp body exceeds the configured maximum length.
    #[error("Chirp is too long")]
    ChirpTooLong,

    /// Unknown email or wrong password.
    #[error("Incorrect email or password")]
    Unauthorized,

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// Another account already uses this email.
    #[error("Email already registered")]
    EmailTaken,

    /// Anything the client cannot fix. Details go to the log, not the body.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ChirpTooLong => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<chirpy_db::Error> for ApiError {
    fn from(err: chirpy_db::Error) -> Self {
        match err {
            chirpy_db::Error::NotFound { .. } => ApiError::NotFound,
            chirpy_db::Error::EmailTaken(_) => ApiError::EmailTaken,
            other @ (chirpy_db::Error::Io { .. } | chirpy_db::Error::CorruptDocument { .. }) => {
                tracing::error!(error = %other, "Store operation failed");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
