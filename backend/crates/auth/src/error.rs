//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Authentication failures (bad password, bad OTP, bad token) all render
//! the same generic 401 text so that responses never reveal which part of
//! the check failed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::application::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required request field is missing or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Input failed value-object validation (username/email/password shape)
    #[error("{0}")]
    Validation(String),

    /// Invalid credentials (unknown user or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is invalid, expired, or the wrong claim variant for this route
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Submitted one-time code did not match within the tolerance window
    #[error("Invalid one-time code")]
    InvalidOtpCode,

    /// Username or email already registered
    #[error("Username or email already in use")]
    DuplicateUser,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingField(_) | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::InvalidOtpCode => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingField(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::InvalidOtpCode => ErrorKind::Unauthorized,
            AuthError::DuplicateUser => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidOtpCode => {
                tracing::warn!("OTP verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            ErrorKind::Conflict => AuthError::DuplicateUser,
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}
