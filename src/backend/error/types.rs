/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler.
 * Each variant knows its HTTP status and a stable `errorCode` that clients
 * can switch on.
 *
 * # Error Codes
 *
 * | variant | status | code |
 * |---|---|---|
 * | `PermissionNotFound` / `UserNotFound` | 404 | E001 |
 * | `FileNotFound` | 404 | E001 |
 * | `VersionMissing` | 400 | E002 |
 * | `Duplicate` | 409 | E004 |
 * | `Validation` / `SharedError` | 400 | E005 |
 * | `Unauthorized` | 401 | E006 |
 * | `Forbidden` | 403 | E007 |
 * | `Internal` | 500 | E000 |
 *
 * A stale version on update is reported as not found, so E003 is unused.
 *
 * `HandlerError` carries an arbitrary status (used by the 404 fallback) and
 * derives its code from that status.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use userhub::backend::error::BackendError;
///
/// let err = BackendError::user_not_found("42");
/// assert_eq!(err.message(), "User not found with id: 42");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Permission not found with id: {0}")]
    PermissionNotFound(String),

    #[error("User not found with id: {0}")]
    UserNotFound(String),

    /// An update arrived without the version it was based on
    #[error("Version is required")]
    VersionMissing,

    #[error("File not found with name: {0}")]
    FileNotFound(String),

    /// Unique key violation
    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Anything the client cannot fix; details are logged, not returned
    #[error("{0}")]
    Internal(String),

    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        status: StatusCode,
        message: String,
    },

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn permission_not_found(id: impl ToString) -> Self {
        Self::PermissionNotFound(id.to_string())
    }

    pub fn user_not_found(id: impl ToString) -> Self {
        Self::UserNotFound(id.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PermissionNotFound(_) | Self::UserNotFound(_) | Self::FileNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::VersionMissing => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Validation(_) | Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HandlerError { status, .. } => *status,
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionNotFound(_) | Self::UserNotFound(_) | Self::FileNotFound(_) => "E001",
            Self::VersionMissing => "E002",
            Self::Duplicate(_) => "E004",
            Self::Validation(_) | Self::SharedError(_) => "E005",
            Self::Unauthorized(_) => "E006",
            Self::Forbidden(_) => "E007",
            Self::Internal(_) => "E000",
            Self::HandlerError { status, .. } => match *status {
                StatusCode::NOT_FOUND => "E001",
                StatusCode::CONFLICT => "E004",
                StatusCode::UNAUTHORIZED => "E006",
                StatusCode::FORBIDDEN => "E007",
                s if s.is_client_error() => "E005",
                _ => "E000",
            },
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(message) => Self::Duplicate(message),
            other => Self::Internal(other.to_string()),
        }
    }
}
