//! Shared Error Types
//!
//! This module defines the error types produced by the shared domain layer.
//! They describe bad input rather than infrastructure failures, so the backend
//! maps every one of them to `400 Bad Request`.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures (blank fields, bad paging)
//!
//! # Usage
//!
//! ```rust
//! use userhub::shared::error::SharedError;
//!
//! let error = SharedError::validation("name", "must not be blank");
//! assert!(error.to_string().contains("name"));
//! ```
use thiserror::Error;

/// Shared error types raised while building or validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Reject blank (empty or whitespace-only) values for `field`
pub fn require_not_blank(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, format!("'{}' cannot be blank", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = SharedError::validation("email", "must not be blank");
        assert_eq!(
            error.to_string(),
            "Validation error in field 'email': must not be blank"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let shared: SharedError = err.into();
        assert!(matches!(shared, SharedError::SerializationError { .. }));
    }

    #[test]
    fn test_require_not_blank() {
        assert!(require_not_blank("name", "admin").is_ok());
        assert!(require_not_blank("name", "   ").is_err());
        assert!(require_not_blank("name", "").is_err());
    }
}
