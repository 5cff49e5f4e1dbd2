//! Error types for Ratebook.

use thiserror::Error;

/// Main error type for Ratebook operations.
///
/// Every component surfaces these unchanged to its caller; nothing in the
/// workspace substitutes a default rate for a failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatebookError {
    /// Malformed input: bad code, negative amount or rate.
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// A currency code is already registered.
    #[error("Currency {0} is already registered")]
    Conflict(String),

    /// The operation referenced a currency code that is not registered.
    #[error("Currency {0} not found")]
    NotFound(String),

    /// The remote quote service failed, timed out or returned unusable data.
    #[error("Quote service error: {0}")]
    Upstream(String),

    /// A resolved rate would make the conversion undefined.
    #[error("Invalid rate for {code}: {reason}")]
    InvalidRate { code: String, reason: String },

    /// The caller cancelled the operation before it completed.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// The rate store itself failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RatebookError {
    /// Create a validation error for a named input field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RatebookError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-rate error for a currency code.
    pub fn invalid_rate(code: impl Into<String>, reason: impl Into<String>) -> Self {
        RatebookError::InvalidRate {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// The library never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RatebookError::Upstream(_) | RatebookError::Storage(_))
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            RatebookError::Validation { .. } => "VALIDATION_ERROR",
            RatebookError::Conflict(_) => "CONFLICT",
            RatebookError::NotFound(_) => "NOT_FOUND",
            RatebookError::Upstream(_) => "UPSTREAM_ERROR",
            RatebookError::InvalidRate { .. } => "INVALID_RATE",
            RatebookError::Cancelled(_) => "CANCELLED",
            RatebookError::Storage(_) => "STORAGE_ERROR",
            RatebookError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for Ratebook operations.
pub type Result<T> = std::result::Result<T, RatebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RatebookError::validation("code", "too short").error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(RatebookError::Conflict("USD".into()).error_code(), "CONFLICT");
        assert_eq!(RatebookError::NotFound("USD".into()).error_code(), "NOT_FOUND");
        assert_eq!(
            RatebookError::invalid_rate("USD", "zero").error_code(),
            "INVALID_RATE"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(RatebookError::Upstream("timeout".into()).is_retryable());
        assert!(RatebookError::Storage("locked".into()).is_retryable());
        assert!(!RatebookError::Conflict("USD".into()).is_retryable());
        assert!(!RatebookError::Cancelled("ctrl-c".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = RatebookError::validation("rate", "must not be negative");
        assert_eq!(
            err.to_string(),
            "Validation failed for rate: must not be negative"
        );
    }
}
