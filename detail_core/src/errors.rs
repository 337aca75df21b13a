//! # Error Types
//!
//! Structured error types for detail_core. Detailing itself never fails on
//! well-typed numeric input (constraint-satisfaction problems degrade to
//! warnings, see [`crate::diagnostics`]); these errors cover the genuinely
//! fatal paths: malformed input geometry, file I/O, and schema mismatches.
//!
//! ## Example
//!
//! ```rust
//! use detail_core::errors::{DetailError, DetailResult};
//!
//! fn validate_length(beam_length_m: f64) -> DetailResult<()> {
//!     if beam_length_m <= 0.0 {
//!         return Err(DetailError::invalid_input(
//!             "beam_length_m",
//!             beam_length_m.to_string(),
//!             "Beam length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for detail_core operations
pub type DetailResult<T> = Result<T, DetailError>;

/// Structured error type for detailing operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic handling by API consumers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DetailError {
    /// An input value is invalid (out of range, inverted interval, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Project file is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Project schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl DetailError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DetailError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DetailError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        DetailError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry later)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DetailError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DetailError::InvalidInput { .. } => "INVALID_INPUT",
            DetailError::FileError { .. } => "FILE_ERROR",
            DetailError::FileLocked { .. } => "FILE_LOCKED",
            DetailError::SerializationError { .. } => "SERIALIZATION_ERROR",
            DetailError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = DetailError::invalid_input("beam_length_m", "-2.5", "Beam length must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: DetailError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DetailError::invalid_input("f", "v", "r").error_code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            DetailError::file_locked("a.dsp", "user", "now").error_code(),
            "FILE_LOCKED"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(DetailError::file_locked("a.dsp", "user", "now").is_recoverable());
        assert!(!DetailError::invalid_input("f", "v", "r").is_recoverable());
    }
}
