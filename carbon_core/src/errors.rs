//! # Error Types
//!
//! Structured error types for carbon_core. These errors are designed to be
//! informative for both humans and API consumers, providing enough context
//! to understand and fix issues programmatically.
//!
//! Only request-level failures are errors. A line item whose material cannot
//! be resolved, or whose unit cannot be converted, is reported inside the
//! result instead (see [`crate::calculations::portfolio`]).
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::errors::{CarbonError, CarbonResult};
//!
//! fn validate_quantity(quantity: f64) -> CarbonResult<()> {
//!     if quantity <= 0.0 {
//!         return Err(CarbonError::InvalidInput {
//!             field: "quantity".to_string(),
//!             value: quantity.to_string(),
//!             reason: "Quantity must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for carbon_core operations
pub type CarbonResult<T> = Result<T, CarbonError>;

/// Structured error type for carbon calculation operations.
///
/// Each variant provides specific context about what went wrong,
/// and maps onto an HTTP-equivalent status via [`CarbonError::status_code`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CarbonError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Transport mode is not one of the known modal aliases
    #[error("Unknown transport mode: '{mode}' (expected truck, road, rail, ship, sea, ocean or air)")]
    UnknownTransportMode { mode: String },

    /// A standalone lookup (conversion path, EPD program) found nothing
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The reference data store could not be read
    #[error("Reference data unavailable: {catalog} - {reason}")]
    ReferenceDataUnavailable { catalog: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is being written by another process")]
    FileLocked { path: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CarbonError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CarbonError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CarbonError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownTransportMode error
    pub fn unknown_transport_mode(mode: impl Into<String>) -> Self {
        CarbonError::UnknownTransportMode { mode: mode.into() }
    }

    /// Create a NotFound error
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        CarbonError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Create a ReferenceDataUnavailable error
    pub fn reference_data_unavailable(catalog: impl Into<String>, reason: impl Into<String>) -> Self {
        CarbonError::ReferenceDataUnavailable {
            catalog: catalog.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CarbonError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CarbonError::FileLocked { .. } | CarbonError::ReferenceDataUnavailable { .. }
        )
    }

    /// Whether the caller sent a request that can never succeed as-is
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CarbonError::InvalidInput { .. }
                | CarbonError::MissingField { .. }
                | CarbonError::UnknownTransportMode { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CarbonError::InvalidInput { .. } => "INVALID_INPUT",
            CarbonError::MissingField { .. } => "MISSING_FIELD",
            CarbonError::UnknownTransportMode { .. } => "UNKNOWN_TRANSPORT_MODE",
            CarbonError::NotFound { .. } => "NOT_FOUND",
            CarbonError::ReferenceDataUnavailable { .. } => "REFERENCE_DATA_UNAVAILABLE",
            CarbonError::FileError { .. } => "FILE_ERROR",
            CarbonError::FileLocked { .. } => "FILE_LOCKED",
            CarbonError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CarbonError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CarbonError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// HTTP-equivalent status for the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            CarbonError::InvalidInput { .. }
            | CarbonError::MissingField { .. }
            | CarbonError::UnknownTransportMode { .. }
            | CarbonError::SerializationError { .. } => 400,
            CarbonError::NotFound { .. } => 404,
            CarbonError::FileLocked { .. } => 409,
            CarbonError::ReferenceDataUnavailable { .. }
            | CarbonError::FileError { .. }
            | CarbonError::VersionMismatch { .. }
            | CarbonError::Internal { .. } => 500,
        }
    }
}

impl From<serde_json::Error> for CarbonError {
    fn from(e: serde_json::Error) -> Self {
        CarbonError::SerializationError {
            reason: e.to_string(),
        }
    }
}
