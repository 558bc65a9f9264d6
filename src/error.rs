//! Custom error types for tailor-backup
//!
//! This module defines the crate-wide error type using thiserror. Restore
//! outcomes have their own discriminated error in `backup::restore`, which
//! wraps this type when the record store fails mid-restore.

use thiserror::Error;

/// The main error type for tailor-backup operations
#[derive(Error, Debug)]
pub enum TailorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TailorError {
    /// Create a "not found" error for customers
    pub fn customer_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Customer",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for orders
    pub fn order_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Order",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a duplicate error
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<std::io::Error> for TailorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TailorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for tailor-backup operations
pub type TailorResult<T> = Result<T, TailorError>;
