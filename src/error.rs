//! Error types for ssh-manage
//!
//! Provides a unified error type for all operations. The CLI flattens every
//! variant to exit code 1; only the message distinguishes the cause.

use thiserror::Error;

/// Result type alias using ManageError
pub type Result<T> = std::result::Result<T, ManageError>;

/// Unified error type for ssh-manage operations
#[derive(Debug, Error)]
pub enum ManageError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    /// A required field is missing or a value is out of range
    #[error("{0}")]
    Validation(String),

    /// No entry exists for the given name (or identifier at the store level)
    #[error("no configuration found for {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("failed to parse the configuration stored at {identifier}: {source}")]
    Decode {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ManageError {
    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        ManageError::Validation(msg.into())
    }

    /// True for the not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManageError::NotFound(_))
    }
}
