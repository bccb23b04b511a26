//! Error types for the AVMo AI service
//!
//! This module defines the error taxonomy shared by the recommendation engine,
//! the storage backends and the HTTP layer. Read-path callers usually absorb
//! these errors and degrade to static data; write-path validation errors are
//! surfaced to the client.

use std::io;
use thiserror::Error;

/// AVMo error types
#[derive(Debug, Error)]
pub enum AvmoError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input failed validation (missing ids, unknown interaction type, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Interaction store or catalog provider cannot be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl AvmoError {
    /// Whether the error means a collaborator could not be reached in time
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AvmoError::StoreUnavailable(_) | AvmoError::Timeout(_) | AvmoError::Database(_)
        )
    }
}

/// Result type for AVMo operations
pub type Result<T> = std::result::Result<T, AvmoError>;

impl From<serde_json::Error> for AvmoError {
    fn from(err: serde_json::Error) -> Self {
        AvmoError::Serialization(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for AvmoError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AvmoError::Timeout(err.to_string())
    }
}
