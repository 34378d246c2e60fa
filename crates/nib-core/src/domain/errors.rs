//! Domain error types
//!
//! Validation failures raised while turning raw remote or local data into
//! domain values.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Relative path is empty, absolute, or escapes the sync root
    #[error("Invalid relative path: {0}")]
    InvalidRelativePath(String),

    /// Remote identifier is empty
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Remote filename does not carry an image extension
    #[error("Not an image file: {0}")]
    NotAnImage(String),

    /// Path is not within the configured sync root
    #[error("Path not within sync root: {0}")]
    PathNotInSyncRoot(String),
}
