//! nib API - NodeImage HTTP client
//!
//! Provides an async client for:
//! - Listing the images stored in a NodeImage account
//! - Streaming the content of a single image from its direct link
//!
//! ## Modules
//!
//! - [`client`] - NodeImage HTTP client and wire types
//! - [`provider`] - [`IRemoteInventory`](nib_core::ports::IRemoteInventory) adapter

pub mod client;
pub mod provider;

use thiserror::Error;

/// Errors that can occur when communicating with the NodeImage API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API key was rejected
    #[error("Unauthorized: the API rejected the token (HTTP {0})")]
    Unauthorized(u16),

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status {
        /// Numeric status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// The listing was well-formed but reported failure
    #[error("API returned an error: {0}")]
    Rejected(String),

    /// A network-level error occurred, including timeouts
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
