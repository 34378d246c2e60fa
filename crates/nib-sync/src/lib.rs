//! nib Sync - One-way reconciliation engine
//!
//! Provides:
//! - Local inventory scanning of the sync root
//! - Operator confirmation gates
//! - Bounded-concurrency downloads with atomic writes
//! - The orchestrator that ties listing, scanning, planning and execution
//!
//! ## Modules
//!
//! - [`engine`] - Sync orchestrator and run report
//! - [`executor`] - Sequential deletions and concurrent downloads
//! - [`filesystem`] - Local filesystem adapter (atomic writes)
//! - [`gate`] - Line-based yes/no confirmation
//! - [`scanner`] - Recursive image scan of the sync root

pub mod engine;
pub mod executor;
pub mod filesystem;
pub mod gate;
pub mod scanner;

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that stop a sync run before anything is applied
#[derive(Debug, Error)]
pub enum SyncError {
    /// The configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote listing could not be obtained or parsed
    #[error("Failed to fetch remote inventory: {0:#}")]
    Fetch(anyhow::Error),

    /// The sync root or one of its subdirectories could not be read
    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while preparing the sync root
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reasons a single delete or download failed
///
/// Recorded in the item's outcome; never aborts the batch.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The download request failed or returned an error status
    #[error("request failed: {0:#}")]
    Request(anyhow::Error),

    /// Reading the response body failed midway
    #[error("failed to read response body: {0:#}")]
    Body(anyhow::Error),

    /// The parent directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the temporary file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The temporary file could not be moved into place
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// The received byte count differs from the declared size
    #[error("size mismatch: expected {expected} bytes, received {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// A local file could not be removed
    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The download task ended without reporting (panic or cancellation)
    #[error("download task aborted: {0}")]
    Aborted(String),
}
