//! Domain entities and business logic
//!
//! This module contains the core domain types for nib:
//! - Newtypes for remote identifiers and root-relative paths
//! - Remote and local inventories
//! - The sync plan (diff) and per-item transfer outcomes
//! - Domain-specific error types

pub mod errors;
pub mod inventory;
pub mod newtypes;
pub mod plan;

// Re-export commonly used types
pub use errors::DomainError;
pub use inventory::{
    is_image_path, LocalIndex, LocalItem, RemoteIndex, RemoteIndexBuild, RemoteItem,
    IMAGE_EXTENSIONS,
};
pub use newtypes::*;
pub use plan::{ItemOutcome, PhaseOutcome, SyncPlan, TransferOutcome};
