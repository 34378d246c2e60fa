//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the sync core depends on; their implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteInventory`] - Remote image listing and downloads
//! - [`IConfirmation`] - Operator yes/no gates

pub mod confirmation;
pub mod remote_inventory;

pub use confirmation::{FixedAnswer, IConfirmation};
pub use remote_inventory::{IDownloadBody, IRemoteInventory, RemoteEntry};
