//! nib Core - Domain logic for the NodeImage backup tool
//!
//! This crate contains the hexagonal architecture core with:
//! - **Configuration** - `Config`, loading, validation, CLI overrides
//! - **Domain entities** - `RemoteItem`, `LocalItem`, their indexes, `SyncPlan`
//! - **Port definitions** - Traits for adapters: `IRemoteInventory`, `IConfirmation`
//!
//! # Architecture
//!
//! The domain module is pure: the diff between the remote and local
//! inventories does no I/O. Ports define the trait interfaces that the API
//! and sync crates implement or consume.

pub mod config;
pub mod domain;
pub mod ports;
