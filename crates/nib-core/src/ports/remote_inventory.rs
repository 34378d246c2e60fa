//! Remote inventory port (driven/secondary port)
//!
//! Everything the sync engine needs from the remote image service: the
//! current listing and a way to fetch the bytes of one image.
//!
//! Errors use `anyhow::Result`; their classification is adapter-specific.

use serde::{Deserialize, Serialize};

use crate::domain::inventory::RemoteItem;

/// One entry of the remote listing, before validation
///
/// A port-level DTO. [`RemoteItem::from_entry`] turns it into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Opaque identifier assigned by the service
    pub id: String,
    /// Filename, used as the local relative path
    pub filename: String,
    /// Declared size in bytes
    pub size: u64,
    /// Direct download URL
    pub url: String,
}

/// Body of an accepted download response, read chunk by chunk
#[async_trait::async_trait]
pub trait IDownloadBody: Send {
    /// Next chunk of the body, `None` once the body is exhausted
    async fn next_chunk(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Read access to the remote image set
#[async_trait::async_trait]
pub trait IRemoteInventory: Send + Sync {
    /// Fetch the complete listing of remote images
    ///
    /// Fails as a whole when the service is unreachable, rejects the
    /// credentials, or answers with something that is not a valid listing.
    async fn list_entries(&self) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Request the content of `item`
    ///
    /// Resolves once the service has accepted the request with a success
    /// status; transport errors and error statuses fail here, before any
    /// byte is handed out.
    async fn open_download(&self, item: &RemoteItem) -> anyhow::Result<Box<dyn IDownloadBody>>;
}
