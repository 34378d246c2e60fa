//! NodeImageInventory - IRemoteInventory implementation for NodeImage
//!
//! Wraps the [`NodeImageClient`] and maps its wire types to the port-level
//! [`RemoteEntry`] DTO.

use anyhow::{Context, Result};
use reqwest::Response;
use tracing::debug;

use nib_core::domain::inventory::RemoteItem;
use nib_core::ports::remote_inventory::{IDownloadBody, IRemoteInventory, RemoteEntry};

use crate::client::{ImageInfo, NodeImageClient};

/// Converts an [`ImageInfo`] into a port-level [`RemoteEntry`]
fn image_to_entry(image: ImageInfo) -> RemoteEntry {
    RemoteEntry {
        id: image.id,
        filename: image.filename,
        size: image.size,
        url: image.links.direct,
    }
}

/// Remote inventory backed by the NodeImage API
#[derive(Clone)]
pub struct NodeImageInventory {
    client: NodeImageClient,
}

impl NodeImageInventory {
    pub fn new(client: NodeImageClient) -> Self {
        Self { client }
    }
}

/// Download body streamed from a `reqwest` response
struct ResponseBody {
    response: Response,
}

#[async_trait::async_trait]
impl IDownloadBody for ResponseBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self
            .response
            .chunk()
            .await
            .context("Failed to read download body")?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

#[async_trait::async_trait]
impl IRemoteInventory for NodeImageInventory {
    async fn list_entries(&self) -> Result<Vec<RemoteEntry>> {
        let images = self
            .client
            .list_images()
            .await
            .context("Failed to fetch remote image list")?;

        Ok(images.into_iter().map(image_to_entry).collect())
    }

    async fn open_download(&self, item: &RemoteItem) -> Result<Box<dyn IDownloadBody>> {
        debug!(filename = %item.filename, "Requesting image content");

        if item.url.is_empty() {
            anyhow::bail!("no download link for {}", item.filename);
        }

        let response = self
            .client
            .start_download(&item.url)
            .await
            .with_context(|| format!("Download of {} failed", item.filename))?;

        Ok(Box::new(ResponseBody { response }))
    }
}
