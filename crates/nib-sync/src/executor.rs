//! Transfer executor
//!
//! Applies the two halves of a [`SyncPlan`](nib_core::domain::SyncPlan):
//!
//! - **Deletions** run one after another on the calling task.
//! - **Downloads** run as one spawned task per item. A counting semaphore
//!   admits at most `workers` of them to network I/O at a time, and every
//!   task is joined before the phase returns.
//!
//! A failed item is recorded in its [`ItemOutcome`] and never stops the rest
//! of the batch. Nothing is retried.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use nib_core::domain::inventory::{LocalItem, RemoteItem};
use nib_core::domain::plan::{ItemOutcome, PhaseOutcome};
use nib_core::ports::remote_inventory::IRemoteInventory;

use crate::filesystem::LocalFileSystem;
use crate::TransferError;

/// Executes deletions and downloads below one sync root
pub struct TransferExecutor {
    inventory: Arc<dyn IRemoteInventory>,
    fs: LocalFileSystem,
    workers: usize,
    verify_size: bool,
}

impl TransferExecutor {
    /// `workers` is clamped to at least one.
    pub fn new(inventory: Arc<dyn IRemoteInventory>, fs: LocalFileSystem, workers: usize) -> Self {
        Self {
            inventory,
            fs,
            workers: workers.max(1),
            verify_size: false,
        }
    }

    /// Fail downloads whose byte count differs from the declared size
    pub fn with_size_verification(mut self, enabled: bool) -> Self {
        self.verify_size = enabled;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Remove every item, sequentially, in the given order
    pub async fn delete_all(&self, items: &[LocalItem]) -> PhaseOutcome {
        let mut phase = PhaseOutcome::default();

        for item in items {
            let name = item.relative.as_str();
            match self.fs.delete_file(&item.absolute).await {
                Ok(()) => {
                    info!(file = name, "Deleted");
                    phase.push(ItemOutcome::succeeded(name, None));
                }
                Err(err) => {
                    warn!(file = name, %err, "Delete failed");
                    phase.push(ItemOutcome::failed(name, None, err.to_string()));
                }
            }
        }

        phase
    }

    /// Download every item with at most `workers` in flight
    ///
    /// Outcomes are returned in the order of `items`, whatever order the
    /// downloads finished in.
    pub async fn download_all(&self, items: &[RemoteItem]) -> PhaseOutcome {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        debug!(count = items.len(), workers = self.workers, "Starting downloads");

        for (index, item) in items.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let inventory = Arc::clone(&self.inventory);
            let fs = self.fs.clone();
            let verify_size = self.verify_size;

            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => download_one(inventory.as_ref(), &fs, &item, verify_size).await,
                    Err(err) => ItemOutcome::failed(
                        item.filename.as_str(),
                        Some(item.size),
                        TransferError::Aborted(err.to_string()).to_string(),
                    ),
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<ItemOutcome>> = vec![None; items.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(err) => error!(%err, "Download task did not complete"),
            }
        }

        let mut phase = PhaseOutcome::default();
        for (slot, item) in slots.into_iter().zip(items) {
            phase.push(slot.unwrap_or_else(|| {
                ItemOutcome::failed(
                    item.filename.as_str(),
                    Some(item.size),
                    TransferError::Aborted("task panicked or was cancelled".to_string())
                        .to_string(),
                )
            }));
        }
        phase
    }
}

async fn download_one(
    inventory: &dyn IRemoteInventory,
    fs: &LocalFileSystem,
    item: &RemoteItem,
    verify_size: bool,
) -> ItemOutcome {
    let name = item.filename.as_str();

    let result = async {
        let mut body = inventory
            .open_download(item)
            .await
            .map_err(TransferError::Request)?;
        let expected = verify_size.then_some(item.size);
        fs.write_atomic(&item.filename, body.as_mut(), expected).await
    }
    .await;

    match result {
        Ok(written) => {
            info!(file = name, bytes = written, "Downloaded");
            ItemOutcome::succeeded(name, Some(item.size))
        }
        Err(err) => {
            warn!(file = name, %err, "Download failed");
            ItemOutcome::failed(name, Some(item.size), err.to_string())
        }
    }
}
