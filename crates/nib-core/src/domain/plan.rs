//! Sync plan and transfer outcomes
//!
//! [`SyncPlan::compute`] is the diff between a [`RemoteIndex`] and a
//! [`LocalIndex`]. It is a pure function: no I/O, no clock, deterministic
//! for a given pair of indexes.

use serde::Serialize;

use super::inventory::{LocalIndex, LocalItem, RemoteIndex, RemoteItem};

// ============================================================================
// SyncPlan
// ============================================================================

/// The download and delete actions of one run
///
/// Built once and consumed once by the executor. No relative path appears in
/// both lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncPlan {
    /// Remote items with no local counterpart, in listing order
    pub to_download: Vec<RemoteItem>,
    /// Local items with no remote counterpart, in walk order
    pub to_delete: Vec<LocalItem>,
    /// Number of items present on both sides
    pub unchanged: usize,
}

impl SyncPlan {
    /// Classify every remote and local item.
    ///
    /// A matching relative path is enough for an item to count as synced;
    /// sizes and contents are not compared.
    pub fn compute(remote: &RemoteIndex, local: &LocalIndex) -> Self {
        let mut plan = Self::default();

        for item in remote.iter() {
            if local.contains(&item.filename) {
                plan.unchanged += 1;
            } else {
                plan.to_download.push(item.clone());
            }
        }

        plan.to_delete = local
            .iter()
            .filter(|item| !remote.contains(&item.relative))
            .cloned()
            .collect();

        plan
    }

    /// Whether there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.to_download.is_empty() && self.to_delete.is_empty()
    }

    /// Sum of the declared sizes of the items to download
    pub fn download_bytes(&self) -> u64 {
        self.to_download.iter().map(|item| item.size).sum()
    }
}

// ============================================================================
// Transfer outcomes
// ============================================================================

/// Result of a single delete or download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    Succeeded,
    Failed { reason: String },
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Outcome of one item, labelled with its relative path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    /// Relative path of the item
    pub name: String,
    /// Declared size for downloads, `None` for deletions
    pub size: Option<u64>,
    #[serde(flatten)]
    pub outcome: TransferOutcome,
}

impl ItemOutcome {
    pub fn succeeded(name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            name: name.into(),
            size,
            outcome: TransferOutcome::Succeeded,
        }
    }

    pub fn failed(name: impl Into<String>, size: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            outcome: TransferOutcome::Failed {
                reason: reason.into(),
            },
        }
    }
}

/// Outcomes of one executed phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct PhaseOutcome {
    pub items: Vec<ItemOutcome>,
}

impl PhaseOutcome {
    pub fn push(&mut self, outcome: ItemOutcome) {
        self.items.push(outcome);
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|o| o.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Failed items only
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|o| !o.outcome.is_success())
    }
}
