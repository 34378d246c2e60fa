//! One-way synchronization engine
//!
//! The [`SyncEngine`] reconciles the sync root against the remote inventory.
//!
//! ## Sync Flow
//!
//! ```text
//! Init -> Listed -> Scanned -> Planned
//!      -> (DeleteGate -> Deleting)? -> (DownloadGate -> Downloading)? -> Done
//! ```
//!
//! 1. **List**: fetch the remote inventory. Failure is fatal.
//! 2. **Scan**: create the sync root if needed and walk it. Failure is fatal.
//! 3. **Plan**: diff the two indexes. An empty plan ends the run.
//! 4. **Delete**: after confirmation, remove local files missing remotely.
//! 5. **Download**: after confirmation, fetch remote files missing locally.
//!
//! Each gate is asked independently; declining one phase does not affect
//! the other.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use nib_core::config::Config;
use nib_core::domain::inventory::{RemoteIndex, RemoteIndexBuild};
use nib_core::domain::plan::{PhaseOutcome, SyncPlan};
use nib_core::ports::confirmation::IConfirmation;
use nib_core::ports::remote_inventory::IRemoteInventory;

use crate::executor::TransferExecutor;
use crate::filesystem::LocalFileSystem;
use crate::scanner::scan_local;
use crate::SyncError;

// ============================================================================
// SyncPhase / SyncMode
// ============================================================================

/// States a sync run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Init,
    Listed,
    Scanned,
    Planned,
    DeleteGate,
    Deleting,
    DownloadGate,
    Downloading,
    Done,
}

/// How far a run goes once the plan is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Ask the gates and apply what they approve
    #[default]
    Apply,
    /// Stop after planning; nothing is asked or changed
    DryRun,
}

// ============================================================================
// SyncReport
// ============================================================================

/// What happened to one phase of the plan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseStatus {
    /// The plan had nothing for this phase, or the run stopped earlier
    Skipped,
    /// The operator declined
    Declined,
    /// The phase ran
    Executed(PhaseOutcome),
}

impl PhaseStatus {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    /// Outcomes, when the phase ran
    pub fn outcome(&self) -> Option<&PhaseOutcome> {
        match self {
            Self::Executed(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Summary of one sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Sync root the run worked on
    pub root: PathBuf,
    /// Number of distinct remote images
    pub remote_count: usize,
    /// Number of local images found by the scan
    pub local_count: usize,
    /// Remote filenames listed more than once
    pub duplicates: Vec<String>,
    /// Remote entries ignored because their name or id was unusable
    pub rejected: Vec<String>,
    /// The computed plan
    pub plan: SyncPlan,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Delete phase result
    pub deletions: PhaseStatus,
    /// Download phase result
    pub downloads: PhaseStatus,
    /// States visited, in order
    pub phases: Vec<SyncPhase>,
}

impl SyncReport {
    /// Local and remote already matched
    pub fn already_in_sync(&self) -> bool {
        self.plan.is_empty()
    }

    /// At least one phase ran
    pub fn any_executed(&self) -> bool {
        self.deletions.is_executed() || self.downloads.is_executed()
    }

    /// Number of failed items across both phases
    pub fn failed(&self) -> usize {
        [&self.deletions, &self.downloads]
            .iter()
            .filter_map(|status| status.outcome())
            .map(PhaseOutcome::failed)
            .sum()
    }
}

// ============================================================================
// PreparedSync
// ============================================================================

/// A listed, scanned and planned run, waiting for execution
#[derive(Debug)]
pub struct PreparedSync {
    /// When the run started
    pub started_at: DateTime<Utc>,
    clock: Instant,
    /// The indexed remote inventory, with duplicates and rejected entries
    pub remote: RemoteIndexBuild,
    /// Number of local images found by the scan
    pub local_count: usize,
    /// The computed plan
    pub plan: SyncPlan,
    phases: Vec<SyncPhase>,
}

// ============================================================================
// SyncEngine
// ============================================================================

const DELETE_PROMPT: &str = "Delete local files that no longer exist remotely?";
const DOWNLOAD_PROMPT: &str = "Download remote images missing locally?";

/// Orchestrates listing, scanning, planning and execution
pub struct SyncEngine {
    inventory: Arc<dyn IRemoteInventory>,
    gate: Arc<dyn IConfirmation>,
    fs: LocalFileSystem,
    workers: usize,
    verify_size: bool,
}

impl SyncEngine {
    /// Create an engine for a validated configuration
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] if the configuration is invalid
    pub fn new(
        config: &Config,
        inventory: Arc<dyn IRemoteInventory>,
        gate: Arc<dyn IConfirmation>,
    ) -> Result<Self, SyncError> {
        let errors = config.validate();
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SyncError::Config(joined));
        }

        Ok(Self {
            inventory,
            gate,
            fs: LocalFileSystem::new(config.dir.clone()),
            workers: config.workers,
            verify_size: config.verify_size,
        })
    }

    /// Fetch the remote inventory and index it
    ///
    /// Duplicate and unusable entries are logged and reported, not fatal.
    pub async fn fetch_remote(&self) -> Result<RemoteIndexBuild, SyncError> {
        let entries = self
            .inventory
            .list_entries()
            .await
            .map_err(SyncError::Fetch)?;

        let build = RemoteIndex::from_entries(entries);
        for name in &build.duplicates {
            warn!(filename = %name, "Duplicate remote filename, keeping the last entry");
        }
        for (name, err) in &build.rejected {
            warn!(filename = %name, %err, "Ignoring remote entry");
        }
        for item in build.index.iter().filter(|item| item.remote_id.is_none()) {
            warn!(filename = %item.filename, "Remote entry has no image id");
        }
        info!(count = build.index.len(), "Remote inventory fetched");
        Ok(build)
    }

    /// List-only mode: fetch and index the remote inventory, touch nothing
    pub async fn list_remote(&self) -> Result<RemoteIndex, SyncError> {
        Ok(self.fetch_remote().await?.index)
    }

    /// Run the first half of a reconciliation: list, scan and plan
    ///
    /// Nothing is changed apart from creating a missing sync root.
    pub async fn prepare(&self) -> Result<PreparedSync, SyncError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut phases = vec![SyncPhase::Init];

        let remote = self.fetch_remote().await?;
        advance(&mut phases, SyncPhase::Listed);

        self.fs.ensure_root().await?;
        let local = scan_local(self.fs.root()).await?;
        info!(count = local.len(), root = %self.fs.root().display(), "Local scan complete");
        advance(&mut phases, SyncPhase::Scanned);

        let plan = SyncPlan::compute(&remote.index, &local);
        info!(
            download = plan.to_download.len(),
            delete = plan.to_delete.len(),
            unchanged = plan.unchanged,
            "Sync plan computed"
        );
        advance(&mut phases, SyncPhase::Planned);

        Ok(PreparedSync {
            started_at,
            clock,
            remote,
            local_count: local.len(),
            plan,
            phases,
        })
    }

    /// Run the second half: ask the gates and apply what they approve
    ///
    /// Per-item failures end up in the report; this step cannot fail as a
    /// whole.
    pub async fn execute(&self, prepared: PreparedSync, mode: SyncMode) -> SyncReport {
        let PreparedSync {
            started_at,
            clock,
            remote,
            local_count,
            plan,
            mut phases,
        } = prepared;

        let mut deletions = PhaseStatus::Skipped;
        let mut downloads = PhaseStatus::Skipped;

        if plan.is_empty() {
            info!("Local directory already in sync");
        } else if mode == SyncMode::DryRun {
            info!("Dry run, nothing applied");
        } else {
            let executor = TransferExecutor::new(
                Arc::clone(&self.inventory),
                self.fs.clone(),
                self.workers,
            )
            .with_size_verification(self.verify_size);

            if !plan.to_delete.is_empty() {
                advance(&mut phases, SyncPhase::DeleteGate);
                let count = plan.to_delete.len();
                if self.ask(DELETE_PROMPT, count).await {
                    advance(&mut phases, SyncPhase::Deleting);
                    deletions = PhaseStatus::Executed(executor.delete_all(&plan.to_delete).await);
                } else {
                    info!(count, "Deletion declined");
                    deletions = PhaseStatus::Declined;
                }
            }

            if !plan.to_download.is_empty() {
                advance(&mut phases, SyncPhase::DownloadGate);
                let count = plan.to_download.len();
                if self.ask(DOWNLOAD_PROMPT, count).await {
                    advance(&mut phases, SyncPhase::Downloading);
                    downloads =
                        PhaseStatus::Executed(executor.download_all(&plan.to_download).await);
                } else {
                    info!(count, "Download declined");
                    downloads = PhaseStatus::Declined;
                }
            }
        }

        advance(&mut phases, SyncPhase::Done);

        SyncReport {
            started_at,
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            root: self.fs.root().to_path_buf(),
            remote_count: remote.index.len(),
            local_count,
            duplicates: remote.duplicates.iter().map(ToString::to_string).collect(),
            rejected: remote.rejected.iter().map(|(name, _)| name.clone()).collect(),
            plan,
            dry_run: mode == SyncMode::DryRun,
            deletions,
            downloads,
            phases,
        }
    }

    /// Run one full reconciliation
    pub async fn sync(&self, mode: SyncMode) -> Result<SyncReport, SyncError> {
        let prepared = self.prepare().await?;
        Ok(self.execute(prepared, mode).await)
    }

    /// Ask the gate off the async runtime; a failed blocking task declines
    async fn ask(&self, prompt: &str, count: usize) -> bool {
        let gate = Arc::clone(&self.gate);
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || gate.confirm(&prompt, count))
            .await
            .unwrap_or(false)
    }
}

fn advance(phases: &mut Vec<SyncPhase>, next: SyncPhase) {
    debug!(phase = ?next, "Sync phase");
    phases.push(next);
}
