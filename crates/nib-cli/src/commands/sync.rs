//! Sync command - Mirror the NodeImage library into the local directory
//!
//! Provides the `nib sync` CLI command (also the default command) which:
//! 1. Resolves the configuration
//! 2. Creates the NodeImage adapter and the stdin confirmation gate
//! 3. Lists, scans and plans, then prints the plan
//! 4. Executes the plan behind the confirmation gates and prints the report

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use nib_api::client::NodeImageClient;
use nib_api::provider::NodeImageInventory;
use nib_sync::engine::{SyncEngine, SyncMode};
use nib_sync::gate::stdin_gate;

use super::setup::{resolve_config, GlobalArgs};
use crate::output::get_formatter;

/// Options of the sync command
#[derive(Debug, Clone, Default, Args)]
pub struct SyncCommand {
    /// Number of concurrent downloads (overrides the config file)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    pub async fn execute(&self, global: &GlobalArgs, json: bool) -> Result<()> {
        let formatter = get_formatter(json);
        let config = resolve_config(global, self.workers, formatter.as_ref())?;

        let client = NodeImageClient::with_base_url(config.token.clone(), config.api_base.clone())
            .with_raw_body_logging(global.debug);
        let inventory = Arc::new(NodeImageInventory::new(client));
        let engine = SyncEngine::new(&config, inventory, Arc::new(stdin_gate()))?;

        info!(dir = %config.dir.display(), workers = config.workers, "Starting sync");
        let prepared = engine.prepare().await?;
        formatter.plan(&prepared);

        let mode = if self.dry_run {
            SyncMode::DryRun
        } else {
            SyncMode::Apply
        };
        let report = engine.execute(prepared, mode).await;
        formatter.report(&report);

        Ok(())
    }
}
