//! List command - Print the remote image inventory without syncing

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use nib_api::client::NodeImageClient;
use nib_api::provider::NodeImageInventory;
use nib_core::ports::confirmation::FixedAnswer;
use nib_sync::engine::SyncEngine;

use super::setup::{resolve_config, GlobalArgs};
use crate::output::get_formatter;

/// Options of the list command
#[derive(Debug, Clone, Default, Args)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute(&self, global: &GlobalArgs, json: bool) -> Result<()> {
        let formatter = get_formatter(json);
        let config = resolve_config(global, None, formatter.as_ref())?;

        let client = NodeImageClient::with_base_url(config.token.clone(), config.api_base.clone())
            .with_raw_body_logging(global.debug);
        // Listing never reaches a gate
        let engine = SyncEngine::new(
            &config,
            Arc::new(NodeImageInventory::new(client)),
            Arc::new(FixedAnswer(false)),
        )?;

        let index = engine.list_remote().await?;
        formatter.listing(&index);
        Ok(())
    }
}
