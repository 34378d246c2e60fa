//! nib CLI - Back up a NodeImage library to a local directory
//!
//! Provides commands for:
//! - Mirroring the remote library locally (default)
//! - Listing the remote library

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{list::ListCommand, setup::GlobalArgs, sync::SyncCommand};

#[derive(Debug, Parser)]
#[command(
    name = "nib",
    version,
    about = "Mirror your NodeImage library into a local directory",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalArgs,

    /// Options for the default sync command
    #[command(flatten)]
    sync: SyncCommand,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synchronize the local directory with NodeImage (default)
    Sync(SyncCommand),
    /// List remote images
    List(ListCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match (cli.verbose, cli.global.debug) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        None => cli.sync.execute(&cli.global, cli.json).await,
        Some(Commands::Sync(cmd)) => cmd.execute(&cli.global, cli.json).await,
        Some(Commands::List(cmd)) => cmd.execute(&cli.global, cli.json).await,
    }
}
