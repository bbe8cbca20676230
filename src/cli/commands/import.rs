//! Import command implementation
//!
//! This module implements the `import` command for loading tables from blob
//! storage into SQL Server. Loads append; rerunning an import loads the rows
//! again.

use super::transfer::{run_transfer, TransferArgs};
use crate::domain::{Direction, TransferFlags};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub transfer: TransferArgs,

    /// The blobs are gzip-compressed (`<table>.tsv.gz`)
    #[arg(long)]
    pub compressed: bool,
}

impl ImportArgs {
    /// Job flags selected on the command line
    pub fn flags(&self) -> TransferFlags {
        TransferFlags {
            compress: self.compressed,
            dry_run: self.transfer.dry_run,
            ..Default::default()
        }
    }

    /// Execute the import command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        run_transfer(
            Direction::Import,
            &self.transfer,
            self.flags(),
            config_path,
            shutdown_signal,
        )
        .await
    }
}
