//! Export command implementation
//!
//! This module implements the `export` command for moving tables from SQL
//! Server to blob storage.

use super::transfer::{run_transfer, TransferArgs};
use crate::domain::{Direction, TransferFlags};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub transfer: TransferArgs,

    /// Gzip each data file before upload
    #[arg(long)]
    pub compress: bool,

    /// Upload a CREATE TABLE script next to each data file
    #[arg(long)]
    pub generate_ddl: bool,

    /// Replace blobs that already exist
    #[arg(long)]
    pub overwrite: bool,
}

impl ExportArgs {
    /// Job flags selected on the command line
    pub fn flags(&self) -> TransferFlags {
        TransferFlags {
            compress: self.compress,
            generate_ddl: self.generate_ddl,
            overwrite: self.overwrite,
            dry_run: self.transfer.dry_run,
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        run_transfer(
            Direction::Export,
            &self.transfer,
            self.flags(),
            config_path,
            shutdown_signal,
        )
        .await
    }
}
