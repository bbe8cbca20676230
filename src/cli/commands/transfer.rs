//! Shared implementation of the `export` and `import` commands

use crate::adapters::create_collaborators;
use crate::cli::exit_codes;
use crate::config::load_config;
use crate::core::batch::BatchRunner;
use crate::domain::{Direction, TransferFlags, TransferJob};
use clap::Args;
use tokio::sync::watch;

/// Arguments common to both directions
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Schema the tables live in
    #[arg(long)]
    pub schema: String,

    /// Comma-separated table names, processed in order
    #[arg(long)]
    pub tables: String,

    /// Blob container
    #[arg(long)]
    pub container: String,

    /// Virtual directory inside the container
    #[arg(long)]
    pub path: String,

    /// Field delimiter: one character, or \t for tab (default)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Log every step instead of performing it
    #[arg(long)]
    pub dry_run: bool,
}

impl TransferArgs {
    /// Builds the job for `direction`
    pub fn to_job(&self, direction: Direction, flags: TransferFlags) -> crate::domain::Result<TransferJob> {
        TransferJob::from_args(
            direction,
            &self.schema,
            &self.tables,
            &self.container,
            &self.path,
            self.delimiter.as_deref(),
            TransferFlags {
                dry_run: self.dry_run,
                ..flags
            },
        )
    }
}

/// Runs one export or import job and returns the process exit code
///
/// Callers instrument this with [`run_span`](crate::logging::run_span) so
/// every record carries the run id.
pub async fn run_transfer(
    direction: Direction,
    args: &TransferArgs,
    flags: TransferFlags,
    config_path: &str,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    tracing::info!(direction = %direction, "Starting {} command", direction);

    let job = match args.to_job(direction, flags) {
        Ok(job) => job,
        Err(e) => {
            crate::log_error_with_context!(&e, "Invalid arguments");
            eprintln!("Invalid arguments: {e}");
            return Ok(exit_codes::CONFIGURATION);
        }
    };

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            return Ok(exit_codes::CONFIGURATION);
        }
    };

    if let Err(e) = config.validate_for(direction) {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("Configuration validation failed: {e}");
        return Ok(exit_codes::CONFIGURATION);
    }

    if job.flags.dry_run {
        tracing::info!("Dry run mode enabled - nothing will be transferred");
        println!("DRY RUN MODE - no external programs will be run and no files written");
        println!();
    }

    let collaborators = match create_collaborators(&config, direction) {
        Ok(c) => c,
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to create collaborators");
            eprintln!("Failed to initialize {direction}: {e}");
            return Ok(exit_codes::CONFIGURATION);
        }
    };

    let mut runner = BatchRunner::new(&config, collaborators, shutdown_signal);
    let summary = match runner.run(&job).await {
        Ok(summary) => summary,
        Err(e) => {
            crate::log_error_with_context!(&e, "Batch aborted before processing tables");
            eprintln!("{} aborted: {e}", capitalized(direction));
            return Ok(exit_codes::for_job_error(&e));
        }
    };

    println!();
    print!("{}", summary.render_table());
    if summary.mismatches() > 0 {
        println!();
        println!(
            "Row count mismatches: {} (see log for details)",
            summary.mismatches()
        );
    }
    println!();
    println!("{}", summary.headline());

    if summary.is_successful() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::TABLE_FAILURES)
    }
}

fn capitalized(direction: Direction) -> &'static str {
    match direction {
        Direction::Export => "Export",
        Direction::Import => "Import",
    }
}
