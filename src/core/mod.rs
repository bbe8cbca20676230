//! Core business logic for tableshuttle.
//!
//! This module contains the orchestration of export and import runs.
//!
//! # Modules
//!
//! - [`batch`] - Batch runner and summary reporting
//! - [`pipeline`] - Per-table export and import pipelines
//! - [`precheck`] - Job-level identity, storage and database checks
//! - [`compression`] - Gzip transport compression
//! - [`reconcile`] - Row-count reconciliation
//! - [`ddl`] - Table definition synthesis
//!
//! # Run Workflow
//!
//! 1. **Precheck**: identity session (with login wait), storage account, database
//! 2. **Per table, in order**: run the export or import pipeline
//! 3. **Fold**: record each table's outcome; one failure fails the batch
//! 4. **Cleanup**: remove local files (kept for failed tables by default)
//! 5. **Report**: log and print the batch summary
//!
//! # Example
//!
//! ```rust,no_run
//! use tableshuttle::adapters::create_collaborators;
//! use tableshuttle::config::load_config;
//! use tableshuttle::core::batch::BatchRunner;
//! use tableshuttle::domain::{Direction, TransferFlags, TransferJob};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tableshuttle.toml")?;
//! let job = TransferJob::from_args(
//!     Direction::Export,
//!     "dbo",
//!     "Customers,Orders",
//!     "backups",
//!     "nightly",
//!     None,
//!     TransferFlags::default(),
//! )?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let collaborators = create_collaborators(&config, job.direction)?;
//! let mut runner = BatchRunner::new(&config, collaborators, shutdown_rx);
//!
//! let summary = runner.run(&job).await?;
//! println!("{}", summary.headline());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod compression;
pub mod ddl;
pub mod pipeline;
pub mod precheck;
pub mod reconcile;
