// Tableshuttle - SQL Server to Azure Blob Storage table mover
// Copyright (c) 2025 Tableshuttle Contributors
// Licensed under the MIT License

//! # Tableshuttle - SQL Server to Azure Blob Storage
//!
//! Tableshuttle moves whole SQL Server tables to and from Azure Blob Storage
//! as delimited flat files. It drives the `bcp`, `sqlcmd` and `az` command
//! line programs and never talks to either service over its own connection.
//!
//! ## Overview
//!
//! - **Export**: bulk copy a table to a local file, optionally gzip it, upload
//!   it, and optionally upload a synthesized `CREATE TABLE` script next to it
//! - **Import**: download a blob, decompress it if needed, and bulk load it
//!   into an existing table
//! - **Batch**: every table of a job runs its own pipeline; one table failing
//!   never stops the others
//! - **Reconciliation**: exported line counts are compared with the source
//!   row count and mismatches are logged
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Batch runner, per-table pipelines, prechecks, compression, DDL
//! - [`adapters`] - Wrappers around the external programs
//! - [`domain`] - Jobs, tasks, column metadata and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured console and per-run file logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tableshuttle::adapters::create_collaborators;
//! use tableshuttle::config::load_config;
//! use tableshuttle::core::batch::BatchRunner;
//! use tableshuttle::domain::{Direction, TransferFlags, TransferJob};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("tableshuttle.toml")?;
//!     config.validate_for(Direction::Export)?;
//!
//!     let job = TransferJob::from_args(
//!         Direction::Export,
//!         "dbo",
//!         "Customers,Orders",
//!         "backups",
//!         "nightly",
//!         None,
//!         TransferFlags { compress: true, ..Default::default() },
//!     )?;
//!
//!     let collaborators = create_collaborators(&config, Direction::Export)?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let summary = BatchRunner::new(&config, collaborators, shutdown_rx)
//!         .run(&job)
//!         .await?;
//!
//!     println!("{}", summary.headline());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::ShuttleError`]. Each error has an
//! [`domain::ErrorKind`] that the CLI maps to an exit code.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
