//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for tableshuttle using clap.

pub mod commands;
pub mod exit_codes;

use crate::domain::Direction;
use clap::{Parser, Subcommand};

/// Tableshuttle - SQL Server to Azure Blob Storage table mover
#[derive(Parser, Debug)]
#[command(name = "tableshuttle")]
#[command(version, about, long_about = None)]
#[command(author = "Tableshuttle Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tableshuttle.toml", env = "TABLESHUTTLE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TABLESHUTTLE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for per-run log files
    #[arg(long, default_value = "logs", env = "TABLESHUTTLE_LOG_DIR")]
    pub log_dir: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Direction of the run, for commands that move data
    pub fn direction(&self) -> Option<Direction> {
        match self.command {
            Commands::Export(_) => Some(Direction::Export),
            Commands::Import(_) => Some(Direction::Import),
            Commands::ValidateConfig(_) | Commands::Init(_) => None,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export tables from SQL Server to blob storage
    Export(commands::export::ExportArgs),

    /// Import tables from blob storage into SQL Server
    Import(commands::import::ImportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
