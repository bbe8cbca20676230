//! Configuration management for tableshuttle.
//!
//! # Overview
//!
//! tableshuttle reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TABLESHUTTLE_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Direction-aware validation
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DatabaseConfig`] - `[source]` (export) and `[target]` (import) connections
//! - [`StorageConfig`] - Storage account
//! - [`IdentityConfig`] - Login wait timeout and poll backoff
//! - [`ToolsConfig`] - Paths of `az`, `bcp`, `sqlcmd`
//! - [`PipelineConfig`] - Work directory and retain-on-failure policy
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! host = "sql-prod.example.com"
//! database = "sales"
//! username = "exporter"
//! password = "${SOURCE_DB_PASSWORD}"
//!
//! [target]
//! host = "sql-dev.example.com"
//! database = "sales_copy"
//! username = "loader"
//! password = "${TARGET_DB_PASSWORD}"
//!
//! [storage]
//! account_name = "datastaging"
//!
//! [pipeline]
//! work_dir = "/var/tmp/tableshuttle"
//! retain_on_failure = true
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use tableshuttle::config::load_config;
//! use tableshuttle::domain::Direction;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tableshuttle.toml")?;
//! config.validate_for(Direction::Export)?;
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseConfig, IdentityConfig, PipelineConfig, StorageConfig,
    TableShuttleConfig, ToolsConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
