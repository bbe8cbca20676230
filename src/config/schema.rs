//! Configuration schema types
//!
//! This module defines the TOML configuration structure for tableshuttle.

use crate::config::SecretString;
use crate::domain::Direction;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main tableshuttle configuration
///
/// Export runs read `[source]`, import runs read `[target]`; the other
/// section may be absent. Use [`TableShuttleConfig::validate_for`] to check
/// that everything a given direction needs is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableShuttleConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Database read by `export`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DatabaseConfig>,

    /// Database written by `import`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<DatabaseConfig>,

    /// Blob storage account
    pub storage: StorageConfig,

    /// Cloud identity session handling
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Locations of the external programs
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Local staging and cleanup policy
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl TableShuttleConfig {
    /// Validates the settings shared by both directions
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.storage.validate()?;
        self.identity.validate()?;
        self.tools.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }

    /// Validates everything a run in `direction` needs
    pub fn validate_for(&self, direction: Direction) -> Result<(), String> {
        self.validate()?;
        self.database_for(direction)?.validate(database_section(direction))
    }

    /// The database a run in `direction` talks to
    pub fn database_for(&self, direction: Direction) -> Result<&DatabaseConfig, String> {
        let section = match direction {
            Direction::Export => self.source.as_ref(),
            Direction::Import => self.target.as_ref(),
        };
        section.ok_or_else(|| {
            format!(
                "[{}] configuration is required for {}",
                database_section(direction),
                direction
            )
        })
    }
}

/// TOML section name holding the database for `direction`
pub fn database_section(direction: Direction) -> &'static str {
    match direction {
        Direction::Export => "source",
        Direction::Import => "target",
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// SQL Server connection settings shared by the bulk copy and query clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Server host name (optionally `host\instance`)
    pub host: String,

    /// TCP port, when not the default
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name
    pub database: String,

    /// SQL login
    pub username: String,

    /// SQL login password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Trust the server certificate without validation
    #[serde(default)]
    pub trust_server_certificate: bool,

    /// Login timeout handed to the query client, in seconds
    #[serde(default = "default_login_timeout_seconds")]
    pub login_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self, section: &str) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.host.trim().is_empty() {
            return Err(format!("{section}.host cannot be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(format!("{section}.database cannot be empty"));
        }
        if self.username.trim().is_empty() {
            return Err(format!("{section}.username cannot be empty"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(format!("{section}.password cannot be empty"));
        }
        if self.login_timeout_seconds == 0 {
            return Err(format!("{section}.login_timeout_seconds must be > 0"));
        }
        Ok(())
    }

    /// Server argument in the `host[,port]` form both tools accept
    pub fn server(&self) -> String {
        match self.port {
            Some(port) => format!("{},{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

/// Blob storage account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage account name
    pub account_name: String,

    /// How the CLI authorizes blob operations (login or key)
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.account_name.trim().is_empty() {
            return Err("storage.account_name cannot be empty".to_string());
        }
        let valid_modes = ["login", "key"];
        if !valid_modes.contains(&self.auth_mode.as_str()) {
            return Err(format!(
                "Invalid storage.auth_mode '{}'. Must be one of: {}",
                self.auth_mode,
                valid_modes.join(", ")
            ));
        }
        Ok(())
    }
}

/// Cloud identity configuration
///
/// Governs the wait for an interactive device-code login when no session is
/// active at startup. The poll interval starts at `initial_poll_interval_ms`
/// and grows by `backoff_multiplier` up to `max_poll_interval_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Start a device-code login when no session is active
    #[serde(default = "default_true")]
    pub login_if_missing: bool,

    /// Give up waiting for the login after this many seconds
    #[serde(default = "default_login_wait_seconds")]
    pub login_timeout_seconds: u64,

    /// First poll interval in milliseconds
    #[serde(default = "default_initial_poll_interval_ms")]
    pub initial_poll_interval_ms: u64,

    /// Largest poll interval in milliseconds
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,

    /// Growth factor between polls
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            login_if_missing: true,
            login_timeout_seconds: default_login_wait_seconds(),
            initial_poll_interval_ms: default_initial_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl IdentityConfig {
    fn validate(&self) -> Result<(), String> {
        if self.login_timeout_seconds == 0 {
            return Err("identity.login_timeout_seconds must be > 0".to_string());
        }
        if self.initial_poll_interval_ms == 0 {
            return Err("identity.initial_poll_interval_ms must be > 0".to_string());
        }
        if self.max_poll_interval_ms < self.initial_poll_interval_ms {
            return Err(format!(
                "identity.max_poll_interval_ms ({}) must be >= initial_poll_interval_ms ({})",
                self.max_poll_interval_ms, self.initial_poll_interval_ms
            ));
        }
        if !(1.0..=10.0).contains(&self.backoff_multiplier) {
            return Err(format!(
                "identity.backoff_multiplier must be between 1.0 and 10.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

/// Paths of the external programs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Azure CLI
    #[serde(default = "default_az_path")]
    pub az: String,

    /// Bulk copy utility
    #[serde(default = "default_bcp_path")]
    pub bcp: String,

    /// Query client
    #[serde(default = "default_sqlcmd_path")]
    pub sqlcmd: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            az: default_az_path(),
            bcp: default_bcp_path(),
            sqlcmd: default_sqlcmd_path(),
        }
    }
}

impl ToolsConfig {
    fn validate(&self) -> Result<(), String> {
        for (key, value) in [("az", &self.az), ("bcp", &self.bcp), ("sqlcmd", &self.sqlcmd)] {
            if value.trim().is_empty() {
                return Err(format!("tools.{key} cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Local staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding per-table files while they are in flight
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Keep a failed table's local files for post-mortem inspection
    #[serde(default = "default_true")]
    pub retain_on_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            retain_on_failure: true,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.work_dir.as_os_str().is_empty() {
            return Err("pipeline.work_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_login_timeout_seconds() -> u64 {
    30
}

fn default_auth_mode() -> String {
    "login".to_string()
}

fn default_login_wait_seconds() -> u64 {
    600
}

fn default_initial_poll_interval_ms() -> u64 {
    5_000
}

fn default_max_poll_interval_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_az_path() -> String {
    "az".to_string()
}

fn default_bcp_path() -> String {
    "bcp".to_string()
}

fn default_sqlcmd_path() -> String {
    "sqlcmd".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}
