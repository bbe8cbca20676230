//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the tableshuttle configuration file.

use crate::cli::exit_codes;
use crate::config::{load_config, DatabaseConfig, TableShuttleConfig};
use crate::domain::Direction;
use clap::{Args, ValueEnum};

/// Which direction's requirements to check
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateTarget {
    /// Requires `[source]`
    Export,
    /// Requires `[target]`
    Import,
    /// Checks every database section that is present
    Both,
}

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Direction whose requirements must be met
    #[arg(long, value_enum, default_value = "both")]
    pub direction: ValidateTarget,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        match check(&config, self.direction) {
            Ok(()) => {
                println!("Configuration is valid");
                println!();
                print!("{}", render_summary(&config));
                Ok(exit_codes::SUCCESS)
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(exit_codes::CONFIGURATION)
            }
        }
    }
}

fn check(config: &TableShuttleConfig, target: ValidateTarget) -> Result<(), String> {
    match target {
        ValidateTarget::Export => config.validate_for(Direction::Export),
        ValidateTarget::Import => config.validate_for(Direction::Import),
        ValidateTarget::Both => {
            if config.source.is_none() && config.target.is_none() {
                return Err("Neither [source] nor [target] is configured".to_string());
            }
            if config.source.is_some() {
                config.validate_for(Direction::Export)?;
            }
            if config.target.is_some() {
                config.validate_for(Direction::Import)?;
            }
            Ok(())
        }
    }
}

/// Human-readable summary; passwords are never printed
fn render_summary(config: &TableShuttleConfig) -> String {
    let mut out = String::from("Configuration Summary:\n");
    out.push_str(&format!("  Log Level: {}\n", config.application.log_level));
    out.push_str(&database_line("Source", config.source.as_ref()));
    out.push_str(&database_line("Target", config.target.as_ref()));
    out.push_str(&format!(
        "  Storage Account: {} (auth mode: {})\n",
        config.storage.account_name, config.storage.auth_mode
    ));
    out.push_str(&format!(
        "  Login Wait: {}s (login if missing: {})\n",
        config.identity.login_timeout_seconds, config.identity.login_if_missing
    ));
    out.push_str(&format!(
        "  Tools: az={} bcp={} sqlcmd={}\n",
        config.tools.az, config.tools.bcp, config.tools.sqlcmd
    ));
    out.push_str(&format!(
        "  Work Directory: {}\n",
        config.pipeline.work_dir.display()
    ));
    out.push_str(&format!(
        "  Retain On Failure: {}\n",
        config.pipeline.retain_on_failure
    ));
    out
}

fn database_line(label: &str, database: Option<&DatabaseConfig>) -> String {
    match database {
        Some(db) => format!(
            "  {label}: {}@{}/{} (password: ***)\n",
            db.username,
            db.server(),
            db.database
        ),
        None => format!("  {label}: not configured\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        secret_string, ApplicationConfig, IdentityConfig, PipelineConfig, StorageConfig,
        ToolsConfig,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            host: "sql.example.com".to_string(),
            port: Some(1433),
            database: "sales".to_string(),
            username: "exporter".to_string(),
            password: secret_string("hunter2".to_string()),
            trust_server_certificate: false,
            login_timeout_seconds: 30,
        }
    }

    fn config(source: bool, target: bool) -> TableShuttleConfig {
        TableShuttleConfig {
            application: ApplicationConfig::default(),
            source: source.then(database),
            target: target.then(database),
            storage: StorageConfig {
                account_name: "datastaging".to_string(),
                auth_mode: "login".to_string(),
            },
            identity: IdentityConfig::default(),
            tools: ToolsConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    #[test]
    fn test_check_requires_section_for_direction() {
        let export_only = config(true, false);
        assert!(check(&export_only, ValidateTarget::Export).is_ok());
        assert!(check(&export_only, ValidateTarget::Import).is_err());
        assert!(check(&export_only, ValidateTarget::Both).is_ok());
        assert!(check(&config(false, false), ValidateTarget::Both).is_err());
    }

    #[test]
    fn test_summary_redacts_password() {
        let summary = render_summary(&config(true, false));
        assert!(summary.contains("exporter@sql.example.com,1433/sales"));
        assert!(summary.contains("Target: not configured"));
        assert!(!summary.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_execute_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[source]
host = "sql.example.com"
database = "sales"
username = "exporter"
password = "secret"

[storage]
account_name = "datastaging"
"#
        )
        .unwrap();

        let args = ValidateArgs {
            direction: ValidateTarget::Export,
        };
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(args.execute(&path).await.unwrap(), exit_codes::SUCCESS);

        let args = ValidateArgs {
            direction: ValidateTarget::Import,
        };
        assert_eq!(
            args.execute(&path).await.unwrap(),
            exit_codes::CONFIGURATION
        );
    }
}
