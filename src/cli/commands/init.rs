//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_codes;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tableshuttle.toml")]
    pub output: String,

    /// Include comments describing every setting
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("Initializing tableshuttle configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_codes::CONFIGURATION);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your servers and storage account", self.output);
                println!("  2. Export SOURCE_DB_PASSWORD and/or TARGET_DB_PASSWORD (or use a .env file)");
                println!("  3. Validate configuration: tableshuttle validate-config");
                println!("  4. Run: tableshuttle export --schema dbo --tables A,B --container C --path P");
                println!();
                Ok(exit_codes::SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, output = %self.output, "Failed to write configuration file");
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_codes::FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# tableshuttle configuration

[application]
log_level = "info"

[source]
host = "sql-prod.example.com"
database = "sales"
username = "exporter"
password = "${SOURCE_DB_PASSWORD}"

[target]
host = "sql-dev.example.com"
database = "sales_copy"
username = "loader"
password = "${TARGET_DB_PASSWORD}"

[storage]
account_name = "datastaging"

[pipeline]
work_dir = "/var/tmp/tableshuttle"
"#
        .to_string()
    }

    /// Generate configuration with every setting and a comment for each
    fn generate_config_with_examples() -> String {
        r#"# tableshuttle configuration
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any key can also be overridden with TABLESHUTTLE_<SECTION>_<KEY>,
# e.g. TABLESHUTTLE_STORAGE_ACCOUNT_NAME.

[application]
# trace | debug | info | warn | error (overridden by --log-level)
log_level = "info"

# Database read by `export`. Not needed for import-only hosts.
[source]
host = "sql-prod.example.com"
# port = 1433
database = "sales"
username = "exporter"
password = "${SOURCE_DB_PASSWORD}"
trust_server_certificate = false
login_timeout_seconds = 30

# Database written by `import`. Not needed for export-only hosts.
[target]
host = "sql-dev.example.com"
# port = 1433
database = "sales_copy"
username = "loader"
password = "${TARGET_DB_PASSWORD}"
trust_server_certificate = false
login_timeout_seconds = 30

[storage]
account_name = "datastaging"
# login (use the signed-in identity) | key (account key lookup by the CLI)
auth_mode = "login"

[identity]
# Start a device-code login when no session is active
login_if_missing = true
# Give up waiting for the login after this long
login_timeout_seconds = 600
initial_poll_interval_ms = 5000
max_poll_interval_ms = 30000
backoff_multiplier = 1.5

[tools]
az = "az"
bcp = "bcp"
sqlcmd = "sqlcmd"

[pipeline]
# Per-table files are staged here while in flight
work_dir = "/var/tmp/tableshuttle"
# Keep a failed table's files for inspection
retain_on_failure = true
"#
        .to_string()
    }
}
