//! Collaborator factory
//!
//! Builds the production collaborators for one run from configuration.

use crate::adapters::azure::{AzureCliBlobStore, AzureCliIdentity};
use crate::adapters::sqlserver::{BcpClient, SqlCmdClient};
use crate::adapters::traits::{BlobStore, BulkCopy, Compressor, DatabaseClient, IdentityProvider};
use crate::config::TableShuttleConfig;
use crate::core::compression::GzipCompressor;
use crate::domain::{Direction, Result, ShuttleError};
use std::sync::Arc;

/// Every external collaborator a run needs
#[derive(Clone)]
pub struct Collaborators {
    /// Cloud identity session
    pub identity: Arc<dyn IdentityProvider>,
    /// Object storage
    pub blobs: Arc<dyn BlobStore>,
    /// Bulk copy utility
    pub bulk: Arc<dyn BulkCopy>,
    /// Query client
    pub database: Arc<dyn DatabaseClient>,
    /// Transport compression
    pub compressor: Arc<dyn Compressor>,
}

/// Create the collaborators for a run in `direction`
///
/// The database side uses `[source]` for exports and `[target]` for imports.
///
/// # Errors
///
/// Returns a configuration error if the database section for `direction`
/// is missing.
pub fn create_collaborators(
    config: &TableShuttleConfig,
    direction: Direction,
) -> Result<Collaborators> {
    let database = config
        .database_for(direction)
        .map_err(ShuttleError::Configuration)?;

    tracing::debug!(
        direction = %direction,
        server = %database.server(),
        database = %database.database,
        storage_account = %config.storage.account_name,
        "Creating collaborators"
    );

    Ok(Collaborators {
        identity: Arc::new(AzureCliIdentity::new(&config.tools.az)),
        blobs: Arc::new(AzureCliBlobStore::new(&config.tools.az, &config.storage)),
        bulk: Arc::new(BcpClient::new(&config.tools.bcp, database.clone())),
        database: Arc::new(SqlCmdClient::new(&config.tools.sqlcmd, database.clone())),
        compressor: Arc::new(GzipCompressor::default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        secret_string, ApplicationConfig, DatabaseConfig, IdentityConfig, PipelineConfig,
        StorageConfig, ToolsConfig,
    };

    fn config(source: bool) -> TableShuttleConfig {
        TableShuttleConfig {
            application: ApplicationConfig::default(),
            source: source.then(|| DatabaseConfig {
                host: "sql".to_string(),
                port: None,
                database: "sales".to_string(),
                username: "u".to_string(),
                password: secret_string("p".to_string()),
                trust_server_certificate: false,
                login_timeout_seconds: 30,
            }),
            target: None,
            storage: StorageConfig {
                account_name: "acct".to_string(),
                auth_mode: "login".to_string(),
            },
            identity: IdentityConfig::default(),
            tools: ToolsConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    #[test]
    fn test_create_collaborators_for_export() {
        let collaborators = create_collaborators(&config(true), Direction::Export).unwrap();
        assert_eq!(collaborators.compressor.name(), "gzip");
    }

    #[test]
    fn test_create_collaborators_requires_database_section() {
        let result = create_collaborators(&config(true), Direction::Import);
        assert!(matches!(result, Err(ShuttleError::Configuration(_))));
    }
}
