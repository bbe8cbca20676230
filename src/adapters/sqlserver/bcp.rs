//! Bulk copy through the `bcp` utility

use super::{classify_database_failure, qualified_name};
use crate::adapters::process::ToolCommand;
use crate::adapters::traits::BulkCopy;
use crate::config::DatabaseConfig;
use crate::domain::{DatabaseError, Delimiter, Result, SchemaName, TableName};
use async_trait::async_trait;
use std::path::Path;

/// Longest excerpt of a rejected-row file carried into an error message
const MAX_REJECTED_EXCERPT: usize = 1_000;

/// `bcp` wrapper
///
/// Exports use character mode (`-c`) with the job's field terminator. Imports
/// abort on the first rejected row (`-m 1`) and write diagnostics to the
/// table's error file.
pub struct BcpClient {
    bcp: String,
    database: DatabaseConfig,
}

impl BcpClient {
    /// Creates a client for the given database
    pub fn new(bcp: impl Into<String>, database: DatabaseConfig) -> Self {
        Self {
            bcp: bcp.into(),
            database,
        }
    }

    fn command(
        &self,
        schema: &SchemaName,
        table: &TableName,
        direction: &str,
        file: &Path,
        delimiter: Delimiter,
    ) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.bcp)
            .arg(qualified_name(schema, table))
            .arg(direction)
            .arg(file.to_string_lossy())
            .args(["-S", self.database.server().as_str()])
            .args(["-d", self.database.database.as_str()])
            .args(["-U", self.database.username.as_str()])
            .arg("-P")
            .secret_arg(&self.database.password)
            .arg("-c")
            .arg("-t")
            .arg(delimiter.as_char().to_string());
        if self.database.trust_server_certificate {
            cmd = cmd.arg("-u");
        }
        cmd
    }

    /// Export command line, without running it
    pub fn export_command(
        &self,
        schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
    ) -> ToolCommand {
        self.command(schema, table, "out", file, delimiter)
    }

    /// Import command line, without running it
    pub fn import_command(
        &self,
        schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
        error_file: &Path,
    ) -> ToolCommand {
        self.command(schema, table, "in", file, delimiter)
            .args(["-m", "1"])
            .arg("-e")
            .arg(error_file.to_string_lossy())
    }
}

/// Contents of the rejected-row file, if it exists and is not blank
async fn read_rejected_rows(error_file: &Path) -> Option<String> {
    match tokio::fs::read_to_string(error_file).await {
        Ok(contents) if !contents.trim().is_empty() => Some(contents),
        Ok(_) => None,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(
                file = %error_file.display(),
                error = %e,
                "Could not read rejected-row file"
            );
            None
        }
    }
}

fn rejected_error(subject: &str, contents: &str) -> DatabaseError {
    let mut excerpt: String = contents.trim().chars().take(MAX_REJECTED_EXCERPT).collect();
    if contents.trim().chars().count() > MAX_REJECTED_EXCERPT {
        excerpt.push_str("...");
    }
    DatabaseError::RowsRejected(format!("{subject}: {excerpt}"))
}

#[async_trait]
impl BulkCopy for BcpClient {
    async fn export_table(
        &self,
        schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
    ) -> Result<()> {
        let subject = qualified_name(schema, table);
        let output = self
            .export_command(schema, table, file, delimiter)
            .run()
            .await?;

        if !output.success() {
            return Err(
                classify_database_failure(&output, &subject, DatabaseError::BulkCopyFailed).into(),
            );
        }
        tracing::debug!(table = %subject, output = %output.stdout.trim(), "bcp out finished");
        Ok(())
    }

    async fn import_table(
        &self,
        schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
        error_file: &Path,
    ) -> Result<()> {
        let subject = qualified_name(schema, table);
        let output = self
            .import_command(schema, table, file, delimiter, error_file)
            .run()
            .await?;

        // bcp can exit 0 after stopping at the error limit, so the error file decides
        if let Some(rejected) = read_rejected_rows(error_file).await {
            tracing::error!(
                table = %subject,
                error_file = %error_file.display(),
                rejected = %rejected.trim(),
                "Destination rejected rows"
            );
            return Err(rejected_error(&subject, &rejected).into());
        }

        if !output.success() {
            return Err(
                classify_database_failure(&output, &subject, DatabaseError::BulkCopyFailed).into(),
            );
        }
        tracing::debug!(table = %subject, output = %output.stdout.trim(), "bcp in finished");
        Ok(())
    }
}
