//! SQL Server adapters
//!
//! Bulk copy goes through `bcp`; scalar and catalog queries go through
//! `sqlcmd`. Both tools read the same [`DatabaseConfig`](crate::config::DatabaseConfig).

pub mod bcp;
pub mod sqlcmd;

pub use bcp::BcpClient;
pub use sqlcmd::SqlCmdClient;

use crate::adapters::process::ProcessOutput;
use crate::domain::{DatabaseError, SchemaName, TableName};

/// Bracket-quotes an identifier, doubling any closing bracket
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// `[schema].[table]`
pub fn qualified_name(schema: &SchemaName, table: &TableName) -> String {
    format!(
        "{}.{}",
        quote_identifier(schema.as_str()),
        quote_identifier(table.as_str())
    )
}

/// Maps failure output of either tool to a database error
///
/// `fallback` builds the error used when nothing more specific matches.
pub(crate) fn classify_database_failure(
    output: &ProcessOutput,
    subject: &str,
    fallback: fn(String) -> DatabaseError,
) -> DatabaseError {
    let diagnostics = output.diagnostics();
    let lower = diagnostics.to_lowercase();
    let message = format!("{subject}: {diagnostics}");

    if lower.contains("login failed") || (lower.contains("password") && lower.contains("expired")) {
        DatabaseError::AuthenticationFailed(message)
    } else if lower.contains("invalid object name")
        || lower.contains("cannot open database")
        || lower.contains("does not exist")
    {
        DatabaseError::ObjectNotFound(message)
    } else if lower.contains("login timeout expired")
        || lower.contains("tcp provider")
        || lower.contains("server was not found")
        || lower.contains("network-related")
        || lower.contains("unable to complete login process")
    {
        DatabaseError::ConnectionFailed(message)
    } else {
        fallback(message)
    }
}
