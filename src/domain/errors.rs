//! Domain error types
//!
//! This module defines the error hierarchy for tableshuttle. Errors raised by
//! external collaborators are classified into [`ErrorKind`] so the batch
//! runner can decide between job-level, per-table and advisory handling.
//! No third-party error types leak out of this module.

use thiserror::Error;

/// Main tableshuttle error type
///
/// This is the primary error type used throughout the application.
/// It wraps collaborator-specific error types and provides a classification
/// through [`ShuttleError::kind`].
#[derive(Debug, Error)]
pub enum ShuttleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Blob storage and cloud identity errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bulk copy and query client errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Invalid job or argument values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Compression or decompression failures
    #[error("Compression error: {0}")]
    Compression(String),

    /// Failure to launch or wait for an external program
    #[error("Process error: {0}")]
    Process(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// A wait was cancelled by the shutdown signal
    #[error("Interrupted: {0}")]
    Interrupted(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Classification of a failure, independent of which collaborator raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Endpoint unreachable or network failure
    Connection,
    /// Missing or rejected credentials
    Authentication,
    /// Object, account or table does not exist
    NotFound,
    /// Conditional write refused because the target already exists
    Conflict,
    /// Destination rejected one or more rows
    DataRejected,
    /// External tool exited with a failure that fits no other kind
    Tool,
    /// Local file system failure
    Io,
    /// Configuration problem
    Configuration,
    /// Invalid input
    Validation,
    /// Cancelled by shutdown signal
    Interrupted,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Authentication => "authentication",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::DataRejected => "data-rejected",
            ErrorKind::Tool => "tool",
            ErrorKind::Io => "io",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// Blob storage and identity errors
///
/// Raised by the object store and cloud identity adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage endpoint could not be reached
    #[error("Failed to connect to storage: {0}")]
    ConnectionFailed(String),

    /// No active session or credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Storage account does not exist or is not visible
    #[error("Storage account not found: {0}")]
    AccountNotFound(String),

    /// Blob does not exist
    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    /// Conditional upload refused
    #[error("Blob may already exist; use --overwrite to replace it: {0}")]
    BlobAlreadyExists(String),

    /// Any other upload/download failure
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// The identity login did not complete in time
    #[error("Login timed out after {0} seconds")]
    LoginTimeout(u64),
}

/// Database errors
///
/// Raised by the bulk copy utility and query client adapters.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Database endpoint could not be reached
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Login rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Query returned a non-zero status
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Query succeeded but returned something unparseable
    #[error("Unexpected query result: {0}")]
    InvalidResult(String),

    /// Bulk copy exited with a failure
    #[error("Bulk copy failed: {0}")]
    BulkCopyFailed(String),

    /// Bulk load aborted because a row was rejected
    #[error("Rows rejected by destination: {0}")]
    RowsRejected(String),
}

impl ShuttleError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShuttleError::Configuration(_) => ErrorKind::Configuration,
            ShuttleError::Validation(_) => ErrorKind::Validation,
            ShuttleError::Compression(_) | ShuttleError::Io(_) => ErrorKind::Io,
            ShuttleError::Process(_) | ShuttleError::Other(_) => ErrorKind::Tool,
            ShuttleError::Interrupted(_) => ErrorKind::Interrupted,
            ShuttleError::Storage(e) => match e {
                StorageError::ConnectionFailed(_) => ErrorKind::Connection,
                StorageError::AuthenticationFailed(_) | StorageError::LoginTimeout(_) => {
                    ErrorKind::Authentication
                }
                StorageError::AccountNotFound(_) | StorageError::BlobNotFound(_) => {
                    ErrorKind::NotFound
                }
                StorageError::BlobAlreadyExists(_) => ErrorKind::Conflict,
                StorageError::TransferFailed(_) => ErrorKind::Tool,
            },
            ShuttleError::Database(e) => match e {
                DatabaseError::ConnectionFailed(_) => ErrorKind::Connection,
                DatabaseError::AuthenticationFailed(_) => ErrorKind::Authentication,
                DatabaseError::ObjectNotFound(_) => ErrorKind::NotFound,
                DatabaseError::RowsRejected(_) => ErrorKind::DataRejected,
                DatabaseError::QueryFailed(_)
                | DatabaseError::InvalidResult(_)
                | DatabaseError::BulkCopyFailed(_) => ErrorKind::Tool,
            },
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ShuttleError {
    fn from(err: std::io::Error) -> Self {
        ShuttleError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ShuttleError {
    fn from(err: toml::de::Error) -> Self {
        ShuttleError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuttle_error_display() {
        let err = ShuttleError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage_err = StorageError::BlobNotFound("c/p/a.tsv".to_string());
        let err: ShuttleError = storage_err.into();
        assert!(matches!(err, ShuttleError::Storage(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_conflict_is_distinct_from_transfer_failure() {
        let conflict: ShuttleError = StorageError::BlobAlreadyExists("p/a.tsv".into()).into();
        let generic: ShuttleError = StorageError::TransferFailed("boom".into()).into();

        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert_eq!(generic.kind(), ErrorKind::Tool);
        assert!(conflict.to_string().contains("already exist"));
        assert!(conflict.to_string().contains("--overwrite"));
    }

    #[test]
    fn test_database_error_kinds() {
        let rejected: ShuttleError = DatabaseError::RowsRejected("row 3".into()).into();
        assert_eq!(rejected.kind(), ErrorKind::DataRejected);

        let conn: ShuttleError = DatabaseError::ConnectionFailed("timeout".into()).into();
        assert_eq!(conn.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_login_timeout_is_authentication() {
        let err: ShuttleError = StorageError::LoginTimeout(600).into();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("600"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ShuttleError = io_err.into();
        assert!(matches!(err, ShuttleError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: ShuttleError = toml_err.into();
        assert!(matches!(err, ShuttleError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::DataRejected.to_string(), "data-rejected");
        assert_eq!(ErrorKind::NotFound.to_string(), "not-found");
    }
}
