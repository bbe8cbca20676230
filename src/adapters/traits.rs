//! Collaborator traits
//!
//! The orchestrator only talks to the outside world through these traits.
//! Production implementations shell out to the Azure CLI, `bcp` and
//! `sqlcmd`; tests substitute recording fakes.

use crate::domain::{
    ColumnMetadata, ContainerName, Delimiter, PrimaryKey, Result, SchemaName, TableName,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// How an upload treats an existing blob of the same name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace whatever is there
    Overwrite,
    /// Fail if the blob already exists
    CreateNew,
}

impl WriteMode {
    /// Maps the job's overwrite flag to a write mode
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::CreateNew
        }
    }
}

/// Cloud identity session
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether a usable session is active right now
    ///
    /// # Errors
    ///
    /// Returns an error only if the check itself could not be performed;
    /// "no session" is `Ok(false)`.
    async fn has_active_session(&self) -> Result<bool>;

    /// Starts a non-interactive login flow and returns without waiting
    ///
    /// Completion is detected by polling [`IdentityProvider::has_active_session`].
    async fn start_login(&self) -> Result<()>;
}

/// Object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Verifies that the configured storage account exists and is reachable
    async fn check_account(&self) -> Result<()>;

    /// Uploads a local file to `container/blob_name`
    ///
    /// # Errors
    ///
    /// With [`WriteMode::CreateNew`] an existing blob yields
    /// `StorageError::BlobAlreadyExists`.
    async fn upload(
        &self,
        container: &ContainerName,
        blob_name: &str,
        file: &Path,
        mode: WriteMode,
    ) -> Result<()>;

    /// Downloads `container/blob_name` to a local file
    ///
    /// # Errors
    ///
    /// A missing blob yields `StorageError::BlobNotFound`.
    async fn download(&self, container: &ContainerName, blob_name: &str, file: &Path)
        -> Result<()>;

    /// Whether `container/blob_name` exists
    async fn exists(&self, container: &ContainerName, blob_name: &str) -> Result<bool>;
}

/// Bulk transfer between a flat file and a table
#[async_trait]
pub trait BulkCopy: Send + Sync {
    /// Writes every row of `schema.table` to `file`
    async fn export_table(
        &self,
        schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
    ) -> Result<()>;

    /// Appends the rows of `file` to `schema.table`
    ///
    /// The load aborts on the first rejected row; rejected-row diagnostics
    /// are written to `error_file`.
    ///
    /// # Errors
    ///
    /// A rejected row yields `DatabaseError::RowsRejected`.
    async fn import_table(
        &self,
        schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
        error_file: &Path,
    ) -> Result<()>;
}

/// Scalar and catalog queries
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Runs a trivial query to prove the endpoint answers
    async fn test_connection(&self) -> Result<()>;

    /// Number of rows in `schema.table`
    async fn row_count(&self, schema: &SchemaName, table: &TableName) -> Result<u64>;

    /// Column metadata of `schema.table` in ordinal order
    async fn table_columns(
        &self,
        schema: &SchemaName,
        table: &TableName,
    ) -> Result<Vec<ColumnMetadata>>;

    /// Primary key of `schema.table`, if it has one
    async fn primary_key(&self, schema: &SchemaName, table: &TableName)
        -> Result<Option<PrimaryKey>>;
}

/// In-place file compression
///
/// Both operations replace their input: the source file is removed once the
/// output has been fully written.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Compresses `file` to `file` + suffix and returns the new path
    async fn compress(&self, file: &Path) -> Result<PathBuf>;

    /// Decompresses `file`, dropping its suffix, and returns the new path
    async fn decompress(&self, file: &Path) -> Result<PathBuf>;

    /// Codec name for logs
    fn name(&self) -> &'static str;
}
