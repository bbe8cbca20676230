//! Recording fakes for the external collaborators
//!
//! Each fake appends a line to a shared call log, so tests can assert both
//! what happened and in which order.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tableshuttle::adapters::{
    BlobStore, BulkCopy, Collaborators, Compressor, DatabaseClient, IdentityProvider, WriteMode,
};
use tableshuttle::config::{
    secret_string, ApplicationConfig, DatabaseConfig, IdentityConfig, PipelineConfig,
    StorageConfig, TableShuttleConfig, ToolsConfig,
};
use tableshuttle::core::compression::GzipCompressor;
use tableshuttle::domain::{
    ColumnMetadata, ContainerName, DatabaseError, Delimiter, KeyColumn, PrimaryKey, Result,
    SchemaName, ShuttleError, StorageError, TableName,
};

/// Shared, ordered log of collaborator calls
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.all().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.all().iter().any(|c| c == call)
    }
}

pub struct FakeIdentity {
    pub active: bool,
    pub calls: CallLog,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn has_active_session(&self) -> Result<bool> {
        self.calls.push("identity.has_active_session");
        Ok(self.active)
    }

    async fn start_login(&self) -> Result<()> {
        self.calls.push("identity.start_login");
        Ok(())
    }
}

/// Blob contents keyed by `container/blob`
pub type Blobs = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// In-memory blob store
pub struct FakeBlobStore {
    pub blobs: Blobs,
    pub account_missing: bool,
    pub fail_uploads: HashSet<String>,
    pub calls: CallLog,
}

impl FakeBlobStore {
    fn key(container: &ContainerName, blob_name: &str) -> String {
        format!("{container}/{blob_name}")
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn check_account(&self) -> Result<()> {
        self.calls.push("blobs.check_account");
        if self.account_missing {
            return Err(StorageError::AccountNotFound("datastaging".to_string()).into());
        }
        Ok(())
    }

    async fn upload(
        &self,
        container: &ContainerName,
        blob_name: &str,
        file: &Path,
        mode: WriteMode,
    ) -> Result<()> {
        self.calls.push(format!("blobs.upload {blob_name} {mode:?}"));
        if self.fail_uploads.contains(blob_name) {
            return Err(StorageError::ConnectionFailed("network unreachable".to_string()).into());
        }
        let key = Self::key(container, blob_name);
        let mut blobs = self.blobs.lock().unwrap();
        if mode == WriteMode::CreateNew && blobs.contains_key(&key) {
            return Err(StorageError::BlobAlreadyExists(key).into());
        }
        let bytes = std::fs::read(file)?;
        blobs.insert(key, bytes);
        Ok(())
    }

    async fn download(&self, container: &ContainerName, blob_name: &str, file: &Path) -> Result<()> {
        self.calls.push(format!("blobs.download {blob_name}"));
        let bytes = self
            .blobs
            .lock()
            .unwrap()
            .get(&Self::key(container, blob_name))
            .cloned()
            .ok_or_else(|| StorageError::BlobNotFound(blob_name.to_string()))?;
        std::fs::write(file, bytes)?;
        Ok(())
    }

    async fn exists(&self, container: &ContainerName, blob_name: &str) -> Result<bool> {
        self.calls.push(format!("blobs.exists {blob_name}"));
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .contains_key(&Self::key(container, blob_name)))
    }
}

/// Table contents shared between the bulk copy and query fakes
pub type Tables = Arc<Mutex<HashMap<String, u64>>>;

pub struct FakeBulkCopy {
    pub tables: Tables,
    pub fail_export: HashSet<String>,
    pub reject_import: HashSet<String>,
    pub calls: CallLog,
}

#[async_trait]
impl BulkCopy for FakeBulkCopy {
    async fn export_table(
        &self,
        _schema: &SchemaName,
        table: &TableName,
        file: &Path,
        delimiter: Delimiter,
    ) -> Result<()> {
        self.calls.push(format!("bulk.export {table}"));
        if self.fail_export.contains(table.as_str()) {
            return Err(DatabaseError::BulkCopyFailed(format!("bcp exited with 1 for {table}")).into());
        }
        let rows = self
            .tables
            .lock()
            .unwrap()
            .get(table.as_str())
            .copied()
            .unwrap_or(0);
        let d = delimiter.as_char();
        let contents: String = (1..=rows).map(|i| format!("{i}{d}row {i}\n")).collect();
        std::fs::write(file, contents)?;
        Ok(())
    }

    async fn import_table(
        &self,
        _schema: &SchemaName,
        table: &TableName,
        file: &Path,
        _delimiter: Delimiter,
        error_file: &Path,
    ) -> Result<()> {
        self.calls.push(format!("bulk.import {table}"));
        if self.reject_import.contains(table.as_str()) {
            std::fs::write(error_file, "#@ Row 1, Column 2: String data, right truncation\n")?;
            return Err(DatabaseError::RowsRejected(format!("row 1 of {table}")).into());
        }
        let contents = std::fs::read_to_string(file)?;
        let lines = contents.lines().count() as u64;
        *self
            .tables
            .lock()
            .unwrap()
            .entry(table.as_str().to_string())
            .or_insert(0) += lines;
        Ok(())
    }
}

pub struct FakeDatabase {
    pub tables: Tables,
    /// Source counts that differ from what the table actually holds
    pub reported_counts: HashMap<String, u64>,
    pub unreachable: bool,
    pub calls: CallLog,
}

#[async_trait]
impl DatabaseClient for FakeDatabase {
    async fn test_connection(&self) -> Result<()> {
        self.calls.push("database.test_connection");
        if self.unreachable {
            return Err(DatabaseError::ConnectionFailed("TCP Provider: timeout".to_string()).into());
        }
        Ok(())
    }

    async fn row_count(&self, _schema: &SchemaName, table: &TableName) -> Result<u64> {
        self.calls.push(format!("database.row_count {table}"));
        if let Some(count) = self.reported_counts.get(table.as_str()) {
            return Ok(*count);
        }
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table.as_str())
            .copied()
            .unwrap_or(0))
    }

    async fn table_columns(
        &self,
        _schema: &SchemaName,
        table: &TableName,
    ) -> Result<Vec<ColumnMetadata>> {
        self.calls.push(format!("database.table_columns {table}"));
        Ok(vec![
            ColumnMetadata {
                name: "Id".to_string(),
                data_type: "int".to_string(),
                max_length: None,
                precision: None,
                scale: None,
                nullable: false,
                ordinal: 1,
            },
            ColumnMetadata {
                name: "Name".to_string(),
                data_type: "nvarchar".to_string(),
                max_length: Some(100),
                precision: None,
                scale: None,
                nullable: true,
                ordinal: 2,
            },
        ])
    }

    async fn primary_key(
        &self,
        _schema: &SchemaName,
        table: &TableName,
    ) -> Result<Option<PrimaryKey>> {
        self.calls.push(format!("database.primary_key {table}"));
        Ok(Some(PrimaryKey {
            constraint_name: format!("PK_{table}"),
            columns: vec![KeyColumn {
                name: "Id".to_string(),
                ordinal: 1,
            }],
        }))
    }
}

/// Real gzip, with every call recorded
pub struct RecordingCompressor {
    pub inner: GzipCompressor,
    pub fail_compress: bool,
    pub calls: CallLog,
}

#[async_trait]
impl Compressor for RecordingCompressor {
    async fn compress(&self, file: &Path) -> Result<PathBuf> {
        self.calls.push(format!("compressor.compress {}", file_name(file)));
        if self.fail_compress {
            return Err(ShuttleError::Compression(format!(
                "No space left on device writing {}.gz",
                file_name(file)
            )));
        }
        self.inner.compress(file).await
    }

    async fn decompress(&self, file: &Path) -> Result<PathBuf> {
        self.calls.push(format!("compressor.decompress {}", file_name(file)));
        self.inner.decompress(file).await
    }

    fn name(&self) -> &'static str {
        "gzip"
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Configures the fakes for one test
pub struct Harness {
    pub calls: CallLog,
    pub tables: Tables,
    pub blobs: Blobs,
    pub identity_active: bool,
    pub login_if_missing: bool,
    pub account_missing: bool,
    pub database_unreachable: bool,
    pub fail_uploads: HashSet<String>,
    pub fail_export: HashSet<String>,
    pub reject_import: HashSet<String>,
    pub fail_compress: bool,
    pub reported_counts: HashMap<String, u64>,
}

impl Default for Harness {
    fn default() -> Self {
        let calls = CallLog::default();
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
            calls,
            tables: Arc::new(Mutex::new(HashMap::new())),
            identity_active: true,
            login_if_missing: true,
            account_missing: false,
            database_unreachable: false,
            fail_uploads: HashSet::new(),
            fail_export: HashSet::new(),
            reject_import: HashSet::new(),
            fail_compress: false,
            reported_counts: HashMap::new(),
        }
    }
}

impl Harness {
    pub fn with_table(self, name: &str, rows: u64) -> Self {
        self.tables.lock().unwrap().insert(name.to_string(), rows);
        self
    }

    pub fn with_blob(self, key: &str, bytes: Vec<u8>) -> Self {
        self.blobs.lock().unwrap().insert(key.to_string(), bytes);
        self
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn rows_in(&self, table: &str) -> u64 {
        self.tables.lock().unwrap().get(table).copied().unwrap_or(0)
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            identity: Arc::new(FakeIdentity {
                active: self.identity_active,
                calls: self.calls.clone(),
            }),
            blobs: Arc::new(FakeBlobStore {
                blobs: Arc::clone(&self.blobs),
                account_missing: self.account_missing,
                fail_uploads: self.fail_uploads.clone(),
                calls: self.calls.clone(),
            }),
            bulk: Arc::new(FakeBulkCopy {
                tables: Arc::clone(&self.tables),
                fail_export: self.fail_export.clone(),
                reject_import: self.reject_import.clone(),
                calls: self.calls.clone(),
            }),
            database: Arc::new(FakeDatabase {
                tables: Arc::clone(&self.tables),
                reported_counts: self.reported_counts.clone(),
                unreachable: self.database_unreachable,
                calls: self.calls.clone(),
            }),
            compressor: Arc::new(RecordingCompressor {
                inner: GzipCompressor::default(),
                fail_compress: self.fail_compress,
                calls: self.calls.clone(),
            }),
        }
    }

    pub fn config(&self, work_dir: &Path, retain_on_failure: bool) -> TableShuttleConfig {
        let database = DatabaseConfig {
            host: "sql.example.com".to_string(),
            port: None,
            database: "sales".to_string(),
            username: "exporter".to_string(),
            password: secret_string("secret".to_string()),
            trust_server_certificate: false,
            login_timeout_seconds: 30,
        };
        TableShuttleConfig {
            application: ApplicationConfig::default(),
            source: Some(database.clone()),
            target: Some(database),
            storage: StorageConfig {
                account_name: "datastaging".to_string(),
                auth_mode: "login".to_string(),
            },
            identity: IdentityConfig {
                login_if_missing: self.login_if_missing,
                login_timeout_seconds: 1,
                initial_poll_interval_ms: 10,
                max_poll_interval_ms: 20,
                backoff_multiplier: 1.5,
            },
            tools: ToolsConfig::default(),
            pipeline: PipelineConfig {
                work_dir: work_dir.to_path_buf(),
                retain_on_failure,
            },
        }
    }
}
