//! Transfer job and per-table task models
//!
//! A [`TransferJob`] is the unit of work for one run. The batch runner turns
//! each table name of the job into a [`TableTask`], which knows every local
//! and remote name its pipeline touches.

use super::errors::ShuttleError;
use super::ids::{BlobPrefix, ContainerName, SchemaName, TableName};
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Extension of the uncompressed data file
pub const DATA_EXTENSION: &str = "tsv";

/// Suffix appended by the compression step
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Direction of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Table → file → blob
    Export,
    /// Blob → file → table
    Import,
}

impl Direction {
    /// Lowercase name, used in log file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Export => "export",
            Direction::Import => "import",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-character field delimiter
///
/// # Examples
///
/// ```
/// use tableshuttle::domain::job::Delimiter;
/// use std::str::FromStr;
///
/// assert_eq!(Delimiter::from_str("\\t").unwrap().as_char(), '\t');
/// assert_eq!(Delimiter::from_str("|").unwrap().as_char(), '|');
/// assert!(Delimiter::from_str("||").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter(char);

impl Delimiter {
    /// Creates a delimiter from a character, rejecting line terminators
    pub fn new(c: char) -> std::result::Result<Self, String> {
        if c == '\n' || c == '\r' || c == '\0' {
            return Err(format!("Delimiter cannot be {c:?}"));
        }
        Ok(Self(c))
    }

    /// The delimiter character
    pub fn as_char(&self) -> char {
        self.0
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self('\t')
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "\\t" | "tab" | "TAB" => return Ok(Self('\t')),
            _ => {}
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            (None, _) => Err("Delimiter cannot be empty".to_string()),
            _ => Err(format!(
                "Delimiter must be a single character (or \\t), got '{s}'"
            )),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            '\t' => f.write_str("\\t"),
            c => write!(f, "{c}"),
        }
    }
}

/// Behavioral switches of a job
///
/// `compress` means "compress before upload" on export and "the blobs are
/// compressed" on import. `generate_ddl` and `overwrite` only apply to export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferFlags {
    /// Compress on export / expect compressed blobs on import
    pub compress: bool,
    /// Upload a synthesized CREATE TABLE script next to each data file
    pub generate_ddl: bool,
    /// Replace existing blobs instead of refusing to write
    pub overwrite: bool,
    /// Log every mutating step instead of performing it
    pub dry_run: bool,
}

/// The unit of work for one run
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Transfer direction
    pub direction: Direction,
    /// Schema the tables live in
    pub schema: SchemaName,
    /// Tables in processing order; duplicates are processed once per occurrence
    pub tables: Vec<TableName>,
    /// Blob container
    pub container: ContainerName,
    /// Virtual directory inside the container
    pub path: BlobPrefix,
    /// Field delimiter
    pub delimiter: Delimiter,
    /// Behavioral switches
    pub flags: TransferFlags,
}

impl TransferJob {
    /// Builds a job from raw argument values
    ///
    /// `tables` is a comma-separated list; commas inside names are not
    /// supported. Any missing or blank required value rejects the job before
    /// anything else happens.
    pub fn from_args(
        direction: Direction,
        schema: &str,
        tables: &str,
        container: &str,
        path: &str,
        delimiter: Option<&str>,
        flags: TransferFlags,
    ) -> Result<Self> {
        let schema = SchemaName::new(schema).map_err(ShuttleError::Validation)?;
        let tables = parse_table_list(tables)?;
        let container = ContainerName::new(container).map_err(ShuttleError::Validation)?;
        let path = BlobPrefix::new(path).map_err(ShuttleError::Validation)?;
        let delimiter = match delimiter {
            Some(d) => Delimiter::from_str(d).map_err(ShuttleError::Validation)?,
            None => Delimiter::default(),
        };

        Ok(Self {
            direction,
            schema,
            tables,
            container,
            path,
            delimiter,
            flags,
        })
    }

    /// Creates the task for one table of this job
    pub fn task_for(&self, table: &TableName, work_dir: &Path) -> TableTask {
        TableTask::new(table.clone(), work_dir, self.flags.compress)
    }
}

/// Splits a comma-separated table list, rejecting empty entries
pub fn parse_table_list(tables: &str) -> Result<Vec<TableName>> {
    if tables.trim().is_empty() {
        return Err(ShuttleError::Validation(
            "Table list cannot be empty".to_string(),
        ));
    }
    tables
        .split(',')
        .map(|t| {
            TableName::new(t).map_err(|e| {
                ShuttleError::Validation(format!("Invalid table list '{tables}': {e}"))
            })
        })
        .collect()
}

/// One table within a job
///
/// Owns the derived names of every artifact the table's pipeline creates.
#[derive(Debug, Clone)]
pub struct TableTask {
    /// Table being moved
    pub table: TableName,
    work_dir: PathBuf,
    compressed: bool,
}

impl TableTask {
    /// Creates a task rooted at `work_dir`
    pub fn new(table: TableName, work_dir: &Path, compressed: bool) -> Self {
        Self {
            table,
            work_dir: work_dir.to_path_buf(),
            compressed,
        }
    }

    /// `<table>.tsv`
    pub fn data_file_name(&self) -> String {
        format!("{}.{}", self.table.as_str(), DATA_EXTENSION)
    }

    /// The name the file travels under: `<table>.tsv` or `<table>.tsv.gz`
    pub fn transport_file_name(&self) -> String {
        if self.compressed {
            format!("{}{}", self.data_file_name(), COMPRESSED_SUFFIX)
        } else {
            self.data_file_name()
        }
    }

    /// `<table>_ddl.sql`
    pub fn ddl_file_name(&self) -> String {
        format!("{}_ddl.sql", self.table.as_str())
    }

    /// `<table>.err`
    pub fn error_file_name(&self) -> String {
        format!("{}.err", self.table.as_str())
    }

    /// Local path of the uncompressed data file
    pub fn data_path(&self) -> PathBuf {
        self.work_dir.join(self.data_file_name())
    }

    /// Local path of the file that is uploaded or downloaded
    pub fn transport_path(&self) -> PathBuf {
        self.work_dir.join(self.transport_file_name())
    }

    /// Local path of the DDL script
    pub fn ddl_path(&self) -> PathBuf {
        self.work_dir.join(self.ddl_file_name())
    }

    /// Local path of the bulk-load error file
    pub fn error_path(&self) -> PathBuf {
        self.work_dir.join(self.error_file_name())
    }

    /// Blob name of the data file
    pub fn data_blob_name(&self, prefix: &BlobPrefix) -> String {
        prefix.join(&self.transport_file_name())
    }

    /// Blob name of the DDL script
    pub fn ddl_blob_name(&self, prefix: &BlobPrefix) -> String {
        prefix.join(&self.ddl_file_name())
    }

    /// Whether the data file travels compressed
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Every local artifact this task may leave behind
    pub fn local_artifacts(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.data_path()];
        if self.compressed {
            paths.push(self.transport_path());
        }
        paths.push(self.ddl_path());
        paths.push(self.error_path());
        paths
    }
}
