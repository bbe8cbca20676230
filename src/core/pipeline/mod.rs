//! Per-table pipelines
//!
//! - [`export`] - bulk export → reconcile → compress → upload → DDL
//! - [`import`] - download → decompress → bulk import
//!
//! A pipeline stops at the first failing step and reports which step that
//! was. Reconciliation and row counting never fail a pipeline.

pub mod export;
pub mod import;

use crate::adapters::Collaborators;
use crate::core::reconcile::RowCountComparison;
use crate::domain::{ShuttleError, TransferJob};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Steps a table can fail at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    /// Local staging preparation
    Prepare,
    /// Blob → local file
    Download,
    /// Gunzip of the downloaded file
    Decompress,
    /// Table → local file
    BulkExport,
    /// Local file → table
    BulkImport,
    /// Gzip of the exported file
    Compress,
    /// Local file → blob
    Upload,
    /// Table definition synthesis and upload
    Ddl,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStep::Prepare => "prepare",
            PipelineStep::Download => "download",
            PipelineStep::Decompress => "decompress",
            PipelineStep::BulkExport => "bulk-export",
            PipelineStep::BulkImport => "bulk-import",
            PipelineStep::Compress => "compress",
            PipelineStep::Upload => "upload",
            PipelineStep::Ddl => "ddl",
        })
    }
}

/// A failure and the step it happened in
#[derive(Debug)]
pub struct StepError {
    /// Failing step
    pub step: PipelineStep,
    /// Underlying error
    pub error: ShuttleError,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.error)
    }
}

impl std::error::Error for StepError {}

/// Result of one pipeline step
pub type StepResult<T> = std::result::Result<T, StepError>;

/// Attaches the current step to an error
pub trait AtStep<T> {
    /// Tags an error with `step`
    fn at(self, step: PipelineStep) -> StepResult<T>;
}

impl<T> AtStep<T> for crate::domain::Result<T> {
    fn at(self, step: PipelineStep) -> StepResult<T> {
        self.map_err(|error| StepError { step, error })
    }
}

/// What a successful pipeline produced
#[derive(Debug, Clone, Default)]
pub struct TableSuccess {
    /// Rows exported (file lines) or imported (count delta), when known
    pub rows: Option<u64>,
    /// Row-count comparison, export only
    pub reconciliation: Option<RowCountComparison>,
}

/// Everything a pipeline needs besides its table
pub struct PipelineContext<'a> {
    /// Job being run
    pub job: &'a TransferJob,
    /// External collaborators
    pub collaborators: &'a Collaborators,
    /// Local staging directory
    pub work_dir: &'a Path,
}

impl PipelineContext<'_> {
    /// Whether steps should only be logged
    pub fn dry_run(&self) -> bool {
        self.job.flags.dry_run
    }
}

/// Removes a local file, treating "already gone" as success
pub(crate) async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, StorageError};

    #[test]
    fn test_at_tags_step() {
        let result: crate::domain::Result<()> =
            Err(StorageError::BlobNotFound("c/p/a.tsv".into()).into());
        let err = result.at(PipelineStep::Download).unwrap_err();
        assert_eq!(err.step, PipelineStep::Download);
        assert_eq!(err.error.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with("download failed: "));
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.tsv");
        std::fs::write(&file, "x").unwrap();
        remove_if_exists(&file).await.unwrap();
        assert!(!file.exists());
        remove_if_exists(&file).await.unwrap();
    }
}
