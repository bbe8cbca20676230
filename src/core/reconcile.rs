//! Row-count reconciliation
//!
//! After an export the number of lines in the data file is compared with the
//! source table's row count. The comparison is advisory: it is logged and
//! reported but never fails a table.

use crate::domain::{Result, TableName};
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Outcome of comparing two counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Counts agree
    Match,
    /// Counts differ
    Mismatch,
    /// The source count could not be obtained
    Unknown,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Verdict::Match => "match",
            Verdict::Mismatch => "mismatch",
            Verdict::Unknown => "unknown",
        })
    }
}

/// Exported line count versus source row count for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCountComparison {
    /// Table the counts belong to
    pub table: TableName,
    /// Lines in the exported data file
    pub exported: u64,
    /// Rows reported by the source, if the query succeeded
    pub source: Option<u64>,
}

impl RowCountComparison {
    /// Builds a comparison
    pub fn new(table: TableName, exported: u64, source: Option<u64>) -> Self {
        Self {
            table,
            exported,
            source,
        }
    }

    /// Verdict of the comparison
    pub fn verdict(&self) -> Verdict {
        match self.source {
            Some(source) if source == self.exported => Verdict::Match,
            Some(_) => Verdict::Mismatch,
            None => Verdict::Unknown,
        }
    }

    /// Logs the comparison: info on match, warn otherwise
    pub fn log(&self) {
        match self.verdict() {
            Verdict::Match => tracing::info!(
                table = %self.table,
                exported = self.exported,
                source = self.source,
                "Row counts match"
            ),
            Verdict::Mismatch => tracing::warn!(
                table = %self.table,
                exported = self.exported,
                source = self.source,
                "Row count mismatch between exported file and source table"
            ),
            Verdict::Unknown => tracing::warn!(
                table = %self.table,
                exported = self.exported,
                "Source row count unavailable; reconciliation skipped"
            ),
        }
    }
}

/// Counts the lines of a data file
///
/// Each `\n` ends a line; trailing bytes after the last `\n` count as one
/// more line. An empty file has zero lines.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub async fn count_lines(path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buffer = vec![0u8; 64 * 1024];
    let mut lines = 0u64;
    let mut last_byte = None;

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        lines += buffer[..read].iter().filter(|&&b| b == b'\n').count() as u64;
        last_byte = Some(buffer[read - 1]);
    }

    if matches!(last_byte, Some(b) if b != b'\n') {
        lines += 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("", 0 ; "empty")]
    #[test_case("a\n", 1 ; "one terminated")]
    #[test_case("a\nb\n", 2 ; "two terminated")]
    #[test_case("a\nb", 2 ; "missing final newline")]
    #[test_case("\n\n", 2 ; "blank lines")]
    #[tokio::test]
    async fn test_count_lines(contents: &str, expected: u64) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.tsv");
        std::fs::write(&path, contents).unwrap();
        assert_eq!(count_lines(&path).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_count_lines_spans_buffers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.tsv");
        std::fs::write(&path, "1\tsome row text\n".repeat(20_000)).unwrap();
        assert_eq!(count_lines(&path).await.unwrap(), 20_000);
    }

    #[tokio::test]
    async fn test_count_lines_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(count_lines(&dir.path().join("nope.tsv")).await.is_err());
    }

    #[test]
    fn test_verdicts() {
        let table = TableName::new("Orders").unwrap();
        assert_eq!(
            RowCountComparison::new(table.clone(), 100, Some(100)).verdict(),
            Verdict::Match
        );
        assert_eq!(
            RowCountComparison::new(table.clone(), 95, Some(100)).verdict(),
            Verdict::Mismatch
        );
        assert_eq!(
            RowCountComparison::new(table, 95, None).verdict(),
            Verdict::Unknown
        );
    }
}
