//! Batch summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! one run across all of its tables.

use crate::core::pipeline::{PipelineStep, StepError};
use crate::core::reconcile::{RowCountComparison, Verdict};
use crate::domain::{Direction, ErrorKind, TableName};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

/// Outcome of one table's pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableOutcome {
    /// Every step succeeded
    Succeeded,
    /// The pipeline stopped at `step`
    Failed {
        /// Failing step
        step: PipelineStep,
        /// Classification of the error
        #[serde(serialize_with = "serialize_kind")]
        kind: ErrorKind,
        /// Error message
        message: String,
    },
}

fn serialize_kind<S: serde::Serializer>(kind: &ErrorKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(kind)
}

impl TableOutcome {
    /// Whether the table succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, TableOutcome::Succeeded)
    }
}

impl From<&StepError> for TableOutcome {
    fn from(err: &StepError) -> Self {
        TableOutcome::Failed {
            step: err.step,
            kind: err.error.kind(),
            message: err.error.to_string(),
        }
    }
}

/// Report for one table occurrence
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    /// Table name
    pub table: TableName,
    /// Pipeline outcome
    pub outcome: TableOutcome,
    /// Rows exported or imported, when known
    pub rows: Option<u64>,
    /// Time spent on this table
    pub duration: Duration,
}

/// Summary of a batch run
///
/// The overall flag is folded with AND as reports are recorded: once a
/// table has failed the batch can never become successful again.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Direction of the run
    pub direction: Direction,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// One report per table occurrence, in processing order
    pub tables: Vec<TableReport>,
    /// Row-count comparisons made during export
    pub reconciliations: Vec<RowCountComparison>,
    /// Duration of the whole batch
    pub duration: Duration,
    succeeded: bool,
}

impl BatchSummary {
    /// Create a new empty batch summary
    pub fn new(direction: Direction, dry_run: bool) -> Self {
        Self {
            direction,
            dry_run,
            tables: Vec::new(),
            reconciliations: Vec::new(),
            duration: Duration::from_secs(0),
            succeeded: true,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record one table's report and fold its outcome into the batch flag
    pub fn record(&mut self, report: TableReport) {
        self.succeeded = self.succeeded && report.outcome.is_success();
        self.tables.push(report);
    }

    /// Record a row-count comparison
    pub fn add_reconciliation(&mut self, comparison: RowCountComparison) {
        self.reconciliations.push(comparison);
    }

    /// Check if every table succeeded
    pub fn is_successful(&self) -> bool {
        self.succeeded
    }

    /// Number of table occurrences processed
    pub fn total(&self) -> usize {
        self.tables.len()
    }

    /// Number of tables that succeeded
    pub fn succeeded_count(&self) -> usize {
        self.tables.iter().filter(|t| t.outcome.is_success()).count()
    }

    /// Number of tables that failed
    pub fn failed_count(&self) -> usize {
        self.total() - self.succeeded_count()
    }

    /// Reports of the failed tables
    pub fn failures(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.outcome.is_success())
    }

    /// Number of reconciliations that did not match
    pub fn mismatches(&self) -> usize {
        self.reconciliations
            .iter()
            .filter(|r| r.verdict() == Verdict::Mismatch)
            .count()
    }

    /// One-line aggregate message
    pub fn headline(&self) -> String {
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        if self.is_successful() {
            format!(
                "{prefix}{} completed successfully: {} table(s)",
                capitalize(self.direction.as_str()),
                self.total()
            )
        } else {
            format!(
                "{prefix}{} completed with failures: {} of {} table(s) failed",
                capitalize(self.direction.as_str()),
                self.failed_count(),
                self.total()
            )
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            direction = %self.direction,
            dry_run = self.dry_run,
            total = self.total(),
            succeeded = self.succeeded_count(),
            failed = self.failed_count(),
            row_count_mismatches = self.mismatches(),
            duration_secs = self.duration.as_secs(),
            "Batch completed"
        );

        for report in self.failures() {
            if let TableOutcome::Failed {
                step,
                kind,
                message,
            } = &report.outcome
            {
                tracing::warn!(
                    table = %report.table,
                    step = %step,
                    kind = %kind,
                    message = %message,
                    "Table failed"
                );
            }
        }
    }

    /// Per-table outcome table for the terminal
    pub fn render_table(&self) -> String {
        let name_width = self
            .tables
            .iter()
            .map(|t| t.table.as_str().len())
            .chain(std::iter::once("TABLE".len()))
            .max()
            .unwrap_or(5);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<9}  {:<12}  {:>12}  {:>9}",
            "TABLE", "STATUS", "FAILED STEP", "ROWS", "SECONDS"
        );
        for report in &self.tables {
            let (status, step) = match &report.outcome {
                TableOutcome::Succeeded => ("ok", "-".to_string()),
                TableOutcome::Failed { step, .. } => ("FAILED", step.to_string()),
            };
            let rows = report
                .rows
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<name_width$}  {:<9}  {:<12}  {:>12}  {:>9.1}",
                report.table.as_str(),
                status,
                step,
                rows,
                report.duration.as_secs_f64()
            );
        }
        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, outcome: TableOutcome) -> TableReport {
        TableReport {
            table: TableName::new(name).unwrap(),
            outcome,
            rows: Some(10),
            duration: Duration::from_millis(1500),
        }
    }

    fn failed(step: PipelineStep) -> TableOutcome {
        TableOutcome::Failed {
            step,
            kind: ErrorKind::Conflict,
            message: "Blob may already exist".to_string(),
        }
    }

    #[test]
    fn test_batch_summary_creation() {
        let summary = BatchSummary::new(Direction::Export, false);
        assert!(summary.is_successful());
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut summary = BatchSummary::new(Direction::Export, false);
        summary.record(report("A", TableOutcome::Succeeded));
        assert!(summary.is_successful());

        summary.record(report("B", failed(PipelineStep::Upload)));
        assert!(!summary.is_successful());

        summary.record(report("C", TableOutcome::Succeeded));
        assert!(!summary.is_successful());
        assert_eq!(summary.succeeded_count(), 2);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn test_headline() {
        let mut summary = BatchSummary::new(Direction::Import, false);
        summary.record(report("A", TableOutcome::Succeeded));
        assert_eq!(
            summary.headline(),
            "Import completed successfully: 1 table(s)"
        );

        summary.record(report("B", failed(PipelineStep::Download)));
        assert_eq!(
            summary.headline(),
            "Import completed with failures: 1 of 2 table(s) failed"
        );
    }

    #[test]
    fn test_mismatches_count() {
        let mut summary = BatchSummary::new(Direction::Export, false);
        let table = TableName::new("Orders").unwrap();
        summary.add_reconciliation(RowCountComparison::new(table.clone(), 95, Some(100)));
        summary.add_reconciliation(RowCountComparison::new(table, 100, Some(100)));
        assert_eq!(summary.mismatches(), 1);
        assert!(summary.is_successful());
    }

    #[test]
    fn test_render_table() {
        let mut summary = BatchSummary::new(Direction::Export, false);
        summary.record(report("Customers", TableOutcome::Succeeded));
        summary.record(report("Orders", failed(PipelineStep::Upload)));

        let rendered = summary.render_table();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TABLE"));
        assert!(lines[1].starts_with("Customers  ok"));
        assert!(lines[2].contains("FAILED"));
        assert!(lines[2].contains("upload"));
    }

    #[test]
    fn test_outcome_serializes_kind_as_text() {
        let json = serde_json::to_value(failed(PipelineStep::Upload)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["step"], "upload");
        assert_eq!(json["kind"], "conflict");
    }
}
