//! Batch runner - main orchestrator of a run
//!
//! Runs the job-level prechecks once, then every table of the job strictly
//! in order. A failing table never stops the batch; the overall outcome is
//! folded into the [`BatchSummary`].

use crate::adapters::Collaborators;
use crate::config::{IdentityConfig, PipelineConfig, TableShuttleConfig};
use crate::core::batch::summary::{BatchSummary, TableOutcome, TableReport};
use crate::core::pipeline::{
    self, remove_if_exists, PipelineContext, StepResult, TableSuccess,
};
use crate::core::precheck::run_prechecks;
use crate::domain::{Direction, Result, ShuttleError, TableTask, TransferJob};
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;

/// Batch runner
pub struct BatchRunner {
    collaborators: Collaborators,
    identity: IdentityConfig,
    pipeline: PipelineConfig,
    shutdown: watch::Receiver<bool>,
}

impl BatchRunner {
    /// Create a new batch runner
    pub fn new(
        config: &TableShuttleConfig,
        collaborators: Collaborators,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            collaborators,
            identity: config.identity.clone(),
            pipeline: config.pipeline.clone(),
            shutdown,
        }
    }

    /// Execute the job
    ///
    /// # Errors
    ///
    /// Returns an error only for job-level failures (prechecks, work
    /// directory). Per-table failures are recorded in the summary.
    pub async fn run(&mut self, job: &TransferJob) -> Result<BatchSummary> {
        let started = Instant::now();
        let dry_run = job.flags.dry_run;

        tracing::info!(
            direction = %job.direction,
            schema = %job.schema,
            tables = job.tables.len(),
            container = %job.container,
            path = %job.path,
            delimiter = %job.delimiter,
            compress = job.flags.compress,
            generate_ddl = job.flags.generate_ddl,
            overwrite = job.flags.overwrite,
            dry_run,
            "Starting batch"
        );

        run_prechecks(&self.collaborators, &self.identity, dry_run, &mut self.shutdown).await?;

        let work_dir = self.pipeline.work_dir.as_path();
        if dry_run {
            tracing::info!(work_dir = %work_dir.display(), "[dry-run] would create the work directory");
        } else {
            tokio::fs::create_dir_all(work_dir).await.map_err(|e| {
                ShuttleError::Io(format!(
                    "Failed to create work directory '{}': {}",
                    work_dir.display(),
                    e
                ))
            })?;
        }

        let ctx = PipelineContext {
            job,
            collaborators: &self.collaborators,
            work_dir,
        };

        let mut summary = BatchSummary::new(job.direction, dry_run);
        let total = job.tables.len();

        for (index, table) in job.tables.iter().enumerate() {
            let task = job.task_for(table, work_dir);
            let span = tracing::info_span!("table", table = %table, index = index + 1, total);

            span.in_scope(|| {
                crate::log_table_progress!(index + 1, total, table);
            });
            let table_started = Instant::now();
            let result = run_pipeline(&ctx, &task).instrument(span.clone()).await;

            let report = match result {
                Ok(success) => {
                    span.in_scope(|| tracing::info!("Table succeeded"));
                    if let Some(comparison) = success.reconciliation {
                        summary.add_reconciliation(comparison);
                    }
                    self.cleanup(&task, dry_run).instrument(span.clone()).await;
                    TableReport {
                        table: table.clone(),
                        outcome: TableOutcome::Succeeded,
                        rows: success.rows,
                        duration: table_started.elapsed(),
                    }
                }
                Err(err) => {
                    span.in_scope(|| {
                        tracing::error!(
                            step = %err.step,
                            kind = %err.error.kind(),
                            error = %err.error,
                            "Table failed"
                        )
                    });
                    if self.pipeline.retain_on_failure {
                        span.in_scope(|| {
                            tracing::info!(
                                work_dir = %work_dir.display(),
                                "Keeping local files of failed table"
                            )
                        });
                    } else {
                        self.cleanup(&task, dry_run).instrument(span.clone()).await;
                    }
                    TableReport {
                        table: table.clone(),
                        outcome: TableOutcome::from(&err),
                        rows: None,
                        duration: table_started.elapsed(),
                    }
                }
            };
            summary.record(report);
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Removes a table's local files, ignoring ones that are not there
    async fn cleanup(&self, task: &TableTask, dry_run: bool) {
        if dry_run {
            tracing::info!("[dry-run] would remove local files");
            return;
        }
        for path in task.local_artifacts() {
            if let Err(e) = remove_if_exists(&path).await {
                tracing::warn!(file = %path.display(), error = %e, "Could not remove local file");
            }
        }
    }
}

async fn run_pipeline(ctx: &PipelineContext<'_>, task: &TableTask) -> StepResult<TableSuccess> {
    match ctx.job.direction {
        Direction::Export => pipeline::export::run(ctx, task).await,
        Direction::Import => pipeline::import::run(ctx, task).await,
    }
}
