//! Export pipeline: table → file → blob

use super::{remove_if_exists, AtStep, PipelineContext, PipelineStep, StepResult, TableSuccess};
use crate::adapters::WriteMode;
use crate::core::ddl::synthesize_ddl;
use crate::core::reconcile::{count_lines, RowCountComparison};
use crate::domain::{Result, ShuttleError, TableTask};
use std::path::PathBuf;

/// Runs the export pipeline for one table
///
/// Steps, stopping at the first failure:
///
/// 1. Bulk export to `<work_dir>/<table>.tsv`
/// 2. Reconcile the file's line count with the source row count (advisory)
/// 3. Gzip in place, when compression is on
/// 4. Upload to `<path>/<file>` with the job's write mode
/// 5. Synthesize and upload `<table>_ddl.sql`, when requested
pub async fn run(ctx: &PipelineContext<'_>, task: &TableTask) -> StepResult<TableSuccess> {
    let job = ctx.job;
    let table = &task.table;
    let data_path = task.data_path();

    if ctx.dry_run() {
        return Ok(dry_run(ctx, task));
    }

    ctx.collaborators
        .bulk
        .export_table(&job.schema, table, &data_path, job.delimiter)
        .await
        .at(PipelineStep::BulkExport)?;
    tracing::info!(file = %data_path.display(), "Exported table to file");

    let reconciliation = reconcile(ctx, task).await;

    let transport_path: PathBuf = if task.is_compressed() {
        let compressed = ctx
            .collaborators
            .compressor
            .compress(&data_path)
            .await
            .at(PipelineStep::Compress)?;
        tracing::info!(
            file = %compressed.display(),
            codec = ctx.collaborators.compressor.name(),
            "Compressed data file"
        );
        compressed
    } else {
        data_path
    };

    let mode = WriteMode::from_overwrite(job.flags.overwrite);
    let blob_name = task.data_blob_name(&job.path);
    ctx.collaborators
        .blobs
        .upload(&job.container, &blob_name, &transport_path, mode)
        .await
        .at(PipelineStep::Upload)?;
    tracing::info!(container = %job.container, blob = %blob_name, "Uploaded data file");

    if job.flags.generate_ddl {
        upload_ddl(ctx, task, mode).await.at(PipelineStep::Ddl)?;
    }

    Ok(TableSuccess {
        rows: reconciliation.as_ref().map(|r| r.exported),
        reconciliation,
    })
}

/// Compares file lines with the source count; never fails
async fn reconcile(ctx: &PipelineContext<'_>, task: &TableTask) -> Option<RowCountComparison> {
    let exported = match count_lines(&task.data_path()).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "Could not count exported lines; reconciliation skipped");
            return None;
        }
    };

    let source = match ctx
        .collaborators
        .database
        .row_count(&ctx.job.schema, &task.table)
        .await
    {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, kind = %e.kind(), "Source row count query failed");
            None
        }
    };

    let comparison = RowCountComparison::new(task.table.clone(), exported, source);
    comparison.log();
    Some(comparison)
}

/// Writes, uploads and removes the table definition script
async fn upload_ddl(ctx: &PipelineContext<'_>, task: &TableTask, mode: WriteMode) -> Result<()> {
    let job = ctx.job;
    let ddl = synthesize_ddl(ctx.collaborators.database.as_ref(), &job.schema, &task.table).await?;

    let ddl_path = task.ddl_path();
    tokio::fs::write(&ddl_path, ddl).await.map_err(|e| {
        ShuttleError::Io(format!("Failed to write '{}': {}", ddl_path.display(), e))
    })?;

    let blob_name = task.ddl_blob_name(&job.path);
    ctx.collaborators
        .blobs
        .upload(&job.container, &blob_name, &ddl_path, mode)
        .await?;
    tracing::info!(container = %job.container, blob = %blob_name, "Uploaded table definition");

    if let Err(e) = remove_if_exists(&ddl_path).await {
        tracing::warn!(file = %ddl_path.display(), error = %e, "Could not remove local DDL file");
    }
    Ok(())
}

fn dry_run(ctx: &PipelineContext<'_>, task: &TableTask) -> TableSuccess {
    let job = ctx.job;
    let mode = WriteMode::from_overwrite(job.flags.overwrite);

    tracing::info!(
        file = %task.data_path().display(),
        delimiter = %job.delimiter,
        "[dry-run] would bulk export {}.{}",
        job.schema,
        task.table
    );
    tracing::info!("[dry-run] would count exported lines and query the source row count");
    if task.is_compressed() {
        tracing::info!(
            file = %task.transport_path().display(),
            "[dry-run] would gzip the data file"
        );
    }
    tracing::info!(
        container = %job.container,
        blob = %task.data_blob_name(&job.path),
        mode = ?mode,
        "[dry-run] would upload the data file"
    );
    if job.flags.generate_ddl {
        tracing::info!(
            container = %job.container,
            blob = %task.ddl_blob_name(&job.path),
            "[dry-run] would synthesize and upload the table definition"
        );
    }
    TableSuccess::default()
}
