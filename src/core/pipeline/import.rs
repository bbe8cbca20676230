//! Import pipeline: blob → file → table

use super::{remove_if_exists, AtStep, PipelineContext, PipelineStep, StepResult, TableSuccess};
use crate::domain::TableTask;
use std::path::PathBuf;

/// Runs the import pipeline for one table
///
/// Steps, stopping at the first failure:
///
/// 1. Download `<path>/<file>` into the work directory
/// 2. Decompress, when the blobs are compressed; if `<table>.tsv` is already
///    present the downloaded archive is discarded instead
/// 3. Count destination rows, bulk load, count again and log the delta
///
/// Loading is append-only; running the same import twice loads the rows
/// twice.
pub async fn run(ctx: &PipelineContext<'_>, task: &TableTask) -> StepResult<TableSuccess> {
    let job = ctx.job;
    let table = &task.table;

    if ctx.dry_run() {
        return Ok(dry_run(ctx, task));
    }

    let blob_name = task.data_blob_name(&job.path);
    let transport_path = task.transport_path();
    ctx.collaborators
        .blobs
        .download(&job.container, &blob_name, &transport_path)
        .await
        .at(PipelineStep::Download)?;
    tracing::info!(
        container = %job.container,
        blob = %blob_name,
        file = %transport_path.display(),
        "Downloaded data file"
    );

    let data_path: PathBuf = if task.is_compressed() {
        let data_path = task.data_path();
        if tokio::fs::try_exists(&data_path).await.unwrap_or(false) {
            tracing::warn!(
                file = %data_path.display(),
                "Decompressed file already present; discarding downloaded archive"
            );
            if let Err(e) = remove_if_exists(&transport_path).await {
                tracing::warn!(file = %transport_path.display(), error = %e, "Could not remove archive");
            }
            data_path
        } else {
            let decompressed = ctx
                .collaborators
                .compressor
                .decompress(&transport_path)
                .await
                .at(PipelineStep::Decompress)?;
            tracing::info!(
                file = %decompressed.display(),
                codec = ctx.collaborators.compressor.name(),
                "Decompressed data file"
            );
            decompressed
        }
    } else {
        transport_path
    };

    let before = destination_count(ctx, task, "before").await;

    let error_path = task.error_path();
    ctx.collaborators
        .bulk
        .import_table(&job.schema, table, &data_path, job.delimiter, &error_path)
        .await
        .at(PipelineStep::BulkImport)?;

    let after = destination_count(ctx, task, "after").await;
    let rows = match (before, after) {
        (Some(before), Some(after)) => {
            let imported = after.saturating_sub(before);
            tracing::info!(before, after, rows_imported = imported, "Rows imported");
            Some(imported)
        }
        _ => {
            tracing::info!("Bulk load finished; imported row count unknown");
            None
        }
    };

    if let Err(e) = remove_if_exists(&error_path).await {
        tracing::warn!(file = %error_path.display(), error = %e, "Could not remove error file");
    }

    Ok(TableSuccess {
        rows,
        reconciliation: None,
    })
}

/// Destination row count; a failed query is only a warning
async fn destination_count(ctx: &PipelineContext<'_>, task: &TableTask, when: &str) -> Option<u64> {
    match ctx
        .collaborators
        .database
        .row_count(&ctx.job.schema, &task.table)
        .await
    {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, kind = %e.kind(), when, "Destination row count query failed");
            None
        }
    }
}

fn dry_run(ctx: &PipelineContext<'_>, task: &TableTask) -> TableSuccess {
    let job = ctx.job;

    tracing::info!(
        container = %job.container,
        blob = %task.data_blob_name(&job.path),
        file = %task.transport_path().display(),
        "[dry-run] would download the data file"
    );
    if task.is_compressed() {
        tracing::info!(
            file = %task.data_path().display(),
            "[dry-run] would decompress the data file unless it is already present"
        );
    }
    tracing::info!("[dry-run] would query the destination row count");
    tracing::info!(
        file = %task.data_path().display(),
        error_file = %task.error_path().display(),
        delimiter = %job.delimiter,
        "[dry-run] would bulk import into {}.{}",
        job.schema,
        task.table
    );
    TableSuccess::default()
}
