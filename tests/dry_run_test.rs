//! Integration tests for dry-run mode
//!
//! A dry run must not call any external program and must not touch the
//! file system, while still reporting every table.

mod common;

use common::Harness;
use tableshuttle::core::batch::BatchRunner;
use tableshuttle::domain::{Direction, TransferFlags, TransferJob};
use tempfile::TempDir;
use tokio::sync::watch;

fn dry_run_job(direction: Direction, flags: TransferFlags) -> TransferJob {
    TransferJob::from_args(
        direction,
        "dbo",
        "Customers,Orders,Customers",
        "backups",
        "nightly",
        Some("|"),
        TransferFlags {
            dry_run: true,
            ..flags
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_export_dry_run_calls_nothing() {
    let dir = TempDir::new().unwrap();
    let work_dir = dir.path().join("staging");
    let mut harness = Harness::default();
    // Would fail every precheck if anything were called
    harness.identity_active = false;
    harness.login_if_missing = false;
    harness.account_missing = true;

    let config = harness.config(&work_dir, false);
    let job = dry_run_job(
        Direction::Export,
        TransferFlags {
            compress: true,
            generate_ddl: true,
            overwrite: true,
            dry_run: true,
        },
    );

    let (_tx, rx) = watch::channel(false);
    let summary = BatchRunner::new(&config, harness.collaborators(), rx)
        .run(&job)
        .await
        .unwrap();

    assert!(harness.calls.all().is_empty());
    assert!(!work_dir.exists());
    assert!(summary.dry_run);
    assert!(summary.is_successful());
    assert_eq!(summary.total(), 3);
    assert_eq!(
        summary.headline(),
        "[dry-run] Export completed successfully: 3 table(s)"
    );
}

#[tokio::test]
async fn test_import_dry_run_calls_nothing() {
    let dir = TempDir::new().unwrap();
    let harness = Harness::default();

    let config = harness.config(dir.path(), true);
    let job = dry_run_job(
        Direction::Import,
        TransferFlags {
            compress: true,
            ..Default::default()
        },
    );

    let (_tx, rx) = watch::channel(false);
    let summary = BatchRunner::new(&config, harness.collaborators(), rx)
        .run(&job)
        .await
        .unwrap();

    assert!(harness.calls.all().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(summary.is_successful());
    assert!(summary.reconciliations.is_empty());
    assert!(summary.tables.iter().all(|t| t.rows.is_none()));
}
