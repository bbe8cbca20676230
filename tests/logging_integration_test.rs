//! Integration tests for logging functionality
//!
//! Installing the global subscriber can only happen once per process, so
//! this file holds a single test.

use tableshuttle::core::reconcile::RowCountComparison;
use tableshuttle::domain::{Direction, TableName};
use tableshuttle::logging::{init_logging, RunLog};
use tempfile::TempDir;

#[test]
fn test_run_log_receives_json_events() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");
    let run_log = RunLog::new(&log_dir, Direction::Export);
    assert!(!log_dir.exists());

    let guard = init_logging("info", Some(&run_log)).unwrap();
    assert_eq!(guard.log_file(), Some(run_log.path().as_path()));
    assert!(log_dir.exists());

    RowCountComparison::new(TableName::new("Orders").unwrap(), 100, Some(95)).log();

    // Dropping the guard flushes the background writer
    drop(guard);

    let contents = std::fs::read_to_string(run_log.path()).unwrap();
    let line = contents
        .lines()
        .find(|l| l.contains("Row count mismatch"))
        .expect("mismatch event missing from run log");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "WARN");
    assert_eq!(event["fields"]["table"], "Orders");
    assert_eq!(event["fields"]["exported"], 100);
    assert_eq!(event["fields"]["source"], 95);
    assert!(run_log.file_name().starts_with("export_"));
}
