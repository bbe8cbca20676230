//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON run logs, one file per run, named `<direction>_<timestamp>.log`
//! - Configurable log levels
//! - A root span carrying the run id so every record is attributable to one run
//!
//! # Example
//!
//! ```no_run
//! use tableshuttle::domain::Direction;
//! use tableshuttle::logging::{init_logging, run_span, RunLog};
//!
//! let run_log = RunLog::new("logs", Direction::Export);
//! let _guard = init_logging("info", Some(&run_log)).expect("Failed to initialize logging");
//!
//! let span = run_span(Direction::Export);
//! let _entered = span.enter();
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard, RunLog};

use crate::domain::Direction;
use uuid::Uuid;

/// Root span of a run, carrying a fresh `run_id` and the direction
pub fn run_span(direction: Direction) -> tracing::Span {
    let run_id = Uuid::new_v4();
    tracing::info_span!("run", run_id = %run_id, direction = %direction)
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tableshuttle::log_error_with_context;
/// use tableshuttle::domain::ShuttleError;
///
/// let error = ShuttleError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            kind = %$error.kind(),
            context = $context,
            "Error occurred"
        )
    };
}

/// Log progress through the tables of a batch
///
/// # Example
///
/// ```no_run
/// use tableshuttle::log_table_progress;
///
/// log_table_progress!(2, 5, "Orders");
/// ```
#[macro_export]
macro_rules! log_table_progress {
    ($current:expr, $total:expr, $table:expr) => {
        tracing::info!(
            current = $current,
            total = $total,
            table = %$table,
            "Processing table"
        )
    };
}
