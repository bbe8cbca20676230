//! Structured logging setup using tracing
//!
//! Console output goes to stderr through an env-filtered layer. When a run
//! log is requested, records are also written as JSON to a file named after
//! the run's direction and start time. The file has its own filter that never
//! drops below `info`, so step outcomes always reach it.
//!
//! # Example
//!
//! ```no_run
//! use tableshuttle::domain::Direction;
//! use tableshuttle::logging::{init_logging, RunLog};
//!
//! let run_log = RunLog::new("logs", Direction::Export);
//! let _guard = init_logging("info", Some(&run_log)).expect("Failed to initialize logging");
//! ```

use crate::domain::{Direction, Result, ShuttleError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingGuard {
    /// Create a new logging guard
    fn new(file_guard: Option<WorkerGuard>, log_file: Option<PathBuf>) -> Self {
        Self {
            _file_guard: file_guard,
            log_file,
        }
    }

    /// Path of the run log, if one is being written
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Location and naming of a run log
#[derive(Debug, Clone)]
pub struct RunLog {
    /// Directory the log file is created in
    pub log_dir: PathBuf,
    /// Direction of the run
    pub direction: Direction,
    /// Start time of the run, used in the file name
    pub started_at: DateTime<Utc>,
}

impl RunLog {
    /// A run log for a run starting now
    pub fn new(log_dir: impl Into<PathBuf>, direction: Direction) -> Self {
        Self {
            log_dir: log_dir.into(),
            direction,
            started_at: Utc::now(),
        }
    }

    /// `<direction>_<YYYYMMDDTHHMMSSZ>.log`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.log",
            self.direction.as_str(),
            self.started_at.format("%Y%m%dT%H%M%SZ")
        )
    }

    /// Full path of the log file
    pub fn path(&self) -> PathBuf {
        self.log_dir.join(self.file_name())
    }
}

/// Initialize the logging system
///
/// # Arguments
///
/// * `log_level_str` - Log level as a string (trace, debug, info, warn, error)
/// * `run_log` - Where to write the JSON run log; `None` logs to the console only
///
/// # Returns
///
/// A `LoggingGuard` that must be kept alive for the duration of the program
pub fn init_logging(log_level_str: &str, run_log: Option<&RunLog>) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tableshuttle={}", log_level)));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    layers.push(console_layer.boxed());

    let (file_guard, log_file) = match run_log {
        Some(run_log) => {
            std::fs::create_dir_all(&run_log.log_dir).map_err(|e| {
                ShuttleError::Configuration(format!(
                    "Failed to create log directory {}: {}",
                    run_log.log_dir.display(),
                    e
                ))
            })?;

            let file_appender =
                tracing_appender::rolling::never(&run_log.log_dir, run_log.file_name());
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(non_blocking)
                .with_filter(run_log_filter(log_level));

            layers.push(file_layer.boxed());
            (Some(guard), Some(run_log.path()))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(layers).init();

    tracing::debug!(
        log_file = ?log_file,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard, log_file))
}

/// Filter of the JSON run log: the console level, but at least `info`
fn run_log_filter(console_level: Level) -> EnvFilter {
    EnvFilter::new(format!("tableshuttle={}", run_log_level(console_level)))
}

fn run_log_level(console_level: Level) -> Level {
    // Levels order by verbosity: TRACE is the greatest
    std::cmp::max(console_level, Level::INFO)
}

/// Parse log level from string
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ShuttleError::Configuration(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))),
    }
}
