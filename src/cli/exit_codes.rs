//! Process exit codes

use crate::domain::{ErrorKind, ShuttleError};

/// Every table succeeded
pub const SUCCESS: i32 = 0;
/// At least one table failed
pub const TABLE_FAILURES: i32 = 1;
/// Invalid arguments or configuration
pub const CONFIGURATION: i32 = 2;
/// Identity precheck failed
pub const AUTHENTICATION: i32 = 3;
/// Storage or database precheck failed
pub const CONNECTIVITY: i32 = 4;
/// Anything else that stopped the run
pub const FATAL: i32 = 5;
/// Shutdown requested while waiting for login
pub const INTERRUPTED: i32 = 130;

/// Exit code for an error that aborted the whole job
pub fn for_job_error(error: &ShuttleError) -> i32 {
    match error.kind() {
        ErrorKind::Configuration | ErrorKind::Validation => CONFIGURATION,
        ErrorKind::Authentication => AUTHENTICATION,
        ErrorKind::Interrupted => INTERRUPTED,
        ErrorKind::Connection | ErrorKind::NotFound | ErrorKind::Tool => CONNECTIVITY,
        ErrorKind::Conflict | ErrorKind::DataRejected | ErrorKind::Io => FATAL,
    }
}
