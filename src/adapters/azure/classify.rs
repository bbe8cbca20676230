//! Classification of Azure CLI failures
//!
//! The CLI reports service error codes (`ErrorCode:BlobNotFound`) and
//! human-readable messages on stderr. These functions map that text to a
//! [`StorageError`] variant.

use crate::adapters::process::ProcessOutput;
use crate::domain::StorageError;

const ALREADY_EXISTS_MARKERS: &[&str] = &[
    "blobalreadyexists",
    "the specified blob already exists",
    "resourceexistserror",
];

const NOT_FOUND_MARKERS: &[&str] = &[
    "blobnotfound",
    "the specified blob does not exist",
    "containernotfound",
    "the specified container does not exist",
    "resourcenotfound",
    "was not found",
    "storageaccountnotfound",
];

const AUTH_MARKERS: &[&str] = &[
    "authorizationfailure",
    "authorizationpermissionmismatch",
    "authenticationfailed",
    "please run 'az login'",
    "az login",
    "aadsts",
    "no subscription found",
    "credentials",
];

const CONNECTION_MARKERS: &[&str] = &[
    "failed to establish a new connection",
    "name or service not known",
    "nodename nor servname",
    "connection aborted",
    "connection reset",
    "connection refused",
    "timed out",
    "max retries exceeded",
    "temporary failure in name resolution",
];

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

/// Maps a failed blob/account command to a storage error
///
/// `subject` names what was being accessed and becomes the error message
/// prefix, e.g. `"backups/nightly/Orders.tsv"`.
pub fn classify_storage_failure(output: &ProcessOutput, subject: &str) -> StorageError {
    let diagnostics = output.diagnostics();
    let lower = diagnostics.to_lowercase();
    let message = format!("{subject}: {diagnostics}");

    if contains_any(&lower, ALREADY_EXISTS_MARKERS) {
        StorageError::BlobAlreadyExists(message)
    } else if contains_any(&lower, AUTH_MARKERS) {
        StorageError::AuthenticationFailed(message)
    } else if contains_any(&lower, NOT_FOUND_MARKERS) {
        StorageError::BlobNotFound(message)
    } else if contains_any(&lower, CONNECTION_MARKERS) {
        StorageError::ConnectionFailed(message)
    } else {
        StorageError::TransferFailed(message)
    }
}

/// Maps a failed storage-account lookup
///
/// Same as [`classify_storage_failure`] except that "not found" means the
/// account itself is missing.
pub fn classify_account_failure(output: &ProcessOutput, account: &str) -> StorageError {
    match classify_storage_failure(output, account) {
        StorageError::BlobNotFound(message) => StorageError::AccountNotFound(message),
        other => other,
    }
}
