//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod export;
pub mod import;
pub mod init;
pub mod transfer;
pub mod validate;
