//! Batch orchestration
//!
//! [`BatchRunner`] drives one job across all of its tables and produces a
//! [`BatchSummary`].

pub mod runner;
pub mod summary;

pub use runner::BatchRunner;
pub use summary::{BatchSummary, TableOutcome, TableReport};
