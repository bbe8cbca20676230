//! Domain models and types for tableshuttle.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed names** ([`SchemaName`], [`TableName`], [`ContainerName`], [`BlobPrefix`])
//! - **Catalog metadata** ([`ColumnMetadata`], [`PrimaryKey`])
//! - **Job models** ([`TransferJob`], [`TableTask`], [`Delimiter`])
//! - **Error types** ([`ShuttleError`], [`StorageError`], [`DatabaseError`], [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use tableshuttle::domain::{Direction, TransferFlags, TransferJob};
//!
//! # fn example() -> tableshuttle::domain::Result<()> {
//! let job = TransferJob::from_args(
//!     Direction::Export,
//!     "dbo",
//!     "Customers,Orders",
//!     "backups",
//!     "nightly/2024-06-01",
//!     None,
//!     TransferFlags { compress: true, ..Default::default() },
//! )?;
//! assert_eq!(job.tables.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod errors;
pub mod ids;
pub mod job;
pub mod result;

// Re-export commonly used types for convenience
pub use catalog::{ColumnMetadata, KeyColumn, PrimaryKey};
pub use errors::{DatabaseError, ErrorKind, ShuttleError, StorageError};
pub use ids::{BlobPrefix, ContainerName, SchemaName, TableName};
pub use job::{Delimiter, Direction, TableTask, TransferFlags, TransferJob};
pub use result::Result;
