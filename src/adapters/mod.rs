//! External system integrations for tableshuttle.
//!
//! This module provides adapters for the programs tableshuttle drives:
//!
//! - [`azure`] - Identity session and blob storage through the Azure CLI
//! - [`sqlserver`] - Bulk copy through `bcp`, queries through `sqlcmd`
//! - [`process`] - Shared child-process runner with secret masking
//! - [`traits`] - Collaborator traits the orchestrator is written against
//! - [`factory`] - Builds the production collaborators from configuration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with fake implementations. The pipelines only see the traits
//! in [`traits`], never the concrete CLI wrappers.
//!
//! ```rust,no_run
//! use tableshuttle::adapters::factory::create_collaborators;
//! use tableshuttle::config::load_config;
//! use tableshuttle::domain::Direction;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tableshuttle.toml")?;
//! let collaborators = create_collaborators(&config, Direction::Export)?;
//! let signed_in = collaborators.identity.has_active_session().await?;
//! # Ok(())
//! # }
//! ```

pub mod azure;
pub mod factory;
pub mod process;
pub mod sqlserver;
pub mod traits;

pub use factory::{create_collaborators, Collaborators};
pub use traits::{BlobStore, BulkCopy, Compressor, DatabaseClient, IdentityProvider, WriteMode};
