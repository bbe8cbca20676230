//! Azure adapters
//!
//! Identity and blob storage are reached through the Azure CLI, so the
//! operator's existing `az login` session is reused.

pub mod blob;
pub mod classify;
pub mod identity;

pub use blob::AzureCliBlobStore;
pub use identity::AzureCliIdentity;
