//! Domain identifier types with validation
//!
//! Newtype wrappers for the names a transfer job is built from. Each type
//! rejects values that would be unsafe to turn into a local file name or a
//! blob name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database schema name
///
/// # Examples
///
/// ```
/// use tableshuttle::domain::ids::SchemaName;
/// use std::str::FromStr;
///
/// let schema = SchemaName::from_str("dbo").unwrap();
/// assert_eq!(schema.as_str(), "dbo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaName(String);

impl SchemaName {
    /// Creates a new SchemaName, rejecting blank values
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("Schema name cannot be empty".to_string());
        }
        if name.contains('\0') {
            return Err(format!("Schema name contains a NUL character: {name:?}"));
        }
        Ok(Self(name))
    }

    /// Returns the schema name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Table name
///
/// A table name doubles as the stem of every local artifact for that table
/// (`<table>.tsv`, `<table>_ddl.sql`, ...), so path separators and the
/// names `.` and `..` are rejected.
///
/// # Examples
///
/// ```
/// use tableshuttle::domain::ids::TableName;
///
/// assert!(TableName::new("Orders").is_ok());
/// assert!(TableName::new("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    /// Creates a new TableName
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("Table name cannot be empty".to_string());
        }
        if name.contains('/') || name.contains('\\') || name.contains('\0') {
            return Err(format!(
                "Table name '{name}' contains a path separator or NUL character"
            ));
        }
        if name == "." || name == ".." {
            return Err(format!("Table name '{name}' is not a valid file stem"));
        }
        Ok(Self(name))
    }

    /// Returns the table name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Blob container name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerName(String);

impl ContainerName {
    /// Creates a new ContainerName, rejecting blank values
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("Container name cannot be empty".to_string());
        }
        if name.contains('/') {
            return Err(format!("Container name '{name}' cannot contain '/'"));
        }
        Ok(Self(name))
    }

    /// Returns the container name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Virtual directory inside a container that all of a job's blobs live under
///
/// Leading and trailing slashes are stripped so that joining never produces
/// `//` in a blob name.
///
/// # Examples
///
/// ```
/// use tableshuttle::domain::ids::BlobPrefix;
///
/// let prefix = BlobPrefix::new("/exports/2024/").unwrap();
/// assert_eq!(prefix.join("orders.tsv"), "exports/2024/orders.tsv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobPrefix(String);

impl BlobPrefix {
    /// Creates a new BlobPrefix
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let path = path.into();
        let trimmed = path.trim().trim_matches('/').to_string();
        if trimmed.is_empty() {
            return Err("Blob path cannot be empty".to_string());
        }
        Ok(Self(trimmed))
    }

    /// Returns the prefix as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the blob name of a file under this prefix
    pub fn join(&self, file_name: &str) -> String {
        format!("{}/{}", self.0, file_name)
    }
}

macro_rules! impl_name_traits {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                }
            }

            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

impl_name_traits!(SchemaName, TableName, ContainerName, BlobPrefix);
