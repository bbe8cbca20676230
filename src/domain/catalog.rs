//! Catalog metadata used to synthesize table definitions

use serde::{Deserialize, Serialize};

/// One column as described by the database catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Declared type name (e.g. `nvarchar`, `decimal`)
    pub data_type: String,
    /// Declared length for character/binary types; -1 means MAX
    pub max_length: Option<i64>,
    /// Precision for exact numeric types
    pub precision: Option<u8>,
    /// Scale for exact numeric types
    pub scale: Option<u8>,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// 1-based position in the table
    pub ordinal: u32,
}

/// One column of a primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumn {
    /// Column name
    pub name: String,
    /// 1-based position within the key
    pub ordinal: u32,
}

/// Primary key constraint of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name as stored in the catalog
    pub constraint_name: String,
    /// Key columns, in any order
    pub columns: Vec<KeyColumn>,
}

impl PrimaryKey {
    /// Key column names ordered by key ordinal
    pub fn ordered_column_names(&self) -> Vec<&str> {
        let mut columns: Vec<&KeyColumn> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.ordinal);
        columns.iter().map(|c| c.name.as_str()).collect()
    }
}
