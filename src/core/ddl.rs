//! Table definition synthesis
//!
//! Rebuilds a `CREATE TABLE` script from catalog metadata so the destination
//! table can be created before an import. Only columns, types, nullability
//! and the primary key are reproduced.

use crate::adapters::sqlserver::{qualified_name, quote_identifier};
use crate::adapters::traits::DatabaseClient;
use crate::domain::{ColumnMetadata, PrimaryKey, Result, SchemaName, TableName};

const LENGTH_TYPES: &[&str] = &["char", "varchar", "nchar", "nvarchar", "binary", "varbinary"];
const PRECISION_TYPES: &[&str] = &["decimal", "numeric"];

/// Type name with its length or precision qualifier
///
/// ```
/// use tableshuttle::core::ddl::column_type;
/// use tableshuttle::domain::ColumnMetadata;
///
/// let notes = ColumnMetadata {
///     name: "Notes".into(),
///     data_type: "nvarchar".into(),
///     max_length: Some(-1),
///     precision: None,
///     scale: None,
///     nullable: true,
///     ordinal: 1,
/// };
/// assert_eq!(column_type(&notes), "nvarchar(MAX)");
/// ```
pub fn column_type(column: &ColumnMetadata) -> String {
    let data_type = column.data_type.to_lowercase();

    if LENGTH_TYPES.contains(&data_type.as_str()) {
        return match column.max_length {
            Some(-1) => format!("{}(MAX)", column.data_type),
            Some(len) => format!("{}({})", column.data_type, len),
            None => column.data_type.clone(),
        };
    }

    if PRECISION_TYPES.contains(&data_type.as_str()) {
        return match (column.precision, column.scale) {
            (Some(p), Some(s)) => format!("{}({}, {})", column.data_type, p, s),
            (Some(p), None) => format!("{}({})", column.data_type, p),
            _ => column.data_type.clone(),
        };
    }

    column.data_type.clone()
}

/// Renders the script for one table
///
/// Columns are emitted in ordinal order. The `ALTER TABLE ... PRIMARY KEY`
/// statement is omitted when `primary_key` is `None`.
pub fn render_ddl(
    schema: &SchemaName,
    table: &TableName,
    columns: &[ColumnMetadata],
    primary_key: Option<&PrimaryKey>,
) -> String {
    let qualified = qualified_name(schema, table);

    let mut ordered: Vec<&ColumnMetadata> = columns.iter().collect();
    ordered.sort_by_key(|c| c.ordinal);

    let column_lines: Vec<String> = ordered
        .iter()
        .map(|c| {
            format!(
                "    {} {} {}",
                quote_identifier(&c.name),
                column_type(c),
                if c.nullable { "NULL" } else { "NOT NULL" }
            )
        })
        .collect();

    let mut ddl = format!("CREATE TABLE {qualified} (\n{}\n);\n", column_lines.join(",\n"));

    if let Some(pk) = primary_key.filter(|pk| !pk.columns.is_empty()) {
        let key_columns: Vec<String> = pk
            .ordered_column_names()
            .into_iter()
            .map(quote_identifier)
            .collect();
        ddl.push_str(&format!(
            "ALTER TABLE {qualified} ADD CONSTRAINT {} PRIMARY KEY ({});\n",
            quote_identifier(&pk.constraint_name),
            key_columns.join(", ")
        ));
    }

    ddl
}

/// Reads the catalog and renders the script for `schema.table`
///
/// # Errors
///
/// Propagates catalog query failures; a table without columns is reported
/// by the client as not found.
pub async fn synthesize_ddl(
    database: &dyn DatabaseClient,
    schema: &SchemaName,
    table: &TableName,
) -> Result<String> {
    let columns = database.table_columns(schema, table).await?;
    let primary_key = database.primary_key(schema, table).await?;

    tracing::debug!(
        table = %table,
        columns = columns.len(),
        has_primary_key = primary_key.is_some(),
        "Read catalog metadata"
    );

    Ok(render_ddl(schema, table, &columns, primary_key.as_ref()))
}
