//! Scalar and catalog queries through the `sqlcmd` client
//!
//! Output is requested headerless (`-h -1`), trimmed (`-W`) and
//! tab-separated (`-s`), so each result row is one line of tab-separated
//! fields with `NULL` for missing values. User-supplied names reach the
//! server either bracket-quoted or as `sp_executesql` parameters.

use super::{classify_database_failure, qualified_name};
use crate::adapters::process::ToolCommand;
use crate::adapters::traits::DatabaseClient;
use crate::config::DatabaseConfig;
use crate::domain::{
    ColumnMetadata, DatabaseError, KeyColumn, PrimaryKey, Result, SchemaName, TableName,
};
use async_trait::async_trait;

const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, \
NUMERIC_PRECISION, NUMERIC_SCALE, IS_NULLABLE, ORDINAL_POSITION \
FROM INFORMATION_SCHEMA.COLUMNS \
WHERE TABLE_SCHEMA = @schema AND TABLE_NAME = @table \
ORDER BY ORDINAL_POSITION";

const PRIMARY_KEY_QUERY: &str = "SELECT tc.CONSTRAINT_NAME, kcu.COLUMN_NAME, kcu.ORDINAL_POSITION \
FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME \
AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA \
AND tc.TABLE_NAME = kcu.TABLE_NAME \
WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' \
AND tc.TABLE_SCHEMA = @schema AND tc.TABLE_NAME = @table \
ORDER BY kcu.ORDINAL_POSITION";

/// Quotes a value as an `N'...'` literal
pub fn quote_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

/// A statement with `@schema` / `@table` bound through `sp_executesql`
#[derive(Debug, Clone)]
pub struct SqlQuery {
    statement: String,
    schema: String,
    table: String,
}

impl SqlQuery {
    /// Binds the table identity to a parameterized statement
    pub fn for_table(statement: &str, schema: &SchemaName, table: &TableName) -> Self {
        Self {
            statement: statement.to_string(),
            schema: schema.as_str().to_string(),
            table: table.as_str().to_string(),
        }
    }

    /// Batch text sent to the server
    pub fn render(&self) -> String {
        format!(
            "EXEC sp_executesql {}, N'@schema sysname, @table sysname', @schema = {}, @table = {};",
            quote_literal(&self.statement),
            quote_literal(&self.schema),
            quote_literal(&self.table)
        )
    }
}

/// Splits headerless tab-separated output into rows of fields
pub fn parse_rows(stdout: &str) -> Vec<Vec<String>> {
    stdout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(|f| f.trim().to_string()).collect())
        .collect()
}

fn nullable_field<T: std::str::FromStr>(field: &str, name: &str) -> Result<Option<T>> {
    if field.eq_ignore_ascii_case("NULL") || field.is_empty() {
        return Ok(None);
    }
    field.parse::<T>().map(Some).map_err(|_| {
        DatabaseError::InvalidResult(format!("{name} '{field}' is not a number")).into()
    })
}

fn required_field<T: std::str::FromStr>(field: &str, name: &str) -> Result<T> {
    nullable_field(field, name)?
        .ok_or_else(|| DatabaseError::InvalidResult(format!("{name} is NULL")).into())
}

/// Parses the single value of a `COUNT_BIG(*)` query
pub fn parse_count(stdout: &str) -> Result<u64> {
    let rows = parse_rows(stdout);
    let value = rows
        .first()
        .and_then(|row| row.first())
        .ok_or_else(|| DatabaseError::InvalidResult("row count query returned no rows".into()))?;
    required_field(value, "row count")
}

/// Parses rows of [`COLUMNS_QUERY`]
pub fn parse_columns(rows: &[Vec<String>]) -> Result<Vec<ColumnMetadata>> {
    rows.iter()
        .map(|row| -> Result<ColumnMetadata> {
            if row.len() < 7 {
                return Err(DatabaseError::InvalidResult(format!(
                    "expected 7 column fields, got {}: {:?}",
                    row.len(),
                    row
                ))
                .into());
            }
            Ok(ColumnMetadata {
                name: row[0].clone(),
                data_type: row[1].clone(),
                max_length: nullable_field(&row[2], "CHARACTER_MAXIMUM_LENGTH")?,
                precision: nullable_field(&row[3], "NUMERIC_PRECISION")?,
                scale: nullable_field(&row[4], "NUMERIC_SCALE")?,
                nullable: row[5].eq_ignore_ascii_case("YES"),
                ordinal: required_field(&row[6], "ORDINAL_POSITION")?,
            })
        })
        .collect()
}

/// Parses rows of [`PRIMARY_KEY_QUERY`]
pub fn parse_primary_key(rows: &[Vec<String>]) -> Result<Option<PrimaryKey>> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let constraint_name = first.first().cloned().unwrap_or_default();

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() < 3 {
            return Err(DatabaseError::InvalidResult(format!(
                "expected 3 key fields, got {}: {:?}",
                row.len(),
                row
            ))
            .into());
        }
        columns.push(KeyColumn {
            name: row[1].clone(),
            ordinal: required_field(&row[2], "ORDINAL_POSITION")?,
        });
    }

    Ok(Some(PrimaryKey {
        constraint_name,
        columns,
    }))
}

/// `sqlcmd` wrapper
pub struct SqlCmdClient {
    sqlcmd: String,
    database: DatabaseConfig,
}

impl SqlCmdClient {
    /// Creates a client for the given database
    pub fn new(sqlcmd: impl Into<String>, database: DatabaseConfig) -> Self {
        Self {
            sqlcmd: sqlcmd.into(),
            database,
        }
    }

    /// Command line for a batch, without running it
    ///
    /// The password travels in `SQLCMDPASSWORD`, never on the command line.
    pub fn command(&self, batch: &str) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.sqlcmd)
            .args(["-S", self.database.server().as_str()])
            .args(["-d", self.database.database.as_str()])
            .args(["-U", self.database.username.as_str()])
            .args(["-h", "-1", "-W", "-b"])
            .args(["-s", "\t"])
            .arg("-l")
            .arg(self.database.login_timeout_seconds.to_string())
            .secret_env("SQLCMDPASSWORD", &self.database.password);
        if self.database.trust_server_certificate {
            cmd = cmd.arg("-C");
        }
        cmd.arg("-Q").arg(format!("SET NOCOUNT ON; {batch}"))
    }

    /// Runs a batch and returns its result rows
    ///
    /// # Errors
    ///
    /// Returns a classified [`DatabaseError`] if `sqlcmd` exits non-zero.
    pub async fn query(&self, batch: &str, subject: &str) -> Result<Vec<Vec<String>>> {
        let output = self.command(batch).run().await?;
        if !output.success() {
            return Err(
                classify_database_failure(&output, subject, DatabaseError::QueryFailed).into(),
            );
        }
        Ok(parse_rows(&output.stdout))
    }
}

#[async_trait]
impl DatabaseClient for SqlCmdClient {
    async fn test_connection(&self) -> Result<()> {
        let rows = self.query("SELECT 1;", &self.database.database).await?;
        match rows.first().and_then(|r| r.first()).map(String::as_str) {
            Some("1") => {
                tracing::debug!(database = %self.database.database, "Database connection test successful");
                Ok(())
            }
            other => Err(DatabaseError::InvalidResult(format!(
                "connection test returned {other:?}"
            ))
            .into()),
        }
    }

    async fn row_count(&self, schema: &SchemaName, table: &TableName) -> Result<u64> {
        let subject = qualified_name(schema, table);
        let output = self
            .command(&format!("SELECT COUNT_BIG(*) FROM {subject};"))
            .run()
            .await?;
        if !output.success() {
            return Err(
                classify_database_failure(&output, &subject, DatabaseError::QueryFailed).into(),
            );
        }
        parse_count(&output.stdout)
    }

    async fn table_columns(
        &self,
        schema: &SchemaName,
        table: &TableName,
    ) -> Result<Vec<ColumnMetadata>> {
        let subject = qualified_name(schema, table);
        let batch = SqlQuery::for_table(COLUMNS_QUERY, schema, table).render();
        let rows = self.query(&batch, &subject).await?;
        let columns = parse_columns(&rows)?;
        if columns.is_empty() {
            return Err(DatabaseError::ObjectNotFound(format!(
                "{subject}: no columns found in catalog"
            ))
            .into());
        }
        Ok(columns)
    }

    async fn primary_key(
        &self,
        schema: &SchemaName,
        table: &TableName,
    ) -> Result<Option<PrimaryKey>> {
        let subject = qualified_name(schema, table);
        let batch = SqlQuery::for_table(PRIMARY_KEY_QUERY, schema, table).render();
        let rows = self.query(&batch, &subject).await?;
        parse_primary_key(&rows)
    }
}
