/*!
 * Table introspection.
 *
 * The prompt needs every column of the target table with its declared type,
 * in column order. `SchemaProvider` is the seam the translation service uses,
 * so it can run against SQLite or against a stub in tests.
 */

use log::debug;
use rusqlite::{Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use crate::errors::SchemaError;
use crate::translation::prompts::column_definitions;
use crate::translation::ColumnSchema;

/// Source of table schemas
pub trait SchemaProvider: Send + Sync {
    /// Describe a table's columns in storage order
    ///
    /// Fails with `SchemaError::NotFound` when the table is unknown.
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnSchema>, SchemaError>;
}

impl SchemaProvider for DatabaseConnection {
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnSchema>, SchemaError> {
        let conn = self.lock().map_err(SchemaError::Storage)?;
        describe(&conn, table)
    }
}

/// Describe a table or view on an open connection
pub fn describe(conn: &Connection, table: &str) -> Result<Vec<ColumnSchema>, SchemaError> {
    let storage = |e: rusqlite::Error| SchemaError::Storage(e.to_string());

    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
            [table],
            |_| Ok(()),
        )
        .optional()
        .map_err(storage)?
        .is_some();

    if !exists {
        return Err(SchemaError::NotFound(table.to_string()));
    }

    let mut stmt = conn
        .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(storage)?;

    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnSchema::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })
        .map_err(storage)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage)?;

    debug!("Described table {} ({} columns)", table, columns.len());
    Ok(columns)
}

/// Render the `CREATE TABLE` sketch shown to the model
pub fn create_table_sketch(table: &str, columns: &[ColumnSchema]) -> String {
    format!("CREATE TABLE {} ({})", table, column_definitions(columns))
}
