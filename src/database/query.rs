/*!
 * Execution of generated SQL against the loaded table.
 */

use log::debug;
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

use super::connection::DatabaseConnection;
use crate::errors::QueryError;

/// Rows returned by a query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Row values aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

/// Run one SQL statement on a blocking thread
pub async fn execute_query_async(db: &DatabaseConnection, sql: &str) -> Result<QueryResult, QueryError> {
    let sql = sql.to_string();
    db.execute_async(move |conn| execute_query(conn, &sql).map_err(anyhow::Error::from))
        .await
        .map_err(|e| match e.downcast::<QueryError>() {
            Ok(query_error) => query_error,
            Err(other) => QueryError::Execution(other.to_string()),
        })
}

/// Run one SQL statement and collect every row
pub fn execute_query(conn: &Connection, sql: &str) -> Result<QueryResult, QueryError> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(QueryError::Malformed("empty statement".to_string()));
    }

    let mut stmt = conn.prepare(sql)?;

    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!("Query returned {} row(s)", rows.len());
    Ok(QueryResult { columns, rows })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => json!(i),
        Value::Real(f) => json!(f),
        Value::Text(s) => json!(s),
        Value::Blob(b) => json!(format!("<blob {} bytes>", b.len())),
    }
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a boxed text table, eliding rows past `max_rows`
    pub fn render(&self, max_rows: usize) -> String {
        if self.columns.is_empty() {
            return "(statement returned no columns)\n".to_string();
        }

        let shown: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(max_rows)
            .map(|row| row.iter().map(display_value).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &shown {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let border = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );
        let line = |cells: &[String]| {
            let padded = cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!(" {}{} ", cell, " ".repeat(w - cell.chars().count())))
                .collect::<Vec<_>>()
                .join("|");
            format!("|{}|", padded)
        };

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&line(&self.columns));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
        for row in &shown {
            out.push_str(&line(row));
            out.push('\n');
        }
        out.push_str(&border);
        out.push('\n');

        let total = self.rows.len();
        if total > shown.len() {
            out.push_str(&format!("{} rows ({} shown)\n", total, shown.len()));
        } else {
            out.push_str(&format!("{} row{}\n", total, if total == 1 { "" } else { "s" }));
        }
        out
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(json_value))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

impl Serialize for QueryResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
