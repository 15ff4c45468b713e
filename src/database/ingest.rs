/*!
 * CSV ingestion.
 *
 * Every CSV file in the data directory is concatenated into one table.
 * Columns are the union of all headers in first-seen order; cells a file does
 * not provide are NULL. Declared types are inferred from the values so the
 * schema shown to the model carries real types rather than all-text columns.
 */

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;
use crate::translation::ColumnSchema;

/// Cell values read as missing
const NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// Column type inferred from CSV values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    BigInt,
    Double,
    Boolean,
    Date,
    Timestamp,
    Varchar,
}

impl InferredType {
    /// Declared SQL type name
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::Varchar => "VARCHAR",
        }
    }

    /// Whether a (non-missing) value fits this type
    fn accepts(&self, value: &str) -> bool {
        match self {
            Self::BigInt => value.parse::<i64>().is_ok(),
            Self::Double => value.parse::<f64>().is_ok_and(f64::is_finite),
            Self::Boolean => parse_bool(value).is_some(),
            Self::Date => parse_date(value).is_some(),
            Self::Timestamp => parse_timestamp(value).is_some(),
            Self::Varchar => true,
        }
    }

    /// Convert a cell to a SQLite value
    fn to_value(self, cell: Option<&str>) -> Value {
        let Some(cell) = cell else {
            return Value::Null;
        };

        match self {
            Self::BigInt => cell.parse().map(Value::Integer).unwrap_or(Value::Null),
            Self::Double => cell.parse().map(Value::Real).unwrap_or(Value::Null),
            Self::Boolean => parse_bool(cell)
                .map(|b| Value::Integer(i64::from(b)))
                .unwrap_or(Value::Null),
            Self::Date => parse_date(cell)
                .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            Self::Timestamp => parse_timestamp(cell)
                .map(|t| Value::Text(t.format("%Y-%m-%d %H:%M:%S").to_string()))
                .unwrap_or(Value::Null),
            Self::Varchar => Value::Text(cell.to_string()),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
}

/// Infer the narrowest type that fits every non-missing value
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str> + Clone) -> InferredType {
    const CANDIDATES: [InferredType; 5] = [
        InferredType::Boolean,
        InferredType::BigInt,
        InferredType::Double,
        InferredType::Date,
        InferredType::Timestamp,
    ];

    let mut any = values.clone().into_iter().peekable();
    if any.peek().is_none() {
        return InferredType::Varchar;
    }

    CANDIDATES
        .into_iter()
        .find(|candidate| values.clone().into_iter().all(|v| candidate.accepts(v)))
        .unwrap_or(InferredType::Varchar)
}

/// Rows read from one or more CSV files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    /// Column names, unique
    pub headers: Vec<String>,
    /// Row cells aligned with `headers`; `None` is a missing value
    pub rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    /// Append another table, widening the column set as needed
    pub fn append(&mut self, other: CsvTable) {
        let mut index: HashMap<String, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let mapping: Vec<usize> = other
            .headers
            .iter()
            .map(|h| {
                *index.entry(h.clone()).or_insert_with(|| {
                    self.headers.push(h.clone());
                    self.headers.len() - 1
                })
            })
            .collect();

        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, None);
        }

        for row in other.rows {
            let mut widened = vec![None; width];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                widened[target] = cell;
            }
            self.rows.push(widened);
        }
    }

    /// Infer a declared type for every column
    pub fn infer_schema(&self) -> Vec<(String, InferredType)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values = self.rows.iter().filter_map(|row| row[i].as_deref());
                (name.clone(), infer_column_type(values))
            })
            .collect()
    }
}

/// Parse CSV text with a header row
///
/// Empty headers become `Unnamed: <index>` and repeated headers get a `.1`,
/// `.2`... suffix. Short rows are padded with missing values; long rows are
/// truncated; rows the parser rejects are skipped with a warning.
pub fn parse_csv_content(content: &str) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let raw_headers: Vec<String> = reader
        .headers()
        .context("Failed to parse CSV headers")?
        .iter()
        .map(str::to_string)
        .collect();

    if raw_headers.is_empty() || raw_headers.iter().all(String::is_empty) {
        return Err(anyhow!("CSV file has no headers"));
    }

    let headers = dedupe_headers(raw_headers);
    let width = headers.len();
    let mut rows = Vec::new();

    for (line_number, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let mut row: Vec<Option<String>> = record
                    .iter()
                    .take(width)
                    .map(|cell| {
                        if NA_VALUES.contains(&cell) {
                            None
                        } else {
                            Some(cell.to_string())
                        }
                    })
                    .collect();
                row.resize(width, None);
                rows.push(row);
            }
            Err(e) => {
                // +2 for 1-based indexing and header row
                warn!("Skipping malformed CSV row {}: {}", line_number + 2, e);
            }
        }
    }

    Ok(CsvTable { headers, rows })
}

fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    raw.into_iter()
        .enumerate()
        .map(|(i, header)| {
            let base = if header.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                header
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Read and parse one CSV file
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<CsvTable> {
    let path = path.as_ref();
    let content = FileManager::read_to_string(path)?;
    parse_csv_content(&content).with_context(|| format!("Failed to parse CSV file: {:?}", path))
}

/// Quote an identifier for DDL/DML generated here
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Outcome of loading CSV data into a table
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Table that was (re)created
    pub table: String,
    /// Files read, in load order
    pub files: Vec<PathBuf>,
    /// Number of rows inserted
    pub rows: usize,
    /// Resulting table schema
    pub columns: Vec<ColumnSchema>,
}

/// Replace `table` with the contents of `data`
pub fn load_table(conn: &Connection, table: &str, data: &CsvTable) -> Result<Vec<ColumnSchema>> {
    let schema = data.infer_schema();
    let columns: Vec<ColumnSchema> = schema
        .iter()
        .map(|(name, ty)| ColumnSchema::new(name.clone(), ty.as_sql()))
        .collect();

    let definitions = columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.declared_type))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let quoted_table = quote_identifier(table);

    let load = || -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({definitions});",
            table = quoted_table,
            definitions = definitions
        ))?;

        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} VALUES ({})",
            quoted_table, placeholders
        ))?;

        for row in &data.rows {
            let values = schema
                .iter()
                .zip(row)
                .map(|((_, ty), cell)| ty.to_value(cell.as_deref()));
            stmt.execute(rusqlite::params_from_iter(values))?;
        }
        drop(stmt);
        tx.commit()?;
        Ok(())
    };
    load().with_context(|| format!("Failed to load data into table {}", table))?;

    debug!("Created table {} with {} columns", table, columns.len());
    Ok(columns)
}

/// Load every CSV file under `data_dir` into `table`
///
/// Runs on a borrowed connection; async callers go through
/// `DatabaseConnection::execute_async`.
pub fn ingest_directory<P: AsRef<Path>>(conn: &Connection, data_dir: P, table: &str) -> Result<IngestReport> {
    let data_dir = data_dir.as_ref();
    if !FileManager::dir_exists(data_dir) {
        return Err(anyhow!("Data directory does not exist: {:?}", data_dir));
    }

    let files = FileManager::find_files(data_dir, "csv")?;

    if files.is_empty() {
        return Err(anyhow!("No CSV files found in {:?}", data_dir));
    }

    let mut combined = CsvTable::default();
    for file in &files {
        let table_part = read_csv_file(file)?;
        debug!("Read {} rows from {:?}", table_part.rows.len(), file);
        combined.append(table_part);
    }

    let columns = load_table(conn, table, &combined)?;

    info!(
        "Loaded {} rows from {} CSV file(s) into {}",
        combined.rows.len(),
        files.len(),
        table
    );

    Ok(IngestReport {
        table: table.to_string(),
        files,
        rows: combined.rows.len(),
        columns,
    })
}
