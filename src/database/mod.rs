/*!
 * SQLite storage engine for the queried dataset.
 *
 * This module provides:
 * - Connection management (in-memory or file-backed)
 * - Schema introspection for prompt building
 * - CSV ingestion into the single known table
 * - Execution of generated SQL and tabular rendering of results
 */

pub mod connection;
pub mod ingest;
pub mod query;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use ingest::{ingest_directory, IngestReport};
pub use query::QueryResult;
pub use schema::SchemaProvider;
