/*!
 * # lang2sql - natural-language questions to SQL
 *
 * A Rust library that turns a plain-language request about a table into a
 * SQL query written by an LLM.
 *
 * ## Features
 *
 * - Describe the target table and build a two-turn prompt from its schema
 * - Request a completion from various AI providers:
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Quote column names in the generated SQL
 * - Load CSV files into SQLite and run the generated queries
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Prompt building, identifier quoting and the translation service:
 *   - `translation::core`: Translation service and result wrapper
 *   - `translation::prompts`: Prompt templates and builder
 *   - `translation::quoting`: Column-name quoting
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::ollama`: Ollama API client
 * - `database`: SQLite storage, schema introspection, CSV ingestion and query execution
 * - `file_utils`: File system operations
 * - `app_controller`: Interactive loop and one-shot commands
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{DatabaseConnection, QueryResult, SchemaProvider};
pub use errors::{AppError, ProviderError, ProviderErrorKind, QueryError, TranslationError};
pub use translation::{ColumnSchema, PromptPair, TranslationResult, TranslationService};
