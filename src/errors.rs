/*!
 * Error types for the lang2sql application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Coarse classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Credentials were missing or rejected
    Authentication,
    /// The provider throttled the request
    RateLimit,
    /// Network failure, timeout or server-side error; the same request may succeed later
    Transient,
    /// The provider answered but the body could not be understood
    MalformedResponse,
    /// The provider refused the request for another reason (bad model name, invalid parameters)
    Rejected,
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from the API
        message: String,
        /// Value of the Retry-After header, when the provider sent one
        retry_after_secs: Option<u64>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify this error
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::AuthenticationError(_) => ProviderErrorKind::Authentication,
            Self::RateLimitExceeded { .. } => ProviderErrorKind::RateLimit,
            Self::ConnectionError(_) | Self::RequestFailed(_) => ProviderErrorKind::Transient,
            Self::ApiError { status_code, .. } if *status_code >= 500 || *status_code == 408 => {
                ProviderErrorKind::Transient
            }
            Self::ApiError { .. } => ProviderErrorKind::Rejected,
            Self::ParseError(_) => ProviderErrorKind::MalformedResponse,
        }
    }
}

/// Errors raised by the schema collaborator
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The table identifier is unknown to the storage engine
    #[error("Table not found: {0}")]
    NotFound(String),

    /// The storage engine failed while describing the table
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors that can occur while translating a natural-language request to SQL
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The caller supplied an unknown table
    #[error("Schema not found for table '{0}'")]
    SchemaNotFound(String),

    /// The table exists but reported zero columns
    #[error("Table '{0}' has no columns")]
    EmptySchema(String),

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The storage engine failed while describing the table
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SchemaError> for TranslationError {
    fn from(error: SchemaError) -> Self {
        match error {
            SchemaError::NotFound(table) => Self::SchemaNotFound(table),
            SchemaError::Storage(message) => Self::Storage(message),
        }
    }
}

impl TranslationError {
    /// Provider error kind, if this failure came from the completion provider
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Self::Provider(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Errors raised when running generated SQL against the storage engine
#[derive(Error, Debug)]
pub enum QueryError {
    /// The statement could not be parsed
    #[error("Malformed SQL: {0}")]
    Malformed(String),

    /// The statement references a table or column that does not exist
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// A value did not match the expected type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Any other execution failure
    #[error("Query execution failed: {0}")]
    Execution(String),
}

impl QueryError {
    /// Classify a storage engine error message
    pub fn from_engine_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("syntax error") || lower.contains("incomplete input") {
            Self::Malformed(message)
        } else if lower.contains("no such column")
            || lower.contains("no such table")
            || lower.contains("no such function")
            || lower.contains("ambiguous column")
        {
            Self::UnknownIdentifier(message)
        } else if lower.contains("datatype mismatch") || lower.contains("type mismatch") {
            Self::TypeMismatch(message)
        } else {
            Self::Execution(message)
        }
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(error: rusqlite::Error) -> Self {
        Self::from_engine_message(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from running a query
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
