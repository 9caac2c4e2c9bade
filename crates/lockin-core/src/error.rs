//! Core error types for lockin-core.
//!
//! The focus session itself never fails; these errors cover the
//! collaborators around it (configuration, the session store and the
//! remote query backend).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lockin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote query backend errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open session store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Session store is locked")]
    Locked,

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Remote query backend errors. No retries are attempted.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (connect, TLS, body decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status
    #[error("Query '{query}' returned HTTP {status}")]
    Status { query: String, status: u16 },

    /// Backend answered `success: false`
    #[error("Query '{query}' rejected: {message}")]
    Rejected { query: String, message: String },

    /// Base URL or query name does not form a valid URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Record has none of the identifier aliases for its kind
    #[error("{kind} record has no identifier (looked for {fields})")]
    MissingIdentifier { kind: String, fields: String },

    /// Expected a JSON object
    #[error("Expected a JSON object for {0} record")]
    NotAnObject(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_names_query() {
        let err = CoreError::from(RemoteError::Rejected {
            query: "login-user".into(),
            message: "bad password".into(),
        });
        assert_eq!(
            err.to_string(),
            "Remote error: Query 'login-user' rejected: bad password"
        );
    }

    #[test]
    fn sqlite_errors_become_query_failures() {
        let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }
}
