//! Unified error types for the bootstrap crate.

use thiserror::Error;

/// Errors raised while configuring, bootstrapping, or querying the project database.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment could not be turned into a valid config
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what was wrong
        message: String,
    },

    /// Error reported by the database engine or the ORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A metadata row with this key already exists
    #[error("Metadata key '{key}' already exists")]
    DuplicateKey {
        /// The conflicting key
        key: String,
    },

    /// No metadata row with this key
    #[error("Metadata key '{key}' not found")]
    MetadataNotFound {
        /// The missing key
        key: String,
    },

    /// No process log row with this id
    #[error("Process log entry {id} not found")]
    ProcessNotFound {
        /// The missing row id
        id: i32,
    },

    /// The stored `srid` value is not a positive integer
    #[error("Invalid SRID value: '{value}'")]
    InvalidSrid {
        /// The raw stored value
        value: String,
    },

    /// The connected backend cannot run this operation (e.g. PostGIS catalog on `SQLite`)
    #[error("Operation '{operation}' is not supported on the {backend} backend")]
    UnsupportedBackend {
        /// Backend name as reported by the connection
        backend: String,
        /// What was attempted
        operation: String,
    },

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
