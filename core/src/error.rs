//! Error types for schema utility operations.
//!
//! Existence probes never surface engine failures; only identifier
//! validation, missing-table preconditions and failed mutations reach the
//! caller as errors.

use thiserror::Error;

/// Errors that can occur while inspecting or mutating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Identifier is empty or contains an internal quoting delimiter.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// The identifier as supplied by the caller.
        name: String,
        /// Why the identifier cannot be quoted safely.
        reason: &'static str,
    },

    /// The table a mutation targets does not exist.
    #[error("table {table} does not exist")]
    TableNotFound {
        /// Quoted name of the missing table.
        table: String,
    },

    /// The engine reported failure for a statement expected to succeed.
    #[error("schema change failed for statement [{statement}]: {message}")]
    SchemaMutation {
        /// The statement that was issued.
        statement: String,
        /// Error text reported by the engine.
        message: String,
    },

    /// Table prefix contains characters other than alphanumerics and underscores.
    #[error("invalid table prefix '{0}': must contain only alphanumeric characters and underscores")]
    InvalidPrefix(String),

    /// Configuration file I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
