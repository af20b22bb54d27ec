//! Error types for the SQLite executor.
//!
//! These never cross the [`Executor`](schema_util_core::Executor) boundary as
//! values: a failed statement is reported as a
//! [`QueryOutcome::Failure`](schema_util_core::QueryOutcome::Failure) carrying
//! the error's display text.

use thiserror::Error;

/// Errors that can occur while opening a database or running a statement.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A catalog statement named a table that does not exist.
    #[error("Table '{0}' doesn't exist")]
    TableNotFound(String),

    /// The statement has no SQLite equivalent.
    #[error("unsupported statement: {0}")]
    Unsupported(&'static str),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
