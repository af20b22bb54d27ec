//! The executor contract and scoped error silencing.
//!
//! An [`Executor`] sends SQL text to a database engine and reports the
//! outcome. It also carries two connection-wide toggles, error visibility and
//! error suppression, which catalog probes switch off for the duration of a
//! single statement through [`ErrorSilence`].

use std::ops::{Deref, DerefMut};

/// A single result row as ordered `(column, value)` pairs.
///
/// `NULL` values are `None`; every other value is rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, Option<String>)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column value.
    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.columns.push((column.into(), value));
    }

    /// Returns the value of `column`, matching the name case-insensitively.
    ///
    /// Returns `None` both for a missing column and for a `NULL` value.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .and_then(|(_, value)| value.as_deref())
    }

    /// Iterates over `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Outcome of executing one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The statement succeeded; `rows` is empty for statements without a result set.
    Success { rows: Vec<Row> },
    /// The engine rejected the statement.
    Failure { message: String },
}

impl QueryOutcome {
    /// A successful outcome with no rows.
    pub fn ok() -> Self {
        Self::Success { rows: Vec::new() }
    }

    /// A successful outcome carrying `rows`.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self::Success { rows }
    }

    /// A failed outcome carrying the engine's error text.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Returns `true` if the statement succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the result rows; empty for failures.
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Success { rows } => rows,
            Self::Failure { .. } => &[],
        }
    }

    /// Returns `true` if the statement succeeded with at least one row.
    pub fn has_rows(&self) -> bool {
        !self.rows().is_empty()
    }

    /// Returns the engine error text for failures.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } => Some(message),
        }
    }
}

/// Sends SQL text to a database engine.
///
/// Implementations own whatever connection state the engine needs. The two
/// toggles mirror a connection that can print engine errors and can be told
/// to keep quiet about them; both setters return the previous setting so the
/// caller can restore it.
pub trait Executor {
    /// Executes one statement and reports its outcome.
    fn execute(&mut self, sql: &str) -> QueryOutcome;

    /// Sets whether engine errors are shown, returning the previous setting.
    fn set_error_visibility(&mut self, visible: bool) -> bool;

    /// Sets whether engine errors are suppressed, returning the previous setting.
    fn set_error_suppression(&mut self, suppress: bool) -> bool;

    /// Error text of the most recent failed statement, if any.
    fn last_error(&self) -> Option<&str>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, sql: &str) -> QueryOutcome {
        (**self).execute(sql)
    }

    fn set_error_visibility(&mut self, visible: bool) -> bool {
        (**self).set_error_visibility(visible)
    }

    fn set_error_suppression(&mut self, suppress: bool) -> bool {
        (**self).set_error_suppression(suppress)
    }

    fn last_error(&self) -> Option<&str> {
        (**self).last_error()
    }
}

/// Hides and suppresses engine errors for as long as it is held.
///
/// Dropping the guard restores both previous settings, whichever way the
/// scope is left. The guard holds the only mutable borrow of the executor,
/// so no other caller can issue statements while errors are silenced.
pub struct ErrorSilence<'a, E: Executor + ?Sized> {
    exec: &'a mut E,
    prev_visible: bool,
    prev_suppressed: bool,
}

impl<'a, E: Executor + ?Sized> ErrorSilence<'a, E> {
    /// Silences errors on `exec` until the guard is dropped.
    pub fn new(exec: &'a mut E) -> Self {
        let prev_visible = exec.set_error_visibility(false);
        let prev_suppressed = exec.set_error_suppression(true);
        Self {
            exec,
            prev_visible,
            prev_suppressed,
        }
    }
}

impl<E: Executor + ?Sized> Deref for ErrorSilence<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &*self.exec
    }
}

impl<E: Executor + ?Sized> DerefMut for ErrorSilence<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut *self.exec
    }
}

impl<E: Executor + ?Sized> Drop for ErrorSilence<'_, E> {
    fn drop(&mut self) {
        self.exec.set_error_suppression(self.prev_suppressed);
        self.exec.set_error_visibility(self.prev_visible);
    }
}

/// Runs `f` with errors silenced on `exec`, restoring the toggles afterwards.
pub fn silenced<E, T>(exec: &mut E, f: impl FnOnce(&mut E) -> T) -> T
where
    E: Executor + ?Sized,
{
    let mut guard = ErrorSilence::new(exec);
    f(&mut *guard)
}
