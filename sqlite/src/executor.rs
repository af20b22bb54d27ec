//! [`Executor`] implementation over a `rusqlite` connection.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, params};
use schema_util_core::{Executor, QueryOutcome, Row};
use tracing::{debug, error};

use crate::error::{Result, SqliteError};
use crate::translate::{self, Statement};

/// Runs schema-util statements against SQLite.
///
/// MySQL catalog statements (`SHOW FULL COLUMNS`, `SHOW TABLES LIKE`,
/// `SHOW INDEX`) are answered from SQLite's own catalog with the same
/// success and failure behavior: probing a missing table fails. Table names
/// are matched exactly, across the main and temp schemas.
///
/// Failed statements are remembered as [`last_error`](Executor::last_error).
/// While errors are visible and not suppressed they are also logged.
///
/// # Examples
///
/// ```
/// use schema_util_core::SchemaUtility;
/// use schema_util_sqlite::SqliteExecutor;
///
/// let mut exec = SqliteExecutor::open_in_memory().unwrap();
/// exec.connection()
///     .execute_batch("CREATE TABLE rates (id INTEGER PRIMARY KEY);")
///     .unwrap();
///
/// let mut schema = SchemaUtility::new(&mut exec);
/// assert!(schema.table_exists("rates").unwrap());
/// assert!(schema.add_varchar_column("rates", "region", 50).unwrap());
/// ```
pub struct SqliteExecutor {
    conn: Connection,
    errors_visible: bool,
    errors_suppressed: bool,
    last_error: Option<String>,
}

impl SqliteExecutor {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection and turns foreign key enforcement on.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            errors_visible: true,
            errors_suppressed: false,
            last_error: None,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the executor and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn run(&self, sql: &str) -> Result<Vec<Row>> {
        match translate::classify(sql) {
            Statement::ShowColumns { table, field } => self.show_columns(&table, field.as_deref()),
            Statement::ShowTablesLike { pattern } => self.show_tables_like(&pattern),
            Statement::ShowPrimaryIndex { table } => self.show_primary_index(&table),
            Statement::DropTemporaryTable { table, if_exists } => {
                let guard = if if_exists { "IF EXISTS " } else { "" };
                self.conn
                    .execute_batch(&format!("DROP TABLE {guard}temp.{table};"))?;
                Ok(Vec::new())
            }
            Statement::ForeignKeyChecks(enabled) => {
                let value = if enabled { "ON" } else { "OFF" };
                self.conn
                    .execute_batch(&format!("PRAGMA foreign_keys = {value};"))?;
                Ok(Vec::new())
            }
            Statement::AlterPrimaryKey => Err(SqliteError::Unsupported(
                "SQLite cannot add or drop the primary key of an existing table",
            )),
            Statement::Passthrough => self.passthrough(sql),
        }
    }

    /// Returns the schema (`temp` or `main`) holding a table with exactly this name.
    ///
    /// `temp` is checked first because it shadows `main` for unqualified names.
    fn table_schema(&self, table: &str) -> Result<Option<&'static str>> {
        for (schema, catalog) in [("temp", "sqlite_temp_master"), ("main", "sqlite_master")] {
            let count: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {catalog} WHERE type = 'table' AND name = ?1"),
                params![table],
                |row| row.get(0),
            )?;
            if count > 0 {
                return Ok(Some(schema));
            }
        }
        Ok(None)
    }

    fn require_table(&self, table: &str) -> Result<&'static str> {
        self.table_schema(table)?
            .ok_or_else(|| SqliteError::TableNotFound(table.to_string()))
    }

    fn show_columns(&self, table: &str, field: Option<&str>) -> Result<Vec<Row>> {
        let schema = self.require_table(table)?;
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1, ?2) ORDER BY cid",
        )?;
        let columns = stmt.query_map(params![table, schema], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut rows = Vec::new();
        for column in columns {
            let (name, ty, not_null, default, pk) = column?;
            if field.is_some_and(|f| !f.eq_ignore_ascii_case(&name)) {
                continue;
            }
            let mut row = Row::new();
            row.push("Field", Some(name));
            row.push("Type", Some(ty));
            row.push("Null", Some(if not_null { "NO" } else { "YES" }.to_string()));
            row.push("Key", Some(if pk > 0 { "PRI" } else { "" }.to_string()));
            row.push("Default", default);
            rows.push(row);
        }
        Ok(rows)
    }

    fn show_tables_like(&self, pattern: &str) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name",
        )?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut rows = Vec::new();
        for name in names {
            let name = name?;
            if translate::like_matches(pattern, &name) {
                let mut row = Row::new();
                row.push(format!("Tables_in_main ({pattern})"), Some(name));
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn show_primary_index(&self, table: &str) -> Result<Vec<Row>> {
        let schema = self.require_table(table)?;
        let mut stmt = self.conn.prepare(
            "SELECT name, pk FROM pragma_table_info(?1, ?2) WHERE pk > 0 ORDER BY pk",
        )?;
        let keys = stmt.query_map(params![table, schema], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut rows = Vec::new();
        for key in keys {
            let (column, seq) = key?;
            let mut row = Row::new();
            row.push("Table", Some(table.to_string()));
            row.push("Non_unique", Some("0".to_string()));
            row.push("Key_name", Some("PRIMARY".to_string()));
            row.push("Seq_in_index", Some(seq.to_string()));
            row.push("Column_name", Some(column));
            rows.push(row);
        }
        Ok(rows)
    }

    fn passthrough(&self, sql: &str) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() == 0 {
            stmt.execute([])?;
            return Ok(Vec::new());
        }

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut result = stmt.query([])?;
        let mut rows = Vec::new();
        while let Some(source) = result.next()? {
            let mut row = Row::new();
            for (i, name) in names.iter().enumerate() {
                row.push(name.clone(), value_to_text(source.get_ref(i)?));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

fn value_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

impl Executor for SqliteExecutor {
    fn execute(&mut self, sql: &str) -> QueryOutcome {
        debug!(sql, "executing statement");
        match self.run(sql) {
            Ok(rows) => QueryOutcome::with_rows(rows),
            Err(err) => {
                let message = err.to_string();
                if self.errors_visible && !self.errors_suppressed {
                    error!(sql, error = %message, "statement failed");
                }
                self.last_error = Some(message.clone());
                QueryOutcome::failure(message)
            }
        }
    }

    fn set_error_visibility(&mut self, visible: bool) -> bool {
        std::mem::replace(&mut self.errors_visible, visible)
    }

    fn set_error_suppression(&mut self, suppress: bool) -> bool {
        std::mem::replace(&mut self.errors_suppressed, suppress)
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor_with(sql: &str) -> SqliteExecutor {
        let exec = SqliteExecutor::open_in_memory().unwrap();
        exec.connection().execute_batch(sql).unwrap();
        exec
    }

    #[test]
    fn test_show_columns_on_missing_table_fails() {
        let mut exec = SqliteExecutor::open_in_memory().unwrap();
        let outcome = exec.execute("SHOW FULL COLUMNS FROM `nope`;");
        assert_eq!(outcome.error_message(), Some("Table 'nope' doesn't exist"));
        assert_eq!(exec.last_error(), Some("Table 'nope' doesn't exist"));
    }

    #[test]
    fn test_show_columns_lists_fields() {
        let mut exec = executor_with(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL, note varchar(20) DEFAULT '');",
        );
        let outcome = exec.execute("SHOW FULL COLUMNS FROM `t`;");
        let fields: Vec<_> = outcome.rows().iter().filter_map(|r| r.get("Field")).collect();
        assert_eq!(fields, vec!["id", "name", "note"]);

        let id = &outcome.rows()[0];
        assert_eq!(id.get("Key"), Some("PRI"));
        let name = &outcome.rows()[1];
        assert_eq!(name.get("Null"), Some("NO"));
        assert_eq!(name.get("Key"), Some(""));
        let note = &outcome.rows()[2];
        assert_eq!(note.get("Type"), Some("varchar(20)"));
        assert_eq!(note.get("Default"), Some("''"));
    }

    #[test]
    fn test_show_columns_with_field_filter() {
        let mut exec = executor_with("CREATE TABLE t (id INTEGER, name TEXT);");
        assert!(exec
            .execute("SHOW FULL COLUMNS FROM `t` WHERE `field`='name';")
            .has_rows());
        assert!(exec
            .execute("SHOW FULL COLUMNS FROM `t` WHERE `field`='NAME';")
            .has_rows());
        let outcome = exec.execute("SHOW FULL COLUMNS FROM `t` WHERE `field`='zip';");
        assert!(outcome.is_success());
        assert!(!outcome.has_rows());
    }

    #[test]
    fn test_table_lookup_is_case_sensitive() {
        let mut exec = executor_with("CREATE TABLE CHEESE2 (c int);");
        assert!(exec.execute("SHOW FULL COLUMNS FROM `CHEESE2`;").is_success());
        assert!(!exec.execute("SHOW FULL COLUMNS FROM `cheese2`;").is_success());
        assert!(exec.execute("SHOW TABLES LIKE 'CHEESE2';").has_rows());
        assert!(!exec.execute("SHOW TABLES LIKE 'cheese2';").has_rows());
    }

    #[test]
    fn test_temporary_tables() {
        let mut exec = executor_with("CREATE TEMPORARY TABLE scratch (c int);");
        assert!(exec.execute("SHOW FULL COLUMNS FROM `scratch`;").is_success());
        // Temporary tables are not listed by SHOW TABLES.
        assert!(!exec.execute("SHOW TABLES LIKE 'scratch';").has_rows());

        assert!(exec
            .execute("DROP TEMPORARY TABLE IF EXISTS `scratch`;")
            .is_success());
        assert!(!exec.execute("SHOW FULL COLUMNS FROM `scratch`;").is_success());
    }

    #[test]
    fn test_drop_temporary_leaves_regular_table() {
        let mut exec = executor_with("CREATE TABLE kept (c int);");
        assert!(exec
            .execute("DROP TEMPORARY TABLE IF EXISTS `kept`;")
            .is_success());
        assert!(exec.execute("SHOW FULL COLUMNS FROM `kept`;").is_success());
    }

    #[test]
    fn test_show_primary_index() {
        let mut exec = executor_with(
            "CREATE TABLE keyed (a INTEGER, b TEXT, PRIMARY KEY (a, b)); CREATE TABLE heap (a INTEGER);",
        );
        let outcome = exec.execute("SHOW INDEX FROM `keyed` WHERE Key_name = 'PRIMARY';");
        let columns: Vec<_> = outcome.rows().iter().filter_map(|r| r.get("Column_name")).collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert!(!exec
            .execute("SHOW INDEX FROM `heap` WHERE Key_name = 'PRIMARY';")
            .has_rows());
        assert!(!exec
            .execute("SHOW INDEX FROM `absent` WHERE Key_name = 'PRIMARY';")
            .is_success());
    }

    #[test]
    fn test_foreign_key_toggle() {
        let mut exec = SqliteExecutor::open_in_memory().unwrap();
        let enabled = |exec: &SqliteExecutor| -> i64 {
            exec.connection()
                .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .unwrap()
        };
        assert_eq!(enabled(&exec), 1);
        assert!(exec.execute("SET FOREIGN_KEY_CHECKS=0;").is_success());
        assert_eq!(enabled(&exec), 0);
        assert!(exec.execute("SET FOREIGN_KEY_CHECKS=1;").is_success());
        assert_eq!(enabled(&exec), 1);
    }

    #[test]
    fn test_alter_primary_key_is_rejected() {
        let mut exec = executor_with("CREATE TABLE heap (a INTEGER);");
        let outcome = exec.execute("ALTER TABLE `heap` ADD PRIMARY KEY (`a`);");
        assert!(outcome
            .error_message()
            .is_some_and(|m| m.contains("primary key")));
    }

    #[test]
    fn test_passthrough_returns_rows() {
        let mut exec = executor_with("CREATE TABLE t (id INTEGER, label TEXT); INSERT INTO t VALUES (1, NULL);");
        let outcome = exec.execute("SELECT id, label FROM `t`");
        assert_eq!(outcome.rows().len(), 1);
        assert_eq!(outcome.rows()[0].get("id"), Some("1"));
        assert_eq!(outcome.rows()[0].get("label"), None);
    }

    #[test]
    fn test_toggles_return_previous_values() {
        let mut exec = SqliteExecutor::open_in_memory().unwrap();
        assert!(exec.set_error_visibility(false));
        assert!(!exec.set_error_visibility(true));
        assert!(!exec.set_error_suppression(true));
        assert!(exec.set_error_suppression(false));
    }
}
