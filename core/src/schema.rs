//! Schema introspection and mutation over an injected [`Executor`].
//!
//! Every table and column name passes through [`Identifier::parse`] before it
//! is interpolated into a statement. Catalog probes run with engine errors
//! silenced and turn failures into `false`. Mutations check their
//! preconditions against live catalog state first, so "already done" is a
//! quiet `Ok(false)` instead of an engine-specific error code.

use tracing::{debug, info, warn};

use crate::config::{ExistsProbe, SchemaConfig};
use crate::error::{Result, SchemaError};
use crate::executor::{Executor, QueryOutcome, silenced};
use crate::identifier::{Identifier, QUOTE, escape_like_pattern, quote_literal};

const DISABLE_FOREIGN_KEY_CHECKS: &str = "SET FOREIGN_KEY_CHECKS=0;";
const ENABLE_FOREIGN_KEY_CHECKS: &str = "SET FOREIGN_KEY_CHECKS=1;";

/// Schema helpers bound to one executor.
///
/// Holds no catalog state between calls; every check re-queries the engine.
/// Borrowing the executor mutably keeps the error-silencing toggles private
/// to the operation in progress.
///
/// # Examples
///
/// ```no_run
/// use schema_util_core::{Executor, SchemaUtility};
///
/// fn migrate(exec: &mut impl Executor) -> schema_util_core::Result<()> {
///     let mut schema = SchemaUtility::new(exec);
///     if schema.table_exists("wp_rates")? {
///         schema.add_varchar_column("wp_rates", "region", 50)?;
///     }
///     schema.drop_table_if_exists("wp_rates_import", false)?;
///     Ok(())
/// }
/// ```
pub struct SchemaUtility<'e, E: Executor + ?Sized> {
    exec: &'e mut E,
    config: SchemaConfig,
}

impl<'e, E: Executor + ?Sized> SchemaUtility<'e, E> {
    /// Creates a utility with the default configuration.
    pub fn new(exec: &'e mut E) -> Self {
        Self {
            exec,
            config: SchemaConfig::default(),
        }
    }

    /// Creates a utility with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPrefix`] if the configured table prefix
    /// is invalid.
    pub fn with_config(exec: &'e mut E, config: SchemaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { exec, config })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Returns the underlying executor for statements this utility does not cover.
    pub fn executor(&mut self) -> &mut E {
        &mut *self.exec
    }

    /// Prepends the configured table prefix to a short table name.
    ///
    /// Delimiters around `short` are dropped so the prefix lands inside them.
    pub fn table_name(&self, short: &str) -> String {
        let inner = short.strip_prefix(QUOTE).unwrap_or(short);
        let inner = inner.strip_suffix(QUOTE).unwrap_or(inner);
        format!("{}{inner}", self.config.table_prefix)
    }

    /// Returns `true` if a table with exactly this name exists.
    ///
    /// Engine failures count as "does not exist".
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidIdentifier`] if the name cannot be quoted.
    pub fn table_exists(&mut self, name: &str) -> Result<bool> {
        let table = Identifier::parse(name)?;
        Ok(self.probe_table(&table))
    }

    /// Returns `true` if `table` has a column named `column`.
    ///
    /// Does not check that the table exists; a missing table yields `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidIdentifier`] if either name cannot be quoted.
    pub fn column_exists(&mut self, table: &str, column: &str) -> Result<bool> {
        let table = Identifier::parse(table)?;
        let column = Identifier::parse(column)?;
        Ok(self.probe_column(&table, &column))
    }

    /// Returns `true` if `table` has a primary key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidIdentifier`] if the name cannot be quoted.
    pub fn has_primary_key(&mut self, table: &str) -> Result<bool> {
        let table = Identifier::parse(table)?;
        Ok(self.probe_primary_key(&table))
    }

    /// Drops a table if it exists. Dropping an absent table is not an error.
    ///
    /// With `temporary` set, only a temporary table of that name is dropped.
    /// When [`SchemaConfig::disable_foreign_key_checks`] is set, checks are
    /// turned off for the drop and turned back on afterwards even if the drop
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidIdentifier`] if the name cannot be quoted,
    /// or [`SchemaError::SchemaMutation`] if the engine rejects the drop.
    pub fn drop_table_if_exists(&mut self, name: &str, temporary: bool) -> Result<()> {
        let table = Identifier::parse(name)?;
        let sql = if temporary {
            format!("DROP TEMPORARY TABLE IF EXISTS {table};")
        } else {
            format!("DROP TABLE IF EXISTS {table};")
        };
        let toggle_foreign_keys = self.config.disable_foreign_key_checks;

        debug!(sql = %sql, "dropping table");
        silenced(&mut *self.exec, |exec| {
            if toggle_foreign_keys {
                run_mutation(exec, DISABLE_FOREIGN_KEY_CHECKS)?;
            }
            let dropped = run_mutation(exec, &sql);
            if toggle_foreign_keys {
                let restored = run_mutation(exec, ENABLE_FOREIGN_KEY_CHECKS);
                dropped?;
                return restored;
            }
            dropped
        })?;

        info!(table = %table, temporary, "table dropped if it existed");
        Ok(())
    }

    /// Drops a non-temporary table if it exists.
    #[deprecated(since = "0.1.0", note = "use `drop_table_if_exists` instead")]
    pub fn maybe_drop_old_table(&mut self, name: &str) -> Result<()> {
        warn!(
            table = name,
            "maybe_drop_old_table is deprecated, use drop_table_if_exists"
        );
        self.drop_table_if_exists(name, false)
    }

    /// Adds a nullable `varchar(length)` column defaulting to `''`.
    ///
    /// Returns `Ok(true)` if the column was added and `Ok(false)` if it was
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TableNotFound`] if the table does not exist,
    /// [`SchemaError::InvalidIdentifier`] for an unquotable name, or
    /// [`SchemaError::SchemaMutation`] if the engine rejects the change.
    pub fn add_varchar_column(&mut self, table: &str, column: &str, length: u32) -> Result<bool> {
        let table = Identifier::parse(table)?;
        let column = Identifier::parse(column)?;
        self.require_table(&table)?;

        if self.probe_column(&table, &column) {
            debug!(table = %table, column = %column, "column already exists");
            return Ok(false);
        }

        self.mutate(&format!(
            "ALTER TABLE {table} ADD COLUMN {column} varchar({length}) NULL DEFAULT '';"
        ))?;
        info!(table = %table, column = %column, length, "added varchar column");
        Ok(true)
    }

    /// Adds a primary key on `column`.
    ///
    /// Returns `Ok(false)` without touching the table if it already has a
    /// primary key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TableNotFound`] if the table does not exist,
    /// [`SchemaError::InvalidIdentifier`] for an unquotable name, or
    /// [`SchemaError::SchemaMutation`] if the engine rejects the change.
    pub fn add_primary_key(&mut self, table: &str, column: &str) -> Result<bool> {
        let table = Identifier::parse(table)?;
        let column = Identifier::parse(column)?;
        self.require_table(&table)?;

        if self.probe_primary_key(&table) {
            debug!(table = %table, "primary key already exists");
            return Ok(false);
        }

        self.mutate(&format!("ALTER TABLE {table} ADD PRIMARY KEY ({column});"))?;
        info!(table = %table, column = %column, "added primary key");
        Ok(true)
    }

    /// Drops the primary key of `table`.
    ///
    /// Returns `Ok(false)` if the table has no primary key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TableNotFound`] if the table does not exist,
    /// [`SchemaError::InvalidIdentifier`] for an unquotable name, or
    /// [`SchemaError::SchemaMutation`] if the engine rejects the change.
    pub fn drop_primary_key(&mut self, table: &str) -> Result<bool> {
        let table = Identifier::parse(table)?;
        self.require_table(&table)?;

        if !self.probe_primary_key(&table) {
            debug!(table = %table, "no primary key to drop");
            return Ok(false);
        }

        self.mutate(&format!("ALTER TABLE {table} DROP PRIMARY KEY;"))?;
        info!(table = %table, "dropped primary key");
        Ok(true)
    }

    /// Drops `column` from `table`.
    ///
    /// Returns `Ok(false)` if the column does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TableNotFound`] if the table does not exist,
    /// [`SchemaError::InvalidIdentifier`] for an unquotable name, or
    /// [`SchemaError::SchemaMutation`] if the engine rejects the change.
    pub fn drop_column(&mut self, table: &str, column: &str) -> Result<bool> {
        let table = Identifier::parse(table)?;
        let column = Identifier::parse(column)?;
        self.require_table(&table)?;

        if !self.probe_column(&table, &column) {
            debug!(table = %table, column = %column, "no column to drop");
            return Ok(false);
        }

        self.mutate(&format!("ALTER TABLE {table} DROP COLUMN {column};"))?;
        info!(table = %table, column = %column, "dropped column");
        Ok(true)
    }

    fn probe_table(&mut self, table: &Identifier) -> bool {
        match self.config.exists_probe {
            ExistsProbe::ShowFullColumns => self
                .probe(&format!("SHOW FULL COLUMNS FROM {table};"))
                .is_success(),
            ExistsProbe::ShowTablesLike => self
                .probe(&format!(
                    "SHOW TABLES LIKE '{}';",
                    escape_like_pattern(table.name())
                ))
                .has_rows(),
        }
    }

    fn probe_column(&mut self, table: &Identifier, column: &Identifier) -> bool {
        self.probe(&format!(
            "SHOW FULL COLUMNS FROM {table} WHERE `field`={};",
            quote_literal(column.name())
        ))
        .has_rows()
    }

    fn probe_primary_key(&mut self, table: &Identifier) -> bool {
        self.probe(&format!(
            "SHOW INDEX FROM {table} WHERE Key_name = 'PRIMARY';"
        ))
        .has_rows()
    }

    fn probe(&mut self, sql: &str) -> QueryOutcome {
        debug!(sql, "catalog probe");
        silenced(&mut *self.exec, |exec| exec.execute(sql))
    }

    fn require_table(&mut self, table: &Identifier) -> Result<()> {
        if self.probe_table(table) {
            Ok(())
        } else {
            Err(SchemaError::TableNotFound {
                table: table.quoted(),
            })
        }
    }

    fn mutate(&mut self, sql: &str) -> Result<()> {
        debug!(sql, "schema change");
        run_mutation(&mut *self.exec, sql)
    }
}

fn run_mutation<E: Executor + ?Sized>(exec: &mut E, sql: &str) -> Result<()> {
    match exec.execute(sql) {
        QueryOutcome::Success { .. } => Ok(()),
        QueryOutcome::Failure { message } => Err(SchemaError::SchemaMutation {
            statement: sql.to_string(),
            message,
        }),
    }
}
