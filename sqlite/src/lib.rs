//! SQLite-backed [`Executor`](schema_util_core::Executor) for schema-util.
//!
//! `SchemaUtility` speaks MySQL: it probes with `SHOW FULL COLUMNS`,
//! `SHOW TABLES LIKE` and `SHOW INDEX`, and drops temporary tables with
//! `DROP TEMPORARY TABLE`. [`SqliteExecutor`] answers those statements from
//! SQLite's catalog so every operation can run against a real engine, from
//! tests or from the `schema-util` command-line tool.
//!
//! # Quick start
//!
//! ```no_run
//! use schema_util_core::SchemaUtility;
//! use schema_util_sqlite::SqliteExecutor;
//!
//! let mut exec = SqliteExecutor::open("site.db").unwrap();
//! let mut schema = SchemaUtility::new(&mut exec);
//!
//! schema.drop_table_if_exists("wp_rates_import", false).unwrap();
//! if schema.table_exists("wp_rates").unwrap() {
//!     schema.add_varchar_column("wp_rates", "region", 50).unwrap();
//! }
//! ```
//!
//! # Differences from MySQL
//!
//! SQLite cannot add or drop the primary key of an existing table, so those
//! statements fail with an engine message. `SHOW TABLES LIKE` lists base
//! tables of the main schema only, as MySQL does not list temporary tables.

mod error;
mod executor;
mod translate;

pub use error::{Result, SqliteError};
pub use executor::SqliteExecutor;
