//! Identifier-safe schema helpers over an injected SQL executor.
//!
//! This crate wraps the handful of schema chores a plugin's install and
//! upgrade routines keep repeating: checking whether a table, column or
//! primary key exists, dropping tables, and adding or removing columns and
//! primary keys. Each operation is one templated MySQL statement sent through
//! a caller-supplied [`Executor`].
//!
//! - [`sanitize_identifier`] / [`Identifier`] — backtick quoting that refuses
//!   names it cannot quote safely.
//! - [`Executor`] — the engine contract, with [`ErrorSilence`] scoping the
//!   error-visibility toggles around catalog probes.
//! - [`SchemaUtility`] — the probes and mutations themselves.
//! - [`SchemaConfig`] — table prefix, foreign key handling and the table
//!   existence probe, loadable from YAML.
//!
//! # Example
//!
//! ```no_run
//! use schema_util_core::{Executor, SchemaUtility};
//!
//! fn install(exec: &mut impl Executor) -> schema_util_core::Result<()> {
//!     let mut schema = SchemaUtility::new(exec);
//!     schema.drop_table_if_exists("wp_rates_tmp", true)?;
//!     if !schema.has_primary_key("wp_rates")? {
//!         schema.add_primary_key("wp_rates", "id")?;
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod executor;
mod identifier;
mod schema;

pub use config::{ExistsProbe, SchemaConfig};
pub use error::{Result, SchemaError};
pub use executor::{ErrorSilence, Executor, QueryOutcome, Row, silenced};
pub use identifier::{Identifier, QUOTE, escape_like_pattern, quote_literal, sanitize_identifier};
pub use schema::SchemaUtility;
