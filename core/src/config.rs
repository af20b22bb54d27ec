//! Configuration for schema utility operations.
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! table_prefix: wp_
//! disable_foreign_key_checks: true
//! exists_probe: show_full_columns
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Catalog probe used to decide whether a table exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistsProbe {
    /// `SHOW FULL COLUMNS FROM <table>`: succeeds only for an existing table,
    /// temporary tables included.
    #[default]
    ShowFullColumns,
    /// `SHOW TABLES LIKE '<name>'`: exact-name match over base tables.
    /// Temporary tables are not listed.
    ShowTablesLike,
}

/// Settings shared by every operation of a [`SchemaUtility`](crate::SchemaUtility).
///
/// # Examples
///
/// ```
/// # use schema_util_core::{ExistsProbe, SchemaConfig};
/// let config: SchemaConfig = serde_yaml::from_str("table_prefix: wp_").unwrap();
/// assert_eq!(config.table_prefix, "wp_");
/// assert!(!config.disable_foreign_key_checks);
/// assert_eq!(config.exists_probe, ExistsProbe::ShowFullColumns);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Prefix prepended to short table names by
    /// [`SchemaUtility::table_name`](crate::SchemaUtility::table_name).
    pub table_prefix: String,
    /// Turn foreign key checks off around `DROP TABLE`.
    pub disable_foreign_key_checks: bool,
    /// Probe used by [`SchemaUtility::table_exists`](crate::SchemaUtility::table_exists).
    pub exists_probe: ExistsProbe,
}

impl SchemaConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SchemaError::IoError) if the file cannot be read,
    /// [`YamlError`](SchemaError::YamlError) if parsing fails, or
    /// [`InvalidPrefix`](SchemaError::InvalidPrefix) if the table prefix is
    /// not a plain identifier fragment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SchemaError::IoError) if the file cannot be
    /// written, or [`YamlError`](SchemaError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that the table prefix contains only alphanumerics and underscores.
    ///
    /// An empty prefix is valid and leaves table names unchanged.
    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.table_prefix)
    }
}

pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SchemaError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}
