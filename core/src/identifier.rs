//! Identifier quoting and literal escaping.
//!
//! Table and column names are wrapped in backticks before they are
//! interpolated into a statement. A name may arrive already wrapped; one
//! leading and one trailing backtick are stripped before the inner text is
//! checked. An inner backtick cannot be quoted safely and is rejected rather
//! than escaped.

use std::fmt;

use crate::error::{Result, SchemaError};

/// The identifier quoting delimiter.
pub const QUOTE: char = '`';

/// A validated table or column name.
///
/// Holds the inner (unquoted) text. [`Display`](fmt::Display) prints the
/// quoted form, so an `Identifier` can be formatted straight into SQL.
///
/// # Examples
///
/// ```
/// use schema_util_core::Identifier;
///
/// let ident = Identifier::parse("`wp_posts`").unwrap();
/// assert_eq!(ident.name(), "wp_posts");
/// assert_eq!(ident.to_string(), "`wp_posts`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
}

impl Identifier {
    /// Parses a raw name, stripping one surrounding pair of delimiters.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidIdentifier`] if the inner name is empty
    /// or still contains a delimiter.
    pub fn parse(raw: &str) -> Result<Self> {
        let inner = raw.strip_prefix(QUOTE).unwrap_or(raw);
        let inner = inner.strip_suffix(QUOTE).unwrap_or(inner);

        if inner.is_empty() {
            return Err(SchemaError::InvalidIdentifier {
                name: raw.to_string(),
                reason: "identifier is empty",
            });
        }
        if inner.contains(QUOTE) {
            return Err(SchemaError::InvalidIdentifier {
                name: raw.to_string(),
                reason: "identifier internally contains a backtick",
            });
        }

        Ok(Self {
            name: inner.to_string(),
        })
    }

    /// Returns the inner name without delimiters.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the delimiter-wrapped name.
    pub fn quoted(&self) -> String {
        format!("{QUOTE}{}{QUOTE}", self.name)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{QUOTE}{}{QUOTE}", self.name)
    }
}

/// Wraps a raw name in backticks, accepting names that are already wrapped.
///
/// Applying it to its own output returns the same string.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidIdentifier`] if the name is empty or contains
/// a backtick anywhere other than as its first or last character.
///
/// # Examples
///
/// ```
/// use schema_util_core::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("alpha").unwrap(), "`alpha`");
/// assert_eq!(sanitize_identifier("`alpha`").unwrap(), "`alpha`");
/// assert!(sanitize_identifier("`al`pha`").is_err());
/// ```
pub fn sanitize_identifier(name: &str) -> Result<String> {
    Identifier::parse(name).map(|ident| ident.quoted())
}

/// Renders `value` as a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Escapes `value` for use inside a quoted `LIKE` literal so that it only
/// matches itself.
///
/// The result is the literal body without the surrounding quotes. `%` and `_`
/// become `\%` and `\_`, a backslash is escaped for both the literal and the
/// pattern, and `'` is doubled.
pub fn escape_like_pattern(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '\'' => out.push_str("''"),
            other => out.push(other),
        }
    }
    out
}
