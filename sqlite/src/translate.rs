//! Recognition of MySQL-dialect statements that SQLite cannot run as written.
//!
//! Only the catalog and session statements issued by `SchemaUtility` are
//! recognized. Anything else is classified as [`Statement::Passthrough`] and
//! handed to SQLite unchanged; SQLite already accepts backtick-quoted
//! identifiers and the `ALTER TABLE ... ADD/DROP COLUMN` forms.

use std::sync::LazyLock;

use regex::Regex;

const IDENT: &str = r"(?:`[^`]+`|[A-Za-z0-9_$]+)";
const STRING_BODY: &str = r"(?:[^'\\]|''|\\.)*";

struct Patterns {
    show_columns: Regex,
    show_tables_like: Regex,
    show_primary_index: Regex,
    drop_temporary: Regex,
    foreign_key_checks: Regex,
    alter_primary_key: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            show_columns: Regex::new(&format!(
                r"(?is)^\s*SHOW\s+(?:FULL\s+)?COLUMNS\s+FROM\s+(?P<table>{IDENT})(?:\s+WHERE\s+`?field`?\s*=\s*'(?P<field>{STRING_BODY})')?\s*;?\s*$"
            ))
            .expect("static regex must compile"),
            show_tables_like: Regex::new(&format!(
                r"(?is)^\s*SHOW\s+TABLES\s+LIKE\s+'(?P<pattern>{STRING_BODY})'\s*;?\s*$"
            ))
            .expect("static regex must compile"),
            show_primary_index: Regex::new(&format!(
                r"(?is)^\s*SHOW\s+(?:INDEX|INDEXES|KEYS)\s+FROM\s+(?P<table>{IDENT})\s+WHERE\s+Key_name\s*=\s*'PRIMARY'\s*;?\s*$"
            ))
            .expect("static regex must compile"),
            drop_temporary: Regex::new(&format!(
                r"(?is)^\s*DROP\s+TEMPORARY\s+TABLE\s+(?P<if_exists>IF\s+EXISTS\s+)?(?P<table>{IDENT})\s*;?\s*$"
            ))
            .expect("static regex must compile"),
            foreign_key_checks: Regex::new(
                r"(?is)^\s*SET\s+FOREIGN_KEY_CHECKS\s*=\s*(?P<value>[01])\s*;?\s*$",
            )
            .expect("static regex must compile"),
            alter_primary_key: Regex::new(&format!(
                r"(?is)^\s*ALTER\s+TABLE\s+{IDENT}\s+(?:ADD|DROP)\s+PRIMARY\s+KEY\b"
            ))
            .expect("static regex must compile"),
        }
    }
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

/// A statement after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement {
    /// `SHOW [FULL] COLUMNS FROM t [WHERE field='c']`.
    ShowColumns { table: String, field: Option<String> },
    /// `SHOW TABLES LIKE 'p'`, with the pattern already decoded from its literal.
    ShowTablesLike { pattern: String },
    /// `SHOW INDEX FROM t WHERE Key_name = 'PRIMARY'`.
    ShowPrimaryIndex { table: String },
    /// `DROP TEMPORARY TABLE [IF EXISTS] t`; `table` keeps its quoting.
    DropTemporaryTable { table: String, if_exists: bool },
    /// `SET FOREIGN_KEY_CHECKS=0|1`.
    ForeignKeyChecks(bool),
    /// `ALTER TABLE t ADD PRIMARY KEY (...)` or `ALTER TABLE t DROP PRIMARY KEY`.
    AlterPrimaryKey,
    /// Anything else.
    Passthrough,
}

pub(crate) fn classify(sql: &str) -> Statement {
    let patterns = &*PATTERNS;

    if let Some(caps) = patterns.show_columns.captures(sql) {
        return Statement::ShowColumns {
            table: unquote(&caps["table"]),
            field: caps.name("field").map(|m| decode_literal(m.as_str())),
        };
    }
    if let Some(caps) = patterns.show_tables_like.captures(sql) {
        return Statement::ShowTablesLike {
            pattern: decode_literal(&caps["pattern"]),
        };
    }
    if let Some(caps) = patterns.show_primary_index.captures(sql) {
        return Statement::ShowPrimaryIndex {
            table: unquote(&caps["table"]),
        };
    }
    if let Some(caps) = patterns.drop_temporary.captures(sql) {
        return Statement::DropTemporaryTable {
            table: caps["table"].to_string(),
            if_exists: caps.name("if_exists").is_some(),
        };
    }
    if let Some(caps) = patterns.foreign_key_checks.captures(sql) {
        return Statement::ForeignKeyChecks(&caps["value"] == "1");
    }
    if patterns.alter_primary_key.is_match(sql) {
        return Statement::AlterPrimaryKey;
    }
    Statement::Passthrough
}

/// Strips backtick quoting from a matched identifier.
fn unquote(ident: &str) -> String {
    ident.trim_matches('`').to_string()
}

/// Decodes the body of a single-quoted MySQL string literal.
///
/// `''` becomes `'` and a backslash escapes the next character, except that
/// `\%` and `\_` keep their backslash so they stay literal in `LIKE` patterns.
fn decode_literal(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            '\\' => match chars.next() {
                Some(next @ ('%' | '_')) => {
                    out.push('\\');
                    out.push(next);
                }
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

/// Case-sensitive `LIKE` match with `\` as the escape character.
pub(crate) fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    like_from(&pattern, &text)
}

fn like_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => (0..=text.len()).any(|skip| like_from(&pattern[1..], &text[skip..])),
        Some('_') => !text.is_empty() && like_from(&pattern[1..], &text[1..]),
        Some('\\') if pattern.len() > 1 => {
            text.first() == Some(&pattern[1]) && like_from(&pattern[2..], &text[1..])
        }
        Some(c) => text.first() == Some(c) && like_from(&pattern[1..], &text[1..]),
    }
}
