//! Query identifier validator.
//!
//! Best-effort lexical extraction of referenced tables and columns from
//! generated query text, cross-checked against a canonical schema. This is
//! deliberately not a SQL parser: qualified names, subqueries, and
//! expressions beyond simple identifiers are out of reach, and column
//! membership is checked flat across the whole schema rather than per table.
//! Callers get a conservative allow/deny signal, nothing more.

use crate::schema::Schema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

static TABLE_AFTER_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bfrom\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static TABLE_AFTER_JOIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bjoin\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static PROJECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bselect\s+(.*?)\s+from\b").unwrap());

/// The validator's judgment on a generated query.
///
/// Non-conformance is a normal, reportable verdict; the generated text is
/// still returned to the caller alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceVerdict {
    /// Whether every referenced identifier is known to the schema
    pub conformant: bool,
    /// Table names found after `FROM`/`JOIN`
    pub referenced_tables: BTreeSet<String>,
    /// Column tokens found in the projection list
    pub referenced_columns: BTreeSet<String>,
}

/// Validate generated query text against the schema it was generated for.
///
/// Conformant when every referenced table is a schema table and every
/// referenced column is either `*` or a schema column (unqualified match).
pub fn validate_query(sql: &str, schema: &Schema) -> ConformanceVerdict {
    let referenced_tables = extract_tables(sql);
    let referenced_columns = extract_columns(sql);

    let known_tables = schema.table_names();
    let known_columns = schema.column_names();

    let conformant = referenced_tables
        .iter()
        .all(|table| known_tables.contains(table))
        && referenced_columns
            .iter()
            .all(|column| column == "*" || known_columns.contains(column));

    ConformanceVerdict {
        conformant,
        referenced_tables,
        referenced_columns,
    }
}

/// Table tokens following `FROM` and `JOIN` keywords
pub fn extract_tables(sql: &str) -> BTreeSet<String> {
    TABLE_AFTER_FROM
        .captures_iter(sql)
        .chain(TABLE_AFTER_JOIN.captures_iter(sql))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Column tokens from the projection list between `SELECT` and `FROM`,
/// comma-split, with trailing `AS alias` clauses trimmed to the base token
pub fn extract_columns(sql: &str) -> BTreeSet<String> {
    let mut columns = BTreeSet::new();
    for caps in PROJECTION.captures_iter(sql) {
        for piece in caps[1].split(',') {
            let token = strip_alias(piece.trim());
            if !token.is_empty() {
                columns.insert(token);
            }
        }
    }
    columns
}

fn strip_alias(token: &str) -> String {
    let mut kept = Vec::new();
    for word in token.split_whitespace() {
        if word.eq_ignore_ascii_case("as") {
            break;
        }
        kept.push(word);
    }
    kept.join(" ")
}
