//! DDL tokenizing parser.
//!
//! Extracts table and column definitions from `CREATE TABLE` statements with
//! a tokenizer and grouping heuristics, not a full SQL grammar. Statements
//! that contribute nothing are skipped silently; the parse only fails when no
//! statement yields a table, and the dispatcher treats that as "format not
//! applicable" rather than a hard error.

use crate::ingestion::{IngestionError, IngestionResult};
use crate::schema::{Column, Schema, Table};
use log::info;

/// Characters stripped from quoted identifiers
const QUOTE_CHARS: [char; 5] = ['`', '"', '\'', '[', ']'];

/// Definition starters that are constraint clauses, not columns
const CONSTRAINT_KEYWORDS: [&str; 6] = [
    "primary", "foreign", "unique", "constraint", "check", "index",
];

/// Parse SQL text, possibly containing multiple statements, into a schema.
///
/// Every recovered table has empty `data`. Returns
/// [`IngestionError::NoStatementsParsed`] when nothing was recovered.
pub fn parse_ddl(bytes: &[u8]) -> IngestionResult<Schema> {
    let sql = std::str::from_utf8(bytes)
        .map_err(|e| IngestionError::invalid_input(format!("input is not valid UTF-8: {}", e)))?;

    let tables: Vec<Table> = sql.split(';').filter_map(parse_create_table).collect();

    if tables.is_empty() {
        return Err(IngestionError::NoStatementsParsed);
    }

    info!("Recovered {} table(s) from DDL input", tables.len());
    Ok(Schema::new(tables))
}

/// Parse a single statement, returning a table only when both a name and at
/// least one column were recovered.
fn parse_create_table(statement: &str) -> Option<Table> {
    let statement = statement.trim();
    let open = statement.find('(')?;

    let name = parse_table_name(&statement[..open])?;
    let body = parenthesized_group(&statement[open..]);

    let mut columns: Vec<Column> = Vec::new();
    for definition in split_top_level(body) {
        let mut tokens = definition.split_whitespace();
        let (Some(first), Some(second)) = (tokens.next(), tokens.next()) else {
            // Fewer than two tokens: a bare constraint clause or stray text
            continue;
        };
        if CONSTRAINT_KEYWORDS
            .iter()
            .any(|kw| first.eq_ignore_ascii_case(kw))
        {
            continue;
        }

        let column_name = strip_quotes(first);
        if column_name.is_empty() || columns.iter().any(|c| c.name == column_name) {
            continue;
        }
        columns.push(Column::new(column_name, type_token(second, tokens)));
    }

    if columns.is_empty() {
        return None;
    }

    Some(Table {
        name,
        columns,
        data: Vec::new(),
    })
}

/// Pull the table name out of the statement header (`CREATE ... TABLE <name>`)
fn parse_table_name(header: &str) -> Option<String> {
    let mut tokens = header.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("create") {
        return None;
    }

    let mut saw_table = false;
    for token in tokens {
        if !saw_table {
            if token.eq_ignore_ascii_case("table") {
                saw_table = true;
            }
            continue;
        }
        // Skip an IF NOT EXISTS guard between TABLE and the identifier
        if token.eq_ignore_ascii_case("if")
            || token.eq_ignore_ascii_case("not")
            || token.eq_ignore_ascii_case("exists")
        {
            continue;
        }
        let name = strip_quotes(token);
        if name.is_empty() {
            return None;
        }
        return Some(name.to_string());
    }
    None
}

fn strip_quotes(token: &str) -> &str {
    token.trim_matches(|c| QUOTE_CHARS.contains(&c))
}

/// The type is the second token of the definition, extended with following
/// tokens until its parenthesis group closes, so `DECIMAL(10, 2)` comes out
/// whole instead of cut at the internal space.
fn type_token<'a>(second: &'a str, rest: impl Iterator<Item = &'a str>) -> String {
    let mut balance = paren_balance(second);
    let mut type_name = second.to_string();
    if balance > 0 {
        for token in rest {
            type_name.push(' ');
            type_name.push_str(token);
            balance += paren_balance(token);
            if balance <= 0 {
                break;
            }
        }
    }
    type_name
}

fn paren_balance(token: &str) -> i32 {
    token
        .chars()
        .map(|c| match c {
            '(' => 1,
            ')' => -1,
            _ => 0,
        })
        .sum()
}

/// Contents of the parenthesized group starting at the leading `(`.
///
/// An unbalanced group yields everything after the `(`; the per-definition
/// token checks discard any garbage this lets through.
fn parenthesized_group(text: &str) -> &str {
    let inner = &text[1..];
    let mut depth = 1usize;
    for (offset, ch) in inner.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return &inner[..offset];
                }
            }
            _ => {}
        }
    }
    inner
}

/// Split a column-definition group on commas at parenthesis depth zero, so
/// type arguments like `DECIMAL(10, 2)` stay intact.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (offset, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
