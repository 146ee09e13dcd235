//! Format classifier.
//!
//! Answers, per declared format, whether an input is clean enough for the
//! matching deterministic parser. The answer is advisory: a negative verdict
//! (or a later parser failure) routes the input to the assisted fallback
//! extractor. DDL input never comes through here; the tokenizing parser is
//! simply attempted.

use serde_json::Value;
use std::collections::HashSet;

/// Whether a structured document is clean: every top-level value must be an
/// object carrying both a `columns` list and a `rows`/`data` list.
pub fn is_clean_structured(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return false;
    };
    let Some(document) = value.as_object() else {
        return false;
    };
    if document.is_empty() {
        return false;
    }

    document.values().all(|table_value| {
        let Some(table) = table_value.as_object() else {
            return false;
        };
        if !table.get("columns").map(Value::is_array).unwrap_or(false) {
            return false;
        }
        table
            .get("rows")
            .or_else(|| table.get("data"))
            .map(Value::is_array)
            .unwrap_or(false)
    })
}

/// Whether a tabular descriptor is clean: its header set, case-insensitively,
/// must be a superset of `{table, column, type}`.
pub fn is_clean_tabular(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let Ok(headers) = reader.headers() else {
        return false;
    };
    let header_set: HashSet<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    ["table", "column", "type"]
        .iter()
        .all(|field| header_set.contains(*field))
}
