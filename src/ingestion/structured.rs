//! Structured-document parser.
//!
//! Handles JSON inputs already shaped as named tables, in two modes: a strict
//! mode for documents that carry both columns and row data, and a lenient
//! conversion mode for near-conformant documents (canonical passthrough, or
//! columns without rows) so they can skip the assisted extractor.

use crate::ingestion::{IngestionError, IngestionResult};
use crate::schema::{Column, Row, Schema, Table};
use log::warn;
use serde_json::Value;

/// Parse a clean structured document: every top-level value must be an object
/// with a `columns` list and a `rows`-or-`data` list.
///
/// Columns are normalized (a bare name gets the generic type) and rows are
/// copied verbatim into `data`.
pub fn parse_clean(bytes: &[u8]) -> IngestionResult<Schema> {
    let document = parse_document(bytes)?;

    let mut tables = Vec::new();
    for (table_name, table_value) in &document {
        let table_obj = table_value.as_object().ok_or_else(|| {
            IngestionError::malformed_descriptor(format!(
                "table '{}' is not an object",
                table_name
            ))
        })?;

        let columns = parse_columns(table_name, table_obj.get("columns"))?;

        // Prefer whichever of rows/data actually carries rows; an empty
        // `rows` list must not shadow a populated `data` list
        let rows_value = ["rows", "data"]
            .iter()
            .filter_map(|key| table_obj.get(*key))
            .find(|v| v.as_array().map(|a| !a.is_empty()).unwrap_or(false))
            .or_else(|| table_obj.get("rows").or_else(|| table_obj.get("data")))
            .ok_or_else(|| {
                IngestionError::malformed_descriptor(format!(
                    "table '{}' has neither 'rows' nor 'data'",
                    table_name
                ))
            })?;
        let rows = rows_value.as_array().ok_or_else(|| {
            IngestionError::malformed_descriptor(format!(
                "row data for table '{}' is not a list",
                table_name
            ))
        })?;

        tables.push(Table {
            name: table_name.clone(),
            columns,
            data: collect_rows(table_name, rows),
        });
    }

    if tables.is_empty() {
        return Err(IngestionError::malformed_descriptor(
            "document contains no tables",
        ));
    }

    Ok(Schema::new(tables))
}

/// Parse a near-conformant structured document.
///
/// A document whose top level is already the canonical `tables` shape passes
/// through directly; otherwise each value must carry a `columns` list, and
/// `data` is left empty. A document that yields zero tables is malformed, so
/// the dispatcher falls back instead of reporting an empty success.
pub fn parse_convertible(bytes: &[u8]) -> IngestionResult<Schema> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestionError::invalid_input(format!("input is not valid UTF-8: {}", e)))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|e| IngestionError::malformed_descriptor(format!("invalid JSON: {}", e)))?;

    // Already in canonical form
    if value.get("tables").is_some() {
        let schema: Schema = serde_json::from_value(value).map_err(|e| {
            IngestionError::malformed_descriptor(format!("invalid canonical document: {}", e))
        })?;
        if schema.is_empty() {
            return Err(IngestionError::malformed_descriptor(
                "canonical document contains no tables",
            ));
        }
        return Ok(schema);
    }

    let document = value.as_object().ok_or_else(|| {
        IngestionError::malformed_descriptor("document root is not an object")
    })?;

    let mut tables = Vec::new();
    for (table_name, table_value) in document {
        let table_obj = table_value.as_object().ok_or_else(|| {
            IngestionError::malformed_descriptor(format!(
                "table '{}' is not an object",
                table_name
            ))
        })?;

        let columns = parse_columns(table_name, table_obj.get("columns"))?;
        tables.push(Table {
            name: table_name.clone(),
            columns,
            data: Vec::new(),
        });
    }

    if tables.is_empty() {
        return Err(IngestionError::malformed_descriptor(
            "document contains no tables",
        ));
    }

    Ok(Schema::new(tables))
}

fn parse_document(bytes: &[u8]) -> IngestionResult<serde_json::Map<String, Value>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestionError::invalid_input(format!("input is not valid UTF-8: {}", e)))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|e| IngestionError::malformed_descriptor(format!("invalid JSON: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(IngestionError::malformed_descriptor(
            "document root is not an object",
        )),
    }
}

fn parse_columns(table_name: &str, columns: Option<&Value>) -> IngestionResult<Vec<Column>> {
    let list = columns.and_then(Value::as_array).ok_or_else(|| {
        IngestionError::malformed_descriptor(format!(
            "table '{}' has no 'columns' list",
            table_name
        ))
    })?;

    list.iter()
        .map(|entry| {
            serde_json::from_value(entry.clone()).map_err(|e| {
                IngestionError::malformed_descriptor(format!(
                    "bad column entry in table '{}': {}",
                    table_name, e
                ))
            })
        })
        .collect()
}

fn collect_rows(table_name: &str, rows: &[Value]) -> Vec<Row> {
    rows.iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(map.clone()),
            other => {
                warn!("Skipping non-object row in table '{}': {}", table_name, other);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UNKNOWN_TYPE;

    #[test]
    fn test_clean_document_parses() {
        let input = br#"{
            "employees": {
                "columns": [{"name": "id", "type": "INT"}, "name"],
                "rows": [{"id": 1, "name": "Ada"}]
            }
        }"#;
        let schema = parse_clean(input).unwrap();

        assert_eq!(schema.tables.len(), 1);
        let table = &schema.tables[0];
        assert_eq!(table.name, "employees");
        assert_eq!(table.columns[0].column_type, "INT");
        assert_eq!(table.columns[1].name, "name");
        assert_eq!(table.columns[1].column_type, UNKNOWN_TYPE);
        assert_eq!(table.data.len(), 1);
    }

    #[test]
    fn test_clean_empty_rows_falls_through_to_data() {
        let input = br#"{"t": {"columns": ["a"], "rows": [], "data": [{"a": 1}]}}"#;
        let schema = parse_clean(input).unwrap();
        assert_eq!(schema.tables[0].data.len(), 1);
    }

    #[test]
    fn test_clean_accepts_empty_rows_without_data() {
        let input = br#"{"t": {"columns": ["a"], "rows": []}}"#;
        let schema = parse_clean(input).unwrap();
        assert!(schema.tables[0].data.is_empty());
    }

    #[test]
    fn test_clean_accepts_data_key() {
        let input = br#"{"t": {"columns": ["a"], "data": [{"a": 1}]}}"#;
        let schema = parse_clean(input).unwrap();
        assert_eq!(schema.tables[0].data.len(), 1);
    }

    #[test]
    fn test_clean_rejects_missing_rows() {
        let input = br#"{"t": {"columns": ["a"]}}"#;
        assert!(matches!(
            parse_clean(input),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_clean_rejects_non_object_table() {
        let input = br#"{"t": [1, 2, 3]}"#;
        assert!(matches!(
            parse_clean(input),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_clean_rejects_non_list_rows() {
        let input = br#"{"t": {"columns": ["a"], "rows": {"a": 1}}}"#;
        assert!(matches!(
            parse_clean(input),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_clean_skips_non_object_rows() {
        let input = br#"{"t": {"columns": ["a"], "rows": [{"a": 1}, 42]}}"#;
        let schema = parse_clean(input).unwrap();
        assert_eq!(schema.tables[0].data.len(), 1);
    }

    #[test]
    fn test_convertible_passthrough_for_canonical_shape() {
        let input = br#"{"tables": [{"name": "emp", "columns": ["id"], "data": [{"id": 1}]}]}"#;
        let schema = parse_convertible(input).unwrap();
        assert_eq!(schema.tables[0].name, "emp");
        assert_eq!(schema.tables[0].data.len(), 1);
    }

    #[test]
    fn test_convertible_columns_without_rows() {
        let input = br#"{"emp": {"columns": [{"name": "id", "type": "INT"}]}}"#;
        let schema = parse_convertible(input).unwrap();
        assert_eq!(schema.tables[0].columns[0].name, "id");
        assert!(schema.tables[0].data.is_empty());
    }

    #[test]
    fn test_clean_rejects_empty_document() {
        assert!(matches!(
            parse_clean(b"{}"),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_convertible_rejects_empty_document() {
        assert!(matches!(
            parse_convertible(b"{}"),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_convertible_rejects_empty_canonical_passthrough() {
        assert!(matches!(
            parse_convertible(br#"{"tables": []}"#),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_convertible_rejects_non_object_values() {
        let input = br#"{"emp": "not a table"}"#;
        assert!(matches!(
            parse_convertible(input),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_clean_parse_is_idempotent() {
        let input = br#"{"t": {"columns": ["a", "b"], "rows": [{"a": 1, "b": 2}]}}"#;
        assert_eq!(parse_clean(input).unwrap(), parse_clean(input).unwrap());
    }
}
