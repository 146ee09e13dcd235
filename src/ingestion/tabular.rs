//! Tabular descriptor parser.
//!
//! Handles inputs that describe a schema as repeated (table, column, type)
//! records, the shape exported by spreadsheet schema sheets. The descriptor
//! carries schema only, so every parsed table ends with empty row data.

use crate::ingestion::{IngestionError, IngestionResult};
use crate::schema::{Column, Schema, Table, UNKNOWN_TYPE};
use log::warn;
use std::collections::HashMap;

/// Required descriptor fields, matched case-insensitively against the header
const REQUIRED_FIELDS: [&str; 3] = ["table", "column", "type"];

/// Parse a delimited tabular descriptor into a schema.
///
/// Tables appear in first-seen record order, columns in first-seen order
/// within their table. Malformed or incomplete records are skipped with a
/// warning rather than failing the parse.
pub fn parse_tabular(bytes: &[u8]) -> IngestionResult<Schema> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestionError::invalid_input(format!("input is not valid UTF-8: {}", e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| {
            IngestionError::malformed_descriptor(format!("failed to read header row: {}", e))
        })?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let field_indices = locate_required_fields(&headers)?;

    let mut tables: Vec<Table> = Vec::new();
    let mut table_index: HashMap<String, usize> = HashMap::new();

    for (record_number, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed descriptor record {}: {}", record_number + 2, e);
                continue;
            }
        };

        let table_name = record.get(field_indices[0]).unwrap_or("").to_string();
        let column_name = record.get(field_indices[1]).unwrap_or("").to_string();
        let column_type = record.get(field_indices[2]).unwrap_or("").to_string();

        if table_name.is_empty() || column_name.is_empty() {
            warn!(
                "Skipping descriptor record {} with empty table or column name",
                record_number + 2
            );
            continue;
        }

        let column_type = if column_type.is_empty() {
            UNKNOWN_TYPE.to_string()
        } else {
            column_type
        };

        let index = *table_index.entry(table_name.clone()).or_insert_with(|| {
            tables.push(Table::new(table_name.clone()));
            tables.len() - 1
        });

        if tables[index].find_column(&column_name).is_some() {
            warn!(
                "Skipping duplicate column '{}' for table '{}'",
                column_name, table_name
            );
            continue;
        }

        tables[index].columns.push(Column::new(column_name, column_type));
    }

    if tables.is_empty() {
        return Err(IngestionError::malformed_descriptor(
            "descriptor contains no usable records",
        ));
    }

    Ok(Schema::new(tables))
}

/// Locate the table/column/type field positions, case-insensitively.
///
/// Returns [`IngestionError::MissingRequiredFields`] naming every absent field.
fn locate_required_fields(headers: &[String]) -> IngestionResult<[usize; 3]> {
    let mut indices = [0usize; 3];
    let mut missing = Vec::new();

    for (slot, field) in REQUIRED_FIELDS.iter().enumerate() {
        match headers.iter().position(|h| h == field) {
            Some(index) => indices[slot] = index,
            None => missing.push(*field),
        }
    }

    if !missing.is_empty() {
        return Err(IngestionError::missing_required_fields(missing.join(", ")));
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_records_by_table_in_order() {
        let input = b"table,column,type\nt,c1,INT\nt,c2,TEXT\n";
        let schema = parse_tabular(input).unwrap();

        assert_eq!(schema.tables.len(), 1);
        let table = &schema.tables[0];
        assert_eq!(table.name, "t");
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].name, "c1");
        assert_eq!(table.columns[0].column_type, "INT");
        assert_eq!(table.columns[1].name, "c2");
        assert_eq!(table.columns[1].column_type, "TEXT");
        assert!(table.data.is_empty());
    }

    #[test]
    fn test_preserves_first_seen_table_order() {
        let input = b"table,column,type\nzeta,a,INT\nalpha,b,TEXT\nzeta,c,TEXT\n";
        let schema = parse_tabular(input).unwrap();

        assert_eq!(schema.tables[0].name, "zeta");
        assert_eq!(schema.tables[1].name, "alpha");
        assert_eq!(schema.tables[0].columns.len(), 2);
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let input = b"Table,Column,Type\nemp,id,INT\n";
        let schema = parse_tabular(input).unwrap();
        assert_eq!(schema.tables[0].name, "emp");
    }

    #[test]
    fn test_missing_field_is_reported() {
        let input = b"table,column\nemp,id\n";
        match parse_tabular(input) {
            Err(IngestionError::MissingRequiredFields(fields)) => {
                assert_eq!(fields, "type");
            }
            other => panic!("expected MissingRequiredFields, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_type_defaults_to_unknown() {
        let input = b"table,column,type\nemp,id,\n";
        let schema = parse_tabular(input).unwrap();
        assert_eq!(schema.tables[0].columns[0].column_type, UNKNOWN_TYPE);
    }

    #[test]
    fn test_records_without_names_are_skipped() {
        let input = b"table,column,type\n,id,INT\nemp,id,INT\n";
        let schema = parse_tabular(input).unwrap();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].name, "emp");
    }

    #[test]
    fn test_duplicate_columns_are_dropped() {
        let input = b"table,column,type\nemp,id,INT\nemp,id,TEXT\n";
        let schema = parse_tabular(input).unwrap();
        assert_eq!(schema.tables[0].columns.len(), 1);
        assert_eq!(schema.tables[0].columns[0].column_type, "INT");
    }

    #[test]
    fn test_headers_only_input_fails() {
        let input = b"table,column,type\n";
        assert!(matches!(
            parse_tabular(input),
            Err(IngestionError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = b"table,column,type\nt,c1,INT\nu,c2,TEXT\n";
        let first = parse_tabular(input).unwrap();
        let second = parse_tabular(input).unwrap();
        assert_eq!(first, second);
    }
}
