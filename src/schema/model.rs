//! Canonical schema model produced by every parser and consumed by the
//! query validator and downstream materialization.
//!
//! The model is deliberately permissive on the way in (bare column names,
//! `rows` vs `data`, untyped columns) and normalized on the way out: every
//! column carries a type, every table carries a (possibly empty) row list.

use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Type marker used when a column's type is not specified anywhere
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// A single data row: column name to scalar value.
///
/// Rows need not cover every column (missing keys read as null downstream)
/// and may carry extra keys (ignored downstream).
pub type Row = serde_json::Map<String, Value>;

/// The canonical schema: an ordered sequence of tables.
///
/// Table order is insignificant but stable within one parse. A `Schema` is
/// immutable once returned by a parser path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

/// One table: a name, its columns, and optional row data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Row data; accepts `rows` as an input alias, always serializes as `data`
    #[serde(default, alias = "rows")]
    pub data: Vec<Row>,
}

/// One column: a name and a free-form type token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// All table names, case-sensitive as given
    pub fn table_names(&self) -> BTreeSet<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// All column names across every table, flat and unqualified
    pub fn column_names(&self) -> BTreeSet<String> {
        self.tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|c| c.name.clone()))
            .collect()
    }

    /// Whether at least one table carries at least one row
    pub fn has_row_data(&self) -> bool {
        self.tables.iter().any(|t| !t.data.is_empty())
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            data: Vec::new(),
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }

    /// Column with the generic [`UNKNOWN_TYPE`] marker
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, UNKNOWN_TYPE)
    }
}

// Extractor output and structured documents describe columns either as a
// bare name string or as a {name, type} object with the type optional, so
// deserialization accepts both and normalizes to a typed column.
impl<'de> Deserialize<'de> for Column {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColumnRepr {
            Name(String),
            Full {
                name: String,
                #[serde(rename = "type", default)]
                column_type: Option<String>,
            },
        }

        match ColumnRepr::deserialize(deserializer)? {
            ColumnRepr::Name(name) => {
                if name.is_empty() {
                    return Err(D::Error::custom("column name must not be empty"));
                }
                Ok(Column::untyped(name))
            }
            ColumnRepr::Full { name, column_type } => {
                if name.is_empty() {
                    return Err(D::Error::custom("column name must not be empty"));
                }
                let column_type = match column_type {
                    Some(t) if !t.is_empty() => t,
                    _ => UNKNOWN_TYPE.to_string(),
                };
                Ok(Column { name, column_type })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_deserializes_from_bare_name() {
        let col: Column = serde_json::from_value(json!("id")).unwrap();
        assert_eq!(col.name, "id");
        assert_eq!(col.column_type, UNKNOWN_TYPE);
    }

    #[test]
    fn test_column_deserializes_from_object() {
        let col: Column = serde_json::from_value(json!({"name": "id", "type": "INT"})).unwrap();
        assert_eq!(col.name, "id");
        assert_eq!(col.column_type, "INT");
    }

    #[test]
    fn test_column_without_type_gets_unknown() {
        let col: Column = serde_json::from_value(json!({"name": "id"})).unwrap();
        assert_eq!(col.column_type, UNKNOWN_TYPE);
    }

    #[test]
    fn test_column_rejects_empty_name() {
        assert!(serde_json::from_value::<Column>(json!("")).is_err());
        assert!(serde_json::from_value::<Column>(json!({"name": ""})).is_err());
    }

    #[test]
    fn test_column_serializes_type_key() {
        let col = Column::new("id", "INT");
        let value = serde_json::to_value(&col).unwrap();
        assert_eq!(value, json!({"name": "id", "type": "INT"}));
    }

    #[test]
    fn test_table_accepts_rows_alias() {
        let table: Table = serde_json::from_value(json!({
            "name": "emp",
            "columns": ["id"],
            "rows": [{"id": 1}]
        }))
        .unwrap();
        assert_eq!(table.data.len(), 1);

        let roundtrip = serde_json::to_value(&table).unwrap();
        assert!(roundtrip.get("data").is_some());
        assert!(roundtrip.get("rows").is_none());
    }

    #[test]
    fn test_schema_name_sets() {
        let schema = Schema::new(vec![
            Table::with_columns("employees", vec![Column::new("name", "TEXT")]),
            Table::with_columns("depts", vec![Column::new("id", "INT")]),
        ]);
        let expected_tables: BTreeSet<String> =
            ["employees", "depts"].iter().map(|s| s.to_string()).collect();
        let expected_columns: BTreeSet<String> =
            ["name", "id"].iter().map(|s| s.to_string()).collect();
        assert_eq!(schema.table_names(), expected_tables);
        assert_eq!(schema.column_names(), expected_columns);
        assert!(!schema.has_row_data());
    }

    #[test]
    fn test_has_row_data() {
        let mut table = Table::with_columns("emp", vec![Column::new("id", "INT")]);
        let mut row = Row::new();
        row.insert("id".to_string(), json!(1));
        table.data.push(row);
        assert!(Schema::new(vec![table]).has_row_data());
    }
}
