//! Assisted fallback extractor.
//!
//! Handles unstructured input, and any input a deterministic parser rejected:
//! builds one fixed instructional prompt around the raw text, invokes the
//! completion capability exactly once, and normalizes the reply into the
//! canonical schema. A reply that decodes but carries no rows anywhere is a
//! failure, not an empty success; before giving up, the extractor tries to
//! back-fill rows from the original input itself.

use crate::ingestion::completion::CompletionProvider;
use crate::ingestion::{IngestionError, IngestionResult};
use crate::schema::{Row, Schema};
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

/// The literal token the completion service must return when it cannot
/// produce a schema
pub const UNPARSABLE_SENTINEL: &str = "UNPARSABLE";

/// Assisted extractor around an injected completion capability
pub struct FallbackExtractor {
    provider: Arc<dyn CompletionProvider>,
}

impl FallbackExtractor {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Run one extraction attempt over the raw input text.
    ///
    /// No internal retries: one prompt, one completion call, one verdict.
    pub async fn extract(&self, input: &str) -> IngestionResult<Schema> {
        let prompt = build_extraction_prompt(input);
        info!(
            "Invoking assisted extraction ({} input chars)",
            input.len()
        );

        let response = self.provider.complete(&prompt).await?;
        let cleaned = strip_code_fences(&response);

        if cleaned.trim().eq_ignore_ascii_case(UNPARSABLE_SENTINEL) {
            info!("Completion service declined to extract a schema");
            return Err(IngestionError::ExtractionRefused);
        }

        let mut draft = decode_response(&cleaned)?;
        repair_missing_rows(&mut draft, input);

        if !draft.has_row_data() {
            warn!("Extracted schema carries no rows in any table");
            return Err(IngestionError::NoDataExtracted);
        }

        info!(
            "Assisted extraction produced {} table(s)",
            draft.tables.len()
        );
        Ok(draft)
    }
}

/// The fixed prompt: output contract, sentinel instruction, then the raw
/// input verbatim.
pub fn build_extraction_prompt(input: &str) -> String {
    format!(
        r#"You are a database schema and data extraction assistant. Given the following file content (which may be JSON, CSV, Excel, SQL, or unstructured text), output a JSON object in this format:

{{
  "tables": [
    {{
      "name": "table_name",
      "columns": [
        {{"name": "column_name", "type": "column_type"}},
        ...
      ],
      "data": [
        {{"column1": value1, "column2": value2, ...}},
        ...
      ]
    }},
    ...
  ]
}}

No matter how the schema and data are described, always output a JSON object with tables, columns (with name and type), and data rows. For each table, extract all columns (with name and type) and ALL data rows. If data rows are present in the file under any key (such as 'rows', 'data', etc.), always output them under the 'data' key for each table in the output. If you cannot do this, respond ONLY with the string: {sentinel}.

Here is the file content:
----------------------
{input}
----------------------
Respond ONLY with the JSON object or the string {sentinel}, no explanation or extra text."#,
        sentinel = UNPARSABLE_SENTINEL,
        input = input
    )
}

/// Strip surrounding backtick code fences and an optional language tag.
///
/// Completion services habitually wrap structured replies in markdown fences
/// even when told not to; generated SQL gets the same treatment.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let inner = trimmed.trim_matches('`').trim();
    for tag in ["json", "sql"] {
        let Some(head) = inner.get(..tag.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(tag) {
            let rest = &inner[tag.len()..];
            if rest.starts_with(char::is_whitespace) || rest.starts_with('{') {
                return rest.trim().to_string();
            }
        }
    }
    inner.to_string()
}

/// Decode a cleaned completion reply into the canonical shape
fn decode_response(cleaned: &str) -> IngestionResult<Schema> {
    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        IngestionError::malformed_extractor_output(format!("reply is not valid JSON: {}", e))
    })?;

    if value.get("tables").is_none() {
        return Err(IngestionError::malformed_extractor_output(
            "reply does not contain a 'tables' key",
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        IngestionError::malformed_extractor_output(format!(
            "reply does not match the canonical schema shape: {}",
            e
        ))
    })
}

/// Back-fill rows the completion service omitted by re-reading the original
/// input as a structured document and copying a same-named entry's
/// `rows`/`data` list.
fn repair_missing_rows(draft: &mut Schema, original_input: &str) {
    let Ok(original) = serde_json::from_str::<Value>(original_input) else {
        return;
    };
    let Some(document) = original.as_object() else {
        return;
    };

    for table in &mut draft.tables {
        if !table.data.is_empty() {
            continue;
        }
        let Some(entry) = document.get(&table.name).and_then(Value::as_object) else {
            continue;
        };
        // Both keys are checked every time; a populated `data` list wins
        // over a populated `rows` list
        for key in ["rows", "data"] {
            let Some(rows) = entry.get(key).and_then(Value::as_array) else {
                continue;
            };
            let recovered: Vec<Row> = rows
                .iter()
                .filter_map(|row| row.as_object().cloned())
                .collect();
            if !recovered.is_empty() {
                info!(
                    "Back-filled {} row(s) for table '{}' from key '{}' of the original input",
                    recovered.len(),
                    table.name,
                    key
                );
                table.data = recovered;
            }
        }
    }
}
