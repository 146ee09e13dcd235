//! # Ingestion Module
//!
//! Turns an uploaded file into the canonical schema model. Inputs declare a
//! format tag; the dispatcher routes each upload through format sniffing, a
//! deterministic parser where the shape allows it, and an AI-assisted
//! fallback extractor everywhere else.
//!
//! ## Components
//!
//! * `dispatcher` - Hybrid dispatcher orchestrating one upload to one outcome
//! * `classifier` - Decides whether an input is clean enough to skip the fallback
//! * `tabular` - Deterministic parser for (table, column, type) record descriptors
//! * `structured` - Deterministic parser for table-shaped JSON documents
//! * `ddl` - Tokenizing parser for `CREATE TABLE` statements
//! * `extractor` - Assisted fallback extraction with output normalization
//! * `completion` - The injected text-completion capability and its API client
//! * `config` - Completion-service configuration
//! * `error` - Typed failures for every pipeline stage
//!
//! ## Flow
//!
//! raw bytes + format tag → dispatcher → (classifier → deterministic parser)
//! or (fallback extractor) → [`crate::schema::Schema`]. Deterministic-parser
//! failures fall back to extraction; a fallback failure ends the upload.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod classifier;
pub mod completion;
pub mod config;
pub mod ddl;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod structured;
pub mod tabular;

// Public re-exports
pub use completion::{CompletionProvider, OpenRouterClient};
pub use config::IngestionConfig;
pub use dispatcher::IngestionService;
pub use error::{IngestionError, IngestionResult};
pub use extractor::{FallbackExtractor, UNPARSABLE_SENTINEL};

/// Declared format tag accompanying uploaded bytes.
///
/// The caller owns the filename-to-tag mapping; the pipeline accepts only the
/// tag and the bytes. [`FileFormat::from_extension`] covers the common case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Nested-object document already shaped as named tables
    Structured,
    /// Delimited records carrying (table, column, type) fields
    Tabular,
    /// SQL data-definition text
    Ddl,
    /// Anything else, including explicitly unstructured prose
    FreeText,
}

impl FileFormat {
    /// Map a lowercase file extension to a format tag.
    ///
    /// Unknown extensions are treated as free text, which routes straight to
    /// assisted extraction.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "json" => Self::Structured,
            "csv" | "xlsx" | "xls" => Self::Tabular,
            "sql" => Self::Ddl,
            _ => Self::FreeText,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Structured => "structured",
            Self::Tabular => "tabular",
            Self::Ddl => "ddl",
            Self::FreeText => "free_text",
        };
        f.write_str(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("json"), FileFormat::Structured);
        assert_eq!(FileFormat::from_extension("CSV"), FileFormat::Tabular);
        assert_eq!(FileFormat::from_extension("xlsx"), FileFormat::Tabular);
        assert_eq!(FileFormat::from_extension("sql"), FileFormat::Ddl);
        assert_eq!(FileFormat::from_extension("txt"), FileFormat::FreeText);
        assert_eq!(FileFormat::from_extension("pdf"), FileFormat::FreeText);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(FileFormat::Structured.to_string(), "structured");
        assert_eq!(FileFormat::FreeText.to_string(), "free_text");
    }
}
