//! Hybrid dispatcher: one upload in, one terminal outcome out.
//!
//! Per declared format the dispatcher short-circuits to a deterministic
//! parser when the classifier approves the input, and otherwise routes to the
//! assisted fallback extractor. Deterministic failures are recovered by the
//! fallback edge; a fallback failure is terminal and surfaced verbatim.

use crate::ingestion::completion::{CompletionProvider, OpenRouterClient};
use crate::ingestion::extractor::FallbackExtractor;
use crate::ingestion::{
    classifier, ddl, structured, tabular, FileFormat, IngestionConfig, IngestionError,
    IngestionResult,
};
use crate::schema::Schema;
use log::{info, warn};
use std::sync::Arc;

/// Orchestrates the full ingestion pipeline for one upload at a time.
///
/// Holds no mutable state; concurrent uploads may share one service or use
/// independent instances interchangeably.
#[derive(Clone)]
pub struct IngestionService {
    provider: Arc<dyn CompletionProvider>,
}

impl IngestionService {
    /// Create a service around an injected completion capability
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Create a service backed by the configured completion API
    pub fn from_config(config: IngestionConfig) -> IngestionResult<Self> {
        Ok(Self::new(Arc::new(OpenRouterClient::new(config)?)))
    }

    /// Ingest raw bytes with their declared format, producing a canonical
    /// schema or a terminal typed failure.
    pub async fn ingest(&self, bytes: &[u8], format: FileFormat) -> IngestionResult<Schema> {
        info!(
            "Ingesting {} byte(s) with declared format '{}'",
            bytes.len(),
            format
        );

        match format {
            FileFormat::Structured => {
                if classifier::is_clean_structured(bytes) {
                    info!("Structured input is clean, using deterministic parser");
                    match structured::parse_clean(bytes) {
                        Ok(schema) => return Ok(schema),
                        Err(e) => warn!("Clean structured parse failed ({}), falling back", e),
                    }
                } else {
                    match structured::parse_convertible(bytes) {
                        Ok(schema) => {
                            info!("Structured input converted leniently without extraction");
                            return Ok(schema);
                        }
                        Err(e) => {
                            info!("Structured input not convertible ({}), falling back", e)
                        }
                    }
                }
            }
            FileFormat::Tabular => {
                if classifier::is_clean_tabular(bytes) {
                    info!("Tabular input is clean, using deterministic parser");
                    match tabular::parse_tabular(bytes) {
                        Ok(schema) => return Ok(schema),
                        Err(e) => warn!("Clean tabular parse failed ({}), falling back", e),
                    }
                } else {
                    info!("Tabular input is not clean, falling back");
                }
            }
            FileFormat::Ddl => match ddl::parse_ddl(bytes) {
                Ok(schema) => return Ok(schema),
                Err(e) => info!("DDL parse recovered nothing ({}), falling back", e),
            },
            FileFormat::FreeText => {
                info!("Free-text input goes straight to assisted extraction");
            }
        }

        self.fallback(bytes).await
    }

    /// The universal fallback edge. Its failure is final for the upload.
    async fn fallback(&self, bytes: &[u8]) -> IngestionResult<Schema> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            IngestionError::invalid_input(format!("input is not valid UTF-8: {}", e))
        })?;
        FallbackExtractor::new(Arc::clone(&self.provider))
            .extract(text)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Provider that fails the test if the fallback path is ever taken
    struct UnreachableProvider;

    #[async_trait]
    impl CompletionProvider for UnreachableProvider {
        async fn complete(&self, _prompt: &str) -> IngestionResult<String> {
            panic!("completion capability must not be invoked on a deterministic path");
        }
    }

    fn deterministic_service() -> IngestionService {
        IngestionService::new(Arc::new(UnreachableProvider))
    }

    #[tokio::test]
    async fn test_clean_structured_never_calls_completion() {
        let input = br#"{"emp": {"columns": ["id"], "rows": [{"id": 1}]}}"#;
        let schema = deterministic_service()
            .ingest(input, FileFormat::Structured)
            .await
            .unwrap();
        assert_eq!(schema.tables[0].name, "emp");
    }

    #[tokio::test]
    async fn test_convertible_structured_never_calls_completion() {
        let input = br#"{"emp": {"columns": [{"name": "id", "type": "INT"}]}}"#;
        let schema = deterministic_service()
            .ingest(input, FileFormat::Structured)
            .await
            .unwrap();
        assert!(schema.tables[0].data.is_empty());
    }

    #[tokio::test]
    async fn test_clean_tabular_never_calls_completion() {
        let input = b"table,column,type\nemp,id,INT\n";
        let schema = deterministic_service()
            .ingest(input, FileFormat::Tabular)
            .await
            .unwrap();
        assert_eq!(schema.tables[0].columns[0].name, "id");
    }

    #[tokio::test]
    async fn test_ddl_never_calls_completion() {
        let input = b"CREATE TABLE emp (id INT);";
        let schema = deterministic_service()
            .ingest(input, FileFormat::Ddl)
            .await
            .unwrap();
        assert_eq!(schema.tables[0].name, "emp");
    }
}
