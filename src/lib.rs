//! # schema_ingest
//!
//! Schema inference and query validation core. Takes an arbitrary uploaded
//! file (structured JSON document, tabular descriptor, SQL DDL, or free
//! text) and produces a canonical, machine-usable description of a
//! relational schema plus its data rows; later validates generated query
//! text against that schema so outputs referencing unknown tables or columns
//! can be rejected.
//!
//! The pipeline is hybrid: deterministic parsers handle clean inputs, and an
//! AI-assisted fallback extractor handles everything else through an
//! injected [`ingestion::CompletionProvider`]. Web transport, persistence,
//! and materialization of the resulting schema belong to the caller.
//!
//! ```no_run
//! use schema_ingest::{FileFormat, IngestionConfig, IngestionService, validate_query};
//!
//! # async fn example() -> schema_ingest::IngestionResult<()> {
//! let service = IngestionService::from_config(IngestionConfig::from_env())?;
//! let schema = service
//!     .ingest(b"CREATE TABLE emp (id INT, name TEXT);", FileFormat::Ddl)
//!     .await?;
//!
//! let verdict = validate_query("SELECT name FROM emp;", &schema);
//! assert!(verdict.conformant);
//! # Ok(())
//! # }
//! ```

pub mod ingestion;
pub mod query;
pub mod schema;

pub use ingestion::{
    CompletionProvider, FileFormat, IngestionConfig, IngestionError, IngestionResult,
    IngestionService,
};
pub use query::{validate_query, ConformanceVerdict};
pub use schema::{Column, Row, Schema, Table};
