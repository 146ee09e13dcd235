//! # Query Module
//!
//! Consumes the canonical schema after ingestion: renders it into generation
//! prompts and validates generated query text against it. Validation is a
//! lexical conformance check, not SQL parsing; see [`validator`] for the
//! documented limits of that approximation.

pub mod prompt;
pub mod validator;

pub use prompt::{build_sql_prompt, clean_generated_sql, format_schema_lines};
pub use validator::{validate_query, ConformanceVerdict};
