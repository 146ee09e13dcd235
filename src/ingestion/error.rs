//! Error types for the ingestion pipeline

use thiserror::Error;

/// Errors that can occur while turning uploaded bytes into a canonical schema.
///
/// Deterministic-parser failures (`MissingRequiredFields`, `MalformedDescriptor`,
/// `NoStatementsParsed`) are recovered internally by routing to the fallback
/// extractor; only fallback failures reach the caller.
#[derive(Error, Debug)]
pub enum IngestionError {
    /// A tabular descriptor is missing one of the `table`/`column`/`type` fields
    #[error("descriptor is missing required fields: {0}")]
    MissingRequiredFields(String),

    /// A structured document does not have the expected table/columns/rows shape
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// DDL input yielded no usable CREATE TABLE statements
    #[error("no CREATE TABLE statements could be parsed")]
    NoStatementsParsed,

    /// The completion service replied with the unparsable sentinel
    #[error("the completion service could not extract a schema from the input")]
    ExtractionRefused,

    /// The completion service replied, but the reply is not the canonical shape
    #[error("extractor output could not be decoded: {0}")]
    MalformedExtractorOutput(String),

    /// Extraction produced a schema, but no table carries any rows
    #[error("no data rows were extracted from the input")]
    NoDataExtracted,

    /// Completion API reported a failure (bad status, empty choices, ...)
    #[error("completion request failed: {0}")]
    CompletionFailed(String),

    /// HTTP transport errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Input bytes that cannot be processed at all (e.g. not UTF-8)
    #[error("invalid input data: {0}")]
    InvalidInput(String),

    /// Configuration errors (missing API key, etc.)
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl IngestionError {
    /// Create a new missing-required-fields error
    pub fn missing_required_fields(msg: impl Into<String>) -> Self {
        Self::MissingRequiredFields(msg.into())
    }

    /// Create a new malformed-descriptor error
    pub fn malformed_descriptor(msg: impl Into<String>) -> Self {
        Self::MalformedDescriptor(msg.into())
    }

    /// Create a new malformed-extractor-output error
    pub fn malformed_extractor_output(msg: impl Into<String>) -> Self {
        Self::MalformedExtractorOutput(msg.into())
    }

    /// Create a new completion-failed error
    pub fn completion_failed(msg: impl Into<String>) -> Self {
        Self::CompletionFailed(msg.into())
    }

    /// Create a new invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// True for failures the dispatcher recovers from by falling back to the
    /// assisted extractor.
    pub fn is_recoverable_by_fallback(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredFields(_)
                | Self::MalformedDescriptor(_)
                | Self::NoStatementsParsed
        )
    }
}

/// Result type for ingestion operations
pub type IngestionResult<T> = std::result::Result<T, IngestionError>;
