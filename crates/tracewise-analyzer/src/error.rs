//! Error types for the Analyzer

use thiserror::Error;
use tracewise_llm::LlmError;

/// Errors that can occur while turning artifacts into a traceability report
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Requirements document is not a readable PDF or has no text layer
    #[error("Could not read requirements document: {0}")]
    DocumentParse(String),

    /// Code file is not valid UTF-8
    #[error("Code file is not valid UTF-8: {0}")]
    Encoding(String),

    /// Test-case file is not valid JSON
    #[error("Test cases are not valid JSON: {0}")]
    MalformedInput(String),

    /// Composed prompt exceeds the configured size bound
    #[error("Prompt too long: {0} chars (max: {1})")]
    InputTooLarge(usize, usize),

    /// Completion service failed
    #[error("Completion service error: {0}")]
    Upstream(String),

    /// Completion service did not answer in time
    #[error("Completion service timed out after {0} seconds")]
    UpstreamTimeout(u64),

    /// Completion does not match the traceability report schema
    #[error("Model response does not match the report schema: {0}")]
    ResponseSchema(String),
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(secs) => AnalysisError::UpstreamTimeout(secs),
            other => AnalysisError::Upstream(other.to_string()),
        }
    }
}
