//! Request-scoped inputs: raw artifacts, their normalized form, and the prompt built from them

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three uploaded artifacts of a single analysis request, still as raw bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Requirements document (PDF)
    pub requirements: Vec<u8>,

    /// Source code file (expected UTF-8)
    pub code: Vec<u8>,

    /// Test-case file (expected JSON)
    pub test_cases: Vec<u8>,
}

impl AnalysisRequest {
    /// Create a request from the three artifacts
    pub fn new(
        requirements: impl Into<Vec<u8>>,
        code: impl Into<Vec<u8>>,
        test_cases: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            requirements: requirements.into(),
            code: code.into(),
            test_cases: test_cases.into(),
        }
    }
}

/// Artifacts decoded into the form the prompt composer consumes
///
/// Derived once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInputs {
    /// Text extracted from the requirements document, pages in order
    pub requirements_text: String,

    /// Decoded source code
    pub code_text: String,

    /// Parsed test cases (mapping, sequence or scalar)
    pub test_cases: Value,
}

/// The two chat messages sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    /// Reviewer persona, analysis steps and output contract
    pub system_instruction: String,

    /// The artifacts embedded in the fixed template
    pub user_message: String,
}

impl PromptPayload {
    /// Combined character count of both messages
    pub fn char_count(&self) -> usize {
        self.system_instruction.chars().count() + self.user_message.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_bytes_and_strings() {
        let request = AnalysisRequest::new(vec![0u8; 10], "fn main() {}", "[]");
        assert_eq!(request.requirements.len(), 10);
        assert_eq!(request.code, b"fn main() {}");
        assert_eq!(request.test_cases, b"[]");
    }

    #[test]
    fn test_char_count_counts_characters_not_bytes() {
        let payload = PromptPayload {
            system_instruction: "abc".to_string(),
            user_message: "é→".to_string(),
        };
        assert_eq!(payload.char_count(), 5);
    }
}
