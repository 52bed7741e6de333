//! TraceWise LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `tracewise-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completion API
//!
//! # Examples
//!
//! ```
//! use tracewise_llm::MockProvider;
//! use tracewise_domain::{CompletionProvider, PromptPayload};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let payload = PromptPayload {
//!     system_instruction: "system".to_string(),
//!     user_message: "user".to_string(),
//! };
//! let result = provider.complete(&payload).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracewise_domain::{CompletionProvider, PromptPayload};

pub use openai::{OpenAiProvider, OpenAiSettings};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network failure, rate limiting or a server-side error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Credential missing, invalid or not permitted
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider refused the request (client-side error other than auth)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No response within the configured bound
    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    /// Provider could not be constructed from its settings
    #[error("Provider configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether a fresh attempt could plausibly succeed
    ///
    /// Only transport and server-side failures qualify; timeouts do not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_))
    }
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns a pre-configured completion or error without making
/// any network calls, and records how it was called.
///
/// # Examples
///
/// ```
/// use tracewise_llm::{LlmError, MockProvider};
///
/// let ok = MockProvider::new("{}");
/// assert_eq!(ok.call_count(), 0);
///
/// let failing = MockProvider::failing(LlmError::Communication("down".to_string()));
/// assert!(failing.last_payload().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    outcome: Result<String, LlmError>,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
    last_payload: Arc<Mutex<Option<PromptPayload>>>,
}

impl MockProvider {
    /// Create a new MockProvider that answers every call with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_outcome(Ok(response.into()))
    }

    /// Create a MockProvider that fails every call with `error`
    pub fn failing(error: LlmError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, LlmError>) -> Self {
        Self {
            outcome,
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
            last_payload: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// The payload of the most recent call, if any
    pub fn last_payload(&self) -> Option<PromptPayload> {
        self.last_payload
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, payload: &PromptPayload) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        {
            let mut last = self
                .last_payload
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *last = Some(payload.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome.clone()
    }
}
