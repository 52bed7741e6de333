//! OpenAI Provider Implementation
//!
//! Chat-completion client for OpenAI and API-compatible services.
//!
//! # Features
//!
//! - Async HTTP communication with the `/chat/completions` endpoint
//! - Configurable base URL, model and sampling temperature
//! - Bounded retry with exponential backoff for transport and server errors
//! - Per-attempt timeout
//!
//! # Examples
//!
//! ```no_run
//! use tracewise_llm::{OpenAiProvider, OpenAiSettings};
//!
//! let provider = OpenAiProvider::new(OpenAiSettings::default(), "sk-...").unwrap();
//! assert_eq!(provider.model(), "gpt-4");
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracewise_domain::{CompletionProvider, PromptPayload};
use tracing::{debug, warn};

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default sampling temperature, low to favor repeatable analyses
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Default timeout for a single attempt (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Upper bound on attempts
pub const MAX_ATTEMPTS_LIMIT: u32 = 3;

/// Default base delay before the second attempt (milliseconds)
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Settings for the OpenAI provider
///
/// The API key is not part of these settings; it comes from
/// the environment and is passed to [`OpenAiProvider::new`] separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature in [0, 1]
    pub temperature: f64,

    /// Timeout for a single attempt (seconds)
    pub timeout_secs: u64,

    /// Total attempts for retryable failures, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt, doubled for each further one (milliseconds)
    pub backoff_base_ms: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }
}

impl OpenAiSettings {
    /// Get the per-attempt timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff delay after the given (1-based) failed attempt
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(2u64.pow(attempt.saturating_sub(1))))
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!("temperature must be in [0, 1], got {}", self.temperature));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(format!(
                "max_attempts must be between 1 and {}, got {}",
                MAX_ATTEMPTS_LIMIT, self.max_attempts
            ));
        }
        Ok(())
    }
}

/// OpenAI chat-completion provider
///
/// Holds only immutable settings and a connection-pooling HTTP client, so one
/// instance is shared across all requests.
pub struct OpenAiProvider {
    settings: OpenAiSettings,
    api_key: String,
    client: reqwest::Client,
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("settings", &self.settings)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A message in the chat-completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request body for the chat-completion API
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

/// Response from the chat-completion API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the settings are invalid, the API key is
    /// empty, or the HTTP client cannot be built.
    pub fn new(settings: OpenAiSettings, api_key: impl Into<String>) -> Result<Self, LlmError> {
        settings.validate().map_err(LlmError::Config)?;

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            settings,
            api_key,
            client,
        })
    }

    /// Model identifier used for completions
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// Send the payload, retrying transport and server failures with backoff
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The provider cannot be reached or keeps failing server-side
    /// - The credential is rejected
    /// - An attempt exceeds the per-attempt timeout
    /// - The response has no usable completion
    pub async fn chat(&self, payload: &PromptPayload) -> Result<String, LlmError> {
        let url = self.endpoint();
        let request_body = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: payload.system_instruction.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: payload.user_message.clone(),
                },
            ],
            temperature: self.settings.temperature,
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.settings.max_attempts {
            attempts += 1;
            debug!("Chat completion attempt {} to {}", attempts, url);

            match self.send_once(&url, &request_body).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() => {
                    warn!("Chat completion attempt {} failed: {}", attempts, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }

            if attempts < self.settings.max_attempts {
                tokio::time::sleep(self.settings.backoff_after(attempts)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::Communication("Max retries exceeded".to_string())
        }))
    }

    async fn send_once(
        &self,
        url: &str,
        request_body: &ChatCompletionRequest<'_>,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request_body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<ChatCompletionResponse>()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        LlmError::Timeout(self.settings.timeout_secs)
                    } else {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    }
                })?;

            return body
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| {
                    LlmError::InvalidResponse("Response contained no completion".to_string())
                });
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let detail = format!("HTTP {}: {}", status, error_text);

        Err(match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                LlmError::Authentication(detail)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::Communication(detail),
            s if s.is_server_error() => LlmError::Communication(detail),
            _ => LlmError::Rejected(detail),
        })
    }

    fn classify_transport(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.settings.timeout_secs)
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

impl CompletionProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, payload: &PromptPayload) -> Result<String, Self::Error> {
        self.chat(payload).await
    }
}
