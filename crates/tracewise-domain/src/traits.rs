//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::PromptPayload;
use std::future::Future;

/// Trait for chat-completion operations
///
/// Implemented by the infrastructure layer (tracewise-llm). The provider
/// holds its own immutable settings (model, temperature, credential) fixed
/// at construction, so a single instance is shared by all requests.
pub trait CompletionProvider: Send + Sync {
    /// Error type for completion operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send the system and user messages and return the model's free-text reply
    fn complete(
        &self,
        payload: &PromptPayload,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
