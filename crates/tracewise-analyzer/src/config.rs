//! Configuration for the Analyzer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Maximum composed prompt length (characters, both messages together)
    pub max_prompt_chars: usize,

    /// Maximum time for the whole completion call, all attempts included (seconds)
    pub completion_timeout_secs: u64,
}

impl AnalyzerConfig {
    /// Get the completion timeout as a Duration
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_prompt_chars == 0 {
            return Err("max_prompt_chars must be greater than 0".to_string());
        }
        if self.completion_timeout_secs == 0 {
            return Err("completion_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 200_000,
            completion_timeout_secs: 120,
        }
    }
}
