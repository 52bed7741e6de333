//! Configuration file parsing for the server.
//!
//! Loads bind settings, upload limits, completion-provider settings and
//! analyzer limits from TOML. The API key never lives in the file; it is
//! read from the environment once at startup.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracewise_analyzer::AnalyzerConfig;
use tracewise_llm::OpenAiSettings;

/// Environment variable holding the completion-service credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required setting
    #[error("Missing required configuration: {0}")]
    MissingField(String),

    /// Setting out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 5001)
    pub bind_port: u16,

    /// Largest accepted request body (bytes)
    pub max_upload_bytes: usize,

    /// Completion-provider settings
    pub completion: OpenAiSettings,

    /// Analyzer limits
    pub analysis: AnalyzerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 5001,
            max_upload_bytes: 20 * 1024 * 1024,
            completion: OpenAiSettings::default(),
            analysis: AnalyzerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        self.completion
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("completion: {}", e)))?;
        self.analysis
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("analysis: {}", e)))?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

/// Read the API key from the process environment
///
/// An absent or blank key is a startup failure.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingField(API_KEY_ENV.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 5001);
        assert_eq!(config.completion.model, "gpt-4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5001");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            max_upload_bytes = 1048576

            [completion]
            base_url = "http://localhost:8000/v1"
            model = "gpt-4o-mini"
            temperature = 0.0
            max_attempts = 1

            [analysis]
            max_prompt_chars = 50000
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.completion.base_url, "http://localhost:8000/v1");
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.temperature, 0.0);
        assert_eq!(config.completion.max_attempts, 1);
        assert_eq!(config.completion.timeout_secs, 60);
        assert_eq!(config.analysis.max_prompt_chars, 50_000);
        assert_eq!(config.analysis.completion_timeout_secs, 120);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ServerConfig::from_toml("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let result = ServerConfig::from_toml("[completion]\ntemperature = 1.7\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_too_many_attempts_rejected() {
        let result = ServerConfig::from_toml("[completion]\nmax_attempts = 10\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port = 7000").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_port, 7000);
    }

    #[test]
    fn test_example_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/tracewise.example.toml");
        let config = ServerConfig::from_file(path).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::from_file("/nonexistent/tracewise.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_api_key_required() {
        assert!(matches!(api_key_from(None), Err(ConfigError::MissingField(_))));
        assert!(matches!(
            api_key_from(Some("   ".to_string())),
            Err(ConfigError::MissingField(_))
        ));
        assert_eq!(api_key_from(Some(" sk-test ".to_string())).unwrap(), "sk-test");
    }
}
