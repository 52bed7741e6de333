//! TraceWise Server
//!
//! HTTP surface of the traceability relay: a single analysis route backed
//! by an OpenAI-compatible completion service, plus a liveness probe.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tokio::signal;
use tracewise_analyzer::Analyzer;
use tracewise_llm::{LlmError, OpenAiProvider};
use tracing::{error, info};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Completion provider could not be set up
    #[error("Completion provider error: {0}")]
    Provider(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application router from configuration and credential
pub fn build_app(config: &ServerConfig, api_key: String) -> Result<axum::Router, ServerError> {
    config.validate()?;

    let provider = OpenAiProvider::new(config.completion.clone(), api_key)?;
    let analyzer = Analyzer::new(provider, config.analysis.clone());

    let state = AppState {
        analyzer,
        max_upload_bytes: config.max_upload_bytes,
    };

    Ok(create_router(state))
}

/// Start the TraceWise HTTP server
///
/// Builds the completion provider and analyzer, binds, and serves until
/// Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig, api_key: String) -> Result<(), ServerError> {
    info!("Starting TraceWise server");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Completion model: {} at {} (temperature {}, {} attempts, {}s per attempt)",
        config.completion.model,
        config.completion.base_url,
        config.completion.temperature,
        config.completion.max_attempts,
        config.completion.timeout_secs
    );
    info!(
        "Limits: {} byte uploads, {} char prompts, {}s per analysis",
        config.max_upload_bytes,
        config.analysis.max_prompt_chars,
        config.analysis.completion_timeout_secs
    );

    let app = build_app(&config, api_key)?;

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("TraceWise listening on {}", config.bind_addr());
    info!("  POST /trace - Analyze requirements, code and test cases");
    info!("  GET / - Liveness probe");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("TraceWise server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_app_with_defaults() {
        let config = ServerConfig::default();
        assert!(build_app(&config, "sk-test".to_string()).is_ok());
    }

    #[test]
    fn test_build_app_rejects_blank_key() {
        let config = ServerConfig::default();
        let result = build_app(&config, String::new());
        assert!(matches!(result, Err(ServerError::Provider(LlmError::Config(_)))));
    }

    #[test]
    fn test_build_app_rejects_invalid_config() {
        let mut config = ServerConfig::default();
        config.max_upload_bytes = 0;
        let result = build_app(&config, "sk-test".to_string());
        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
