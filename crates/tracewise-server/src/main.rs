//! TraceWise server binary
//!
//! Loads configuration, reads the completion-service credential, and starts
//! the HTTP server.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracewise_server::config::{api_key_from_env, ServerConfig};
use tracewise_server::start_server;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// TraceWise - requirements, test case and code traceability analysis
#[derive(Debug, Parser)]
#[command(name = "tracewise", version, about)]
struct Cli {
    /// Load configuration from this TOML file
    #[arg(long, env = "TRACEWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind port from the configuration
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => {
            warn!("No config file specified, using defaults");
            ServerConfig::default()
        }
    };
    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    if dotenv_loaded {
        debug!("Loaded environment from .env");
    }

    let api_key = api_key_from_env().context("reading the completion-service API key")?;

    start_server(config, api_key).await?;

    Ok(())
}
