//! Change Analysis MCP server binary.
//!
//! Runs the MCP server over stdio so an MCP client (Claude Desktop, an IDE
//! agent, ...) can drive the Change Analysis API.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `CHANGE_ANALYSIS_API_BASE_URL`: Base URL of the Change Analysis API
//! - `CHANGE_ANALYSIS_API_KEY`: API key (optional, but most deployments need it)
//! - `CHANGE_ANALYSIS_API_TIMEOUT`: Request timeout in seconds
//! - `CHANGE_ANALYSIS_AUTH_METHOD`: `x-api-key` or `bearer`
//!
//! # Usage
//!
//! ```bash
//! CHANGE_ANALYSIS_API_BASE_URL=https://changes.example.com \
//! CHANGE_ANALYSIS_API_KEY=xxx ./change-analysis-mcp
//! ```

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};

use change_analysis_mcp::{config, logging, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout is reserved for MCP JSON-RPC messages
    logging::init_logging();

    tracing::info!(
        "Starting Change Analysis MCP server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!(
        base_url = %config.base_url,
        auth_method = %config.auth_method,
        timeout_secs = config.timeout.as_secs_f64(),
        "Configuration loaded"
    );
    if !config.has_api_key() {
        tracing::warn!(
            "{} is not set; requests will be sent without authentication",
            config::API_KEY_VAR
        );
    }

    let server = server::ChangeAnalysisServer::new(config);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
