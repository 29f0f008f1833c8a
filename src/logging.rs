//! Logging setup.
//!
//! Logs always go to stderr: stdout carries the MCP JSON-RPC stream.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable naming a severity (`DEBUG`, `INFO`, `WARNING`, ...).
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Maps a severity name to a tracing level directive. Unknown names fall back to `info`.
pub fn level_directive(level: Option<&str>) -> &'static str {
    match level.map(|l| l.trim().to_uppercase()).as_deref() {
        Some("TRACE") => "trace",
        Some("DEBUG") => "debug",
        Some("WARNING") | Some("WARN") => "warn",
        Some("ERROR") | Some("CRITICAL") => "error",
        _ => "info",
    }
}

/// Builds the filter used when `RUST_LOG` is not set.
pub fn default_filter(level: Option<&str>) -> String {
    let level = level_directive(level);
    format!("change_analysis_mcp={level},reqwest=warn,hyper=warn,rmcp=warn")
}

/// Installs the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_logging() {
    let level = std::env::var(LOG_LEVEL_VAR).ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level.as_deref())));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
