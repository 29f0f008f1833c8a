//! # Change Analysis MCP
//!
//! An MCP (Model Context Protocol) server for the Change Analysis REST API.
//!
//! It exposes change requests, systems, feedbacks and projects as MCP tools,
//! so an AI assistant can browse, create, update, review and search them
//! through natural language.
//!
//! ## Features
//!
//! - **CRUD**: list, get, create, update and delete for all four collections
//! - **Review**: comment on, approve and reject change requests
//! - **Search**: case-insensitive keyword search over change requests
//! - **Health**: a never-failing connectivity and configuration report
//! - **Security**: the API key is never logged or echoed back to callers
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error type with API key sanitization
//! - [`logging`] - Tracing subscriber setup (stderr only)
//! - [`api_client`] - Async HTTP client bound to the configured backend
//! - [`models`] - Untyped documents and query filters
//! - [`services`] - One service per collection plus the scoped factory
//! - [`tools`] - Tool inputs and result rendering
//! - [`server`] - MCP server implementation with tool routing
//!
//! Each tool call opens a [`ServiceFactory`](services::ServiceFactory)
//! scope: one HTTP client is created, shared by the four services, and
//! closed when the call finishes, whether it succeeded or not.
//!
//! ## Configuration
//!
//! - `CHANGE_ANALYSIS_API_BASE_URL`: Base URL of the API (required)
//! - `CHANGE_ANALYSIS_API_KEY`: API key; requests are unauthenticated without it
//! - `CHANGE_ANALYSIS_API_TIMEOUT`: Request timeout in seconds (default `30`)
//! - `CHANGE_ANALYSIS_AUTH_METHOD`: `x-api-key` (default) or `bearer`
//! - `LOG_LEVEL` / `RUST_LOG`: Log verbosity
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use change_analysis_mcp::config::Config;
//! use change_analysis_mcp::services::{ChangeRequestFilters, ServiceFactory};
//!
//! async fn example() -> Result<(), change_analysis_mcp::error::ChangeAnalysisError> {
//!     let config = Arc::new(Config::from_env()?);
//!
//!     let open = ServiceFactory::scope(config, |services| async move {
//!         let filters = ChangeRequestFilters {
//!             status: Some("open".to_string()),
//!             ..Default::default()
//!         };
//!         services.change_requests.list(&filters).await
//!     })
//!     .await?;
//!
//!     println!("{} open change requests", open.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod api_client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod services;
pub mod tools;
