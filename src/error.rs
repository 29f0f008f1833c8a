//! Error types for the Change Analysis MCP server.
//!
//! This module defines `ChangeAnalysisError`, the unified error type raised by
//! the configuration resolver, the HTTP client and the domain services. The
//! tool layer is the only place these errors are caught and turned into text.
//!
//! # Security
//!
//! Error messages can carry response bodies from the backend. Use
//! `sanitize_message()` before logging or returning them so the API key never
//! leaks.

use thiserror::Error;

/// Unified error type for all Change Analysis operations.
#[derive(Error, Debug)]
pub enum ChangeAnalysisError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input validation failed before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// A JSON-string tool argument could not be parsed.
    #[error("invalid JSON in {field}: {source}")]
    InvalidJson {
        /// Name of the argument that held the malformed JSON.
        field: String,
        /// The parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, potentially containing error details.
        body: String,
    },

    /// The request never produced a response (connection, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A success response body was not valid JSON.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A service or client was used outside of an open factory scope.
    #[error("{0} is not initialized - open a service factory scope first")]
    NotInitialized(&'static str),
}

impl ChangeAnalysisError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        ChangeAnalysisError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ChangeAnalysisError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ChangeAnalysisError::Validation(message.into())
    }

    /// Creates an error for a malformed JSON argument.
    pub fn invalid_json(field: impl Into<String>, source: serde_json::Error) -> Self {
        ChangeAnalysisError::InvalidJson {
            field: field.into(),
            source,
        }
    }

    /// Returns the HTTP status code if the backend rejected the request.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ChangeAnalysisError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the backend answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(reqwest::StatusCode::NOT_FOUND)
    }

    /// Returns true if the error was caught before any network activity.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ChangeAnalysisError::Validation(_) | ChangeAnalysisError::InvalidJson { .. }
        )
    }

    /// Returns true for transport-level failures, including timeouts.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ChangeAnalysisError::Request(_))
    }

    /// Sanitizes an error message to remove any occurrence of the API key.
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the API key replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, api_key: Option<&str>) -> String {
        match api_key {
            Some(key) if !key.is_empty() => message.replace(key, "[REDACTED]"),
            _ => message.to_string(),
        }
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, api_key: Option<&str>) -> String {
        Self::sanitize_message(&self.to_string(), api_key)
    }
}
