//! Rendering of tool results.
//!
//! Every tool returns a single string. Callers rely on the prefixes below to
//! tell data from failures, so they are kept byte-for-byte stable:
//!
//! | Outcome            | Text                                              |
//! |--------------------|---------------------------------------------------|
//! | list / search      | `Found <N> <entity>(s): <JSON array>`             |
//! | empty search       | `No change requests found for '<query>'`          |
//! | write              | `<Entity> ... successfully: <JSON>`               |
//! | delete             | `<Entity> <id> deleted successfully`              |
//! | get                | raw JSON                                          |
//! | validation         | `Error: <description>`                            |
//! | non-2xx            | `HTTP error occurred: <status> - <body>`          |
//! | transport          | `Request error occurred: <reason>`                |
//! | anything else      | `Error <action>: <details>`                       |

use reqwest::StatusCode;
use serde_json::Value;

use crate::config::{Config, API_KEY_VAR};
use crate::error::ChangeAnalysisError;
use crate::models::Document;

/// Resource domains, for wording messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A change request.
    ChangeRequest,
    /// A system.
    System,
    /// A feedback entry.
    Feedback,
    /// A project.
    Project,
}

impl Entity {
    /// Lowercase noun used mid-sentence.
    pub fn noun(&self) -> &'static str {
        match self {
            Entity::ChangeRequest => "change request",
            Entity::System => "system",
            Entity::Feedback => "feedback",
            Entity::Project => "project",
        }
    }

    /// Capitalized noun used at the start of a sentence.
    pub fn title(&self) -> &'static str {
        match self {
            Entity::ChangeRequest => "Change request",
            Entity::System => "System",
            Entity::Feedback => "Feedback",
            Entity::Project => "Project",
        }
    }
}

/// Parses a JSON-string tool argument into a document.
///
/// # Errors
///
/// - `Validation` if the argument is blank or not a JSON object
/// - `InvalidJson` if it does not parse at all
pub fn parse_document(field: &str, raw: &str) -> Result<Document, ChangeAnalysisError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ChangeAnalysisError::validation(format!(
            "{} is required and cannot be empty",
            field
        )));
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(ChangeAnalysisError::validation(format!(
            "{} must be a JSON object",
            field
        ))),
        Err(e) => Err(ChangeAnalysisError::invalid_json(field, e)),
    }
}

/// Pretty-prints JSON for embedding in a message.
pub fn to_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// `Found <N> <entity>(s): <JSON array>`
pub fn format_list(entity: Entity, items: &[Value]) -> String {
    let array = Value::Array(items.to_vec());
    format!("Found {} {}(s): {}", items.len(), entity.noun(), to_json(&array))
}

/// Keyword search result for change requests.
pub fn format_search(query: &str, items: &[Value]) -> String {
    if items.is_empty() {
        return format!("No change requests found for '{}'", query);
    }
    format_list(Entity::ChangeRequest, items)
}

/// `<message> successfully: <JSON>`
pub fn format_success(message: &str, value: &Value) -> String {
    format!("{} successfully: {}", message, to_json(value))
}

/// `<Entity> <id> deleted successfully`
pub fn format_deleted(entity: Entity, id: &str) -> String {
    format!("{} {} deleted successfully", entity.title(), id)
}

/// Classifies an error into its caller-facing string.
///
/// `action` completes the sentence "Error <action>: ..." for unexpected
/// errors, e.g. "listing systems". The API key is scrubbed from the
/// variable parts only, so the fixed prefixes stay intact.
pub fn format_error(action: &str, error: &ChangeAnalysisError, api_key: Option<&str>) -> String {
    let scrub = |text: &str| ChangeAnalysisError::sanitize_message(text, api_key);
    match error {
        ChangeAnalysisError::Validation(message) => format!("Error: {}", scrub(message)),
        ChangeAnalysisError::InvalidJson { field, source } => format!(
            "Error: invalid JSON in {}: {}",
            field,
            scrub(&source.to_string())
        ),
        ChangeAnalysisError::HttpStatus { status, body } => {
            format!("HTTP error occurred: {} - {}", status.as_u16(), scrub(body))
        }
        ChangeAnalysisError::Request(e) => {
            format!("Request error occurred: {}", scrub(&e.to_string()))
        }
        other => format!("Error {}: {}", action, other.sanitized_display(api_key)),
    }
}

/// Outcome of the health check probe.
#[derive(Debug)]
pub enum HealthStatus {
    /// No API key configured; the backend was not contacted.
    MissingApiKey,
    /// The backend answered with a success status.
    Healthy(StatusCode),
    /// The backend answered with a non-success status.
    Degraded(StatusCode),
    /// The backend could not be reached.
    Unreachable(String),
}

/// Renders the multi-line health report.
///
/// Only the base URL and connection details are scrubbed; the template
/// text is emitted verbatim.
pub fn format_health_report(config: &Config, status: &HealthStatus) -> String {
    let scrub = |text: &str| ChangeAnalysisError::sanitize_message(text, config.api_key());

    let headline = match status {
        HealthStatus::MissingApiKey => format!(
            "WARNING: {} is not set. Requests will be sent without authentication \
             and are likely to be rejected.",
            API_KEY_VAR
        ),
        HealthStatus::Healthy(code) => format!(
            "OK: Change Analysis API is reachable (HTTP {}).",
            code.as_u16()
        ),
        HealthStatus::Degraded(code) => format!(
            "WARNING: Change Analysis API responded with HTTP {}. Check the API key and base URL.",
            code.as_u16()
        ),
        HealthStatus::Unreachable(details) => format!(
            "ERROR: Could not connect to the Change Analysis API: {}",
            scrub(details)
        ),
    };

    let key_state = if config.has_api_key() {
        "configured"
    } else {
        "not configured"
    };

    format!(
        "Change Analysis API Health Check\n\
         {}\n\
         \n\
         Configuration Status:\n\
         - Base URL: {}\n\
         - API Key: {}\n\
         - Auth Method: {}\n\
         - Timeout: {:.1}s",
        headline,
        scrub(&config.base_url),
        key_state,
        config.auth_method,
        config.timeout.as_secs_f64()
    )
}
