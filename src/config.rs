//! Configuration management for the Change Analysis MCP server.
//!
//! Configuration is resolved once at startup from `CHANGE_ANALYSIS_*`
//! environment variables and is immutable afterwards. Resolution goes through
//! a lookup function so tests can supply values without touching the process
//! environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ChangeAnalysisError;

/// Environment variable holding the backend base URL.
pub const BASE_URL_VAR: &str = "CHANGE_ANALYSIS_API_BASE_URL";
/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "CHANGE_ANALYSIS_API_KEY";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "CHANGE_ANALYSIS_API_TIMEOUT";
/// Environment variable selecting the authentication header style.
pub const AUTH_METHOD_VAR: &str = "CHANGE_ANALYSIS_AUTH_METHOD";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// How the API key is attached to outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `X-API-Key: <key>`
    #[default]
    ApiKeyHeader,
}

impl AuthMethod {
    /// Returns the canonical configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Bearer => "bearer",
            AuthMethod::ApiKeyHeader => "x-api-key",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = ChangeAnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bearer" => Ok(AuthMethod::Bearer),
            "x-api-key" => Ok(AuthMethod::ApiKeyHeader),
            other => Err(ChangeAnalysisError::invalid_config(format!(
                "{} must be one of 'bearer' or 'x-api-key', got {:?}",
                AUTH_METHOD_VAR, other
            ))),
        }
    }
}

/// Configuration for connecting to the Change Analysis API.
///
/// The API key is stored but never logged; the `Debug` impl redacts it.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,

    /// API key for authentication, if one was configured.
    api_key: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Which header carries the API key.
    pub auth_method: AuthMethod,
}

impl Config {
    /// Creates a configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            api_key: None,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            auth_method: AuthMethod::default(),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the authentication header style.
    #[must_use]
    pub fn with_auth_method(mut self, auth_method: AuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    /// Returns the API key, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CHANGE_ANALYSIS_API_BASE_URL` (required)
    /// - `CHANGE_ANALYSIS_API_KEY` (optional)
    /// - `CHANGE_ANALYSIS_API_TIMEOUT` (optional, seconds, default `30.0`)
    /// - `CHANGE_ANALYSIS_AUTH_METHOD` (optional, `bearer` or `x-api-key`)
    ///
    /// # Errors
    ///
    /// Returns `ChangeAnalysisError::Config` naming the offending variable.
    pub fn from_env() -> Result<Self, ChangeAnalysisError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChangeAnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ChangeAnalysisError::missing_env(BASE_URL_VAR))?;

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) if !raw.trim().is_empty() => parse_timeout(&raw)?,
            _ => Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        };

        let auth_method = match lookup(AUTH_METHOD_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => AuthMethod::default(),
        };

        let mut config = Config::new(base_url)
            .with_timeout(timeout)
            .with_auth_method(auth_method);
        if let Some(key) = lookup(API_KEY_VAR) {
            config = config.with_api_key(key.trim());
        }

        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("auth_method", &self.auth_method)
            .finish()
    }
}

/// Trims whitespace and any trailing slash.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parses a timeout in (possibly fractional) seconds.
fn parse_timeout(raw: &str) -> Result<Duration, ChangeAnalysisError> {
    let secs: f64 = raw.trim().parse().map_err(|_| {
        ChangeAnalysisError::invalid_config(format!(
            "{} must be a number of seconds, got {:?}",
            TIMEOUT_VAR,
            raw.trim()
        ))
    })?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(ChangeAnalysisError::invalid_config(format!(
            "{} must be a positive number of seconds, got {}",
            TIMEOUT_VAR, secs
        )));
    }

    Duration::try_from_secs_f64(secs).map_err(|_| {
        ChangeAnalysisError::invalid_config(format!(
            "{} is too large, got {}",
            TIMEOUT_VAR, secs
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)]) -> Result<Config, ChangeAnalysisError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&[(BASE_URL_VAR, "http://localhost:8092")]).unwrap();
        assert_eq!(config.base_url, "http://localhost:8092");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.auth_method, AuthMethod::ApiKeyHeader);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_missing_base_url() {
        let err = resolve(&[]).unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::Config(_)));
        assert!(err.to_string().contains(BASE_URL_VAR));

        let err = resolve(&[(BASE_URL_VAR, "   ")]).unwrap_err();
        assert!(err.to_string().contains(BASE_URL_VAR));
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let config = resolve(&[(BASE_URL_VAR, " https://api.example.com/ ")]).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_timeout_parsing() {
        let config = resolve(&[(BASE_URL_VAR, "http://x"), (TIMEOUT_VAR, "2.5")]).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));

        let err = resolve(&[(BASE_URL_VAR, "http://x"), (TIMEOUT_VAR, "soon")]).unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_VAR));

        assert!(resolve(&[(BASE_URL_VAR, "http://x"), (TIMEOUT_VAR, "0")]).is_err());
        assert!(resolve(&[(BASE_URL_VAR, "http://x"), (TIMEOUT_VAR, "-3")]).is_err());
        assert!(resolve(&[(BASE_URL_VAR, "http://x"), (TIMEOUT_VAR, "inf")]).is_err());

        let err = resolve(&[(BASE_URL_VAR, "http://x"), (TIMEOUT_VAR, "1e20")]).unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::Config(_)));
        assert!(err.to_string().contains(TIMEOUT_VAR));
    }

    #[test]
    fn test_auth_method_case_insensitive() {
        let config = resolve(&[(BASE_URL_VAR, "http://x"), (AUTH_METHOD_VAR, "BEARER")]).unwrap();
        assert_eq!(config.auth_method, AuthMethod::Bearer);

        let config =
            resolve(&[(BASE_URL_VAR, "http://x"), (AUTH_METHOD_VAR, "X-Api-Key")]).unwrap();
        assert_eq!(config.auth_method, AuthMethod::ApiKeyHeader);
    }

    #[test]
    fn test_auth_method_rejects_unknown() {
        let err = resolve(&[(BASE_URL_VAR, "http://x"), (AUTH_METHOD_VAR, "basic")]).unwrap_err();
        assert!(err.to_string().contains(AUTH_METHOD_VAR));
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let config = resolve(&[(BASE_URL_VAR, "http://x"), (API_KEY_VAR, "  ")]).unwrap();
        assert!(config.api_key().is_none());

        let config = resolve(&[(BASE_URL_VAR, "http://x"), (API_KEY_VAR, "k-123")]).unwrap();
        assert_eq!(config.api_key(), Some("k-123"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::new("http://x").with_api_key("very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
