//! HTTP client for the Change Analysis API.
//!
//! `ApiClient` performs authenticated JSON-over-HTTP requests. It is a scoped
//! resource: the underlying connection pool only exists between `open()` and
//! `close()`, and any verb call outside that window fails with
//! `ChangeAnalysisError::NotInitialized`.
//!
//! No retries are attempted. A failed call surfaces immediately.
//!
//! # Security
//!
//! The API key is attached as a sensitive default header and never logged.
//! Error bodies are sanitized before they leave this module.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::config::{AuthMethod, Config, API_KEY_VAR};
use crate::error::ChangeAnalysisError;
use crate::models::QueryFilters;

/// Maximum length for HTTP error response bodies.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Header name used by the `x-api-key` auth method.
const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client wrapper for the Change Analysis API.
///
/// # Example
///
/// ```ignore
/// let mut client = ApiClient::new(&config)?;
/// client.open()?;
/// let items = client.get("/change-requests", None).await?;
/// client.close();
/// ```
pub struct ApiClient {
    /// The live HTTP client; `None` outside the open scope.
    http: Option<Client>,

    /// Base URL without a trailing slash.
    base_url: String,

    /// Per-request timeout.
    timeout: Duration,

    /// Default headers including the auth header, built once at construction.
    headers: HeaderMap,

    /// API key, kept only for sanitizing error text.
    /// SECURITY: Never log this value!
    api_key: Option<String>,
}

impl ApiClient {
    /// Creates a client from configuration. The client starts closed.
    ///
    /// # Errors
    ///
    /// Returns `ChangeAnalysisError::Config` if the API key cannot be used as
    /// an HTTP header value.
    pub fn new(config: &Config) -> Result<Self, ChangeAnalysisError> {
        Ok(Self {
            http: None,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            headers: Self::default_headers(config)?,
            api_key: config.api_key().map(str::to_string),
        })
    }

    /// Builds the header set sent with every request.
    ///
    /// The auth header is only present when a key is configured; without one
    /// requests go out unauthenticated and the server is expected to reject them.
    fn default_headers(config: &Config) -> Result<HeaderMap, ChangeAnalysisError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = config.api_key() {
            let (name, raw) = match config.auth_method {
                AuthMethod::Bearer => (AUTHORIZATION, format!("Bearer {}", key)),
                AuthMethod::ApiKeyHeader => {
                    (HeaderName::from_static(API_KEY_HEADER), key.to_string())
                }
            };
            let mut value = HeaderValue::from_str(&raw).map_err(|_| {
                ChangeAnalysisError::invalid_config(format!(
                    "{} contains characters not allowed in an HTTP header",
                    API_KEY_VAR
                ))
            })?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Acquires the connection resource. Calling it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ChangeAnalysisError::HttpClient` if the HTTP client fails to initialize.
    pub fn open(&mut self) -> Result<(), ChangeAnalysisError> {
        if self.http.is_some() {
            return Ok(());
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .default_headers(self.headers.clone())
            .build()
            .map_err(ChangeAnalysisError::HttpClient)?;

        tracing::debug!(base_url = %self.base_url, "API client opened");
        self.http = Some(http);
        Ok(())
    }

    /// Releases the connection resource.
    pub fn close(&mut self) {
        if self.http.take().is_some() {
            tracing::debug!(base_url = %self.base_url, "API client closed");
        }
    }

    /// Returns true between `open()` and `close()`.
    pub fn is_open(&self) -> bool {
        self.http.is_some()
    }

    /// Returns the API key for sanitizing error text, never for logging.
    pub(crate) fn api_key_for_sanitization(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the live HTTP client.
    fn http(&self) -> Result<&Client, ChangeAnalysisError> {
        self.http
            .as_ref()
            .ok_or(ChangeAnalysisError::NotInitialized("API client"))
    }

    /// Starts a request against `path` relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ChangeAnalysisError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path = %path, "Making Change Analysis API request");
        Ok(self.http()?.request(method, url))
    }

    /// Sends a request and fails on any non-2xx status.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ChangeAnalysisError> {
        let response = request.send().await.map_err(ChangeAnalysisError::Request)?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        Ok(response)
    }

    /// Reads a success body as JSON. An empty body reads as `null`.
    async fn read_json(response: Response) -> Result<Value, ChangeAnalysisError> {
        let body = response.text().await.map_err(ChangeAnalysisError::Request)?;
        tracing::trace!(body = %body, "Change Analysis API response");

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Converts a non-2xx response into `ChangeAnalysisError::HttpStatus`.
    async fn handle_http_error(&self, status: StatusCode, response: Response) -> ChangeAnalysisError {
        let body = response.text().await.unwrap_or_default();
        let body = ChangeAnalysisError::sanitize_message(&body, self.api_key_for_sanitization());
        let body = truncate_body(body);

        tracing::warn!(status = %status, "Change Analysis API returned an error status");
        ChangeAnalysisError::HttpStatus { status, body }
    }

    /// Makes a GET request, optionally with query parameters.
    pub async fn get(
        &self,
        path: &str,
        params: Option<&QueryFilters>,
    ) -> Result<Value, ChangeAnalysisError> {
        let mut request = self.request(Method::GET, path)?;
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            request = request.query(params.pairs());
        }
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// Makes a POST request with an optional JSON body.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ChangeAnalysisError> {
        let mut request = self.request(Method::POST, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ChangeAnalysisError> {
        let request = self.request(Method::PATCH, path)?.json(body);
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// Makes a DELETE request. Any response body is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), ChangeAnalysisError> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(request).await?;
        Ok(())
    }

    /// Issues a GET and reports the status code without treating non-2xx as failure.
    ///
    /// Used by the health check; only transport failures are errors.
    pub async fn probe(&self, path: &str) -> Result<StatusCode, ChangeAnalysisError> {
        let response = self
            .request(Method::GET, path)?
            .send()
            .await
            .map_err(ChangeAnalysisError::Request)?;
        Ok(response.status())
    }
}

impl Drop for ApiClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Truncates a body on a char boundary.
fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_LEN) {
        Some((cut, _)) => format!("{}...[truncated]", &body[..cut]),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn open_client(config: &Config) -> ApiClient {
        let mut client = ApiClient::new(config).unwrap();
        client.open().unwrap();
        client
    }

    #[tokio::test]
    async fn test_bearer_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/change-requests"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::new(server.uri())
            .with_api_key("sk-test")
            .with_auth_method(AuthMethod::Bearer);
        let client = open_client(&config);

        let value = client.get("/change-requests", None).await.unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_x_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/systems"))
            .and(header("X-API-Key", "k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "s1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()).with_api_key("k-123"));
        tokio_test::assert_ok!(client.get("/systems", None).await);
    }

    #[tokio::test]
    async fn test_missing_key_sends_no_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        let err = client.get("/projects", None).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
        assert!(requests[0].headers.get("x-api-key").is_none());
    }

    #[tokio::test]
    async fn test_get_sends_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/change-requests"))
            .and(query_param("status", "open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        let filters = QueryFilters::new().with("status", Some("open"));
        client.get("/change-requests", Some(&filters)).await.unwrap();
    }

    #[tokio::test]
    async fn test_post_and_patch_send_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects"))
            .and(body_json(json!({"name": "Apollo"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p1", "name": "Apollo"})))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/projects/p1"))
            .and(body_json(json!({"name": "Gemini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p1", "name": "Gemini"})))
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        let created = client
            .post("/projects", Some(&json!({"name": "Apollo"})))
            .await
            .unwrap();
        assert_eq!(created["id"], "p1");

        let updated = client
            .patch("/projects/p1", &json!({"name": "Gemini"}))
            .await
            .unwrap();
        assert_eq!(updated["name"], "Gemini");
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/change-requests/cr-1/approve"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        let value = client.post("/change-requests/cr-1/approve", None).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_delete_returns_unit() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/feedbacks/f1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        client.delete("/feedbacks/f1").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/change-requests/missing-id"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        let err = client.get("/change-requests/missing-id", None).await.unwrap_err();
        match err {
            ChangeAnalysisError::HttpStatus { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "Not found");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_body_is_sanitized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key k-secret-42"))
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()).with_api_key("k-secret-42"));
        let err = client.get("/systems", None).await.unwrap_err();
        assert!(!err.to_string().contains("k-secret-42"));
        assert!(err.to_string().contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_calls_fail_when_not_open() {
        let mut client = ApiClient::new(&Config::new("http://127.0.0.1:1")).unwrap();
        let err = client.get("/systems", None).await.unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::NotInitialized(_)));

        client.open().unwrap();
        assert!(client.is_open());
        client.close();
        assert!(!client.is_open());
        let err = client.delete("/systems/s1").await.unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::NotInitialized(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = open_client(&Config::new("http://127.0.0.1:1"));
        let err = client.get("/change-requests", None).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_probe_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = open_client(&Config::new(server.uri()));
        let status = client.probe("/change-requests").await.unwrap();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_key_rejected_at_construction() {
        let config = Config::new("http://x").with_api_key("bad\nkey");
        let err = ApiClient::new(&config).err().unwrap();
        assert!(matches!(err, ChangeAnalysisError::Config(_)));
    }

    #[test]
    fn test_truncate_body() {
        let short = "short".to_string();
        assert_eq!(truncate_body(short.clone()), short);

        let long = "é".repeat(MAX_ERROR_BODY_LEN + 10);
        let truncated = truncate_body(long);
        assert!(truncated.ends_with("...[truncated]"));
        assert_eq!(truncated.chars().filter(|c| *c == 'é').count(), MAX_ERROR_BODY_LEN);
    }
}
