//! CRUD plumbing shared by every domain service.

use std::sync::Arc;

use serde_json::Value;

use crate::api_client::ApiClient;
use crate::error::ChangeAnalysisError;
use crate::models::{into_list, Document, QueryFilters};

/// Validates that an ID is present and returns it trimmed.
///
/// # Errors
///
/// Returns `ChangeAnalysisError::Validation` if the ID is empty or whitespace,
/// or is a `.`/`..` dot segment. Percent-encoding leaves dots alone, and URL
/// normalization would resolve such a segment to the collection or its parent.
pub fn require_id<'a>(id: &'a str, field_name: &str) -> Result<&'a str, ChangeAnalysisError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ChangeAnalysisError::validation(format!(
            "{} is required and cannot be empty",
            field_name
        )));
    }
    if id == "." || id == ".." {
        return Err(ChangeAnalysisError::validation(format!(
            "{} cannot be '{}'",
            field_name, id
        )));
    }
    Ok(id)
}

/// A REST collection rooted at a fixed path.
#[derive(Clone)]
pub(crate) struct Collection {
    client: Arc<ApiClient>,
    path: &'static str,
    id_field: &'static str,
}

impl Collection {
    pub(crate) fn new(client: Arc<ApiClient>, path: &'static str, id_field: &'static str) -> Self {
        Self {
            client,
            path,
            id_field,
        }
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Validates `id` and returns the item path, with the ID percent-encoded.
    pub(crate) fn item_path(&self, id: &str) -> Result<String, ChangeAnalysisError> {
        let id = require_id(id, self.id_field)?;
        Ok(format!("{}/{}", self.path, urlencoding::encode(id)))
    }

    pub(crate) async fn list(&self, filters: &QueryFilters) -> Result<Vec<Value>, ChangeAnalysisError> {
        let data = self.client.get(self.path, Some(filters)).await?;
        Ok(into_list(data))
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Value, ChangeAnalysisError> {
        let path = self.item_path(id)?;
        self.client.get(&path, None).await
    }

    pub(crate) async fn create(&self, data: &Document) -> Result<Value, ChangeAnalysisError> {
        let body = Value::Object(data.clone());
        self.client.post(self.path, Some(&body)).await
    }

    pub(crate) async fn update(&self, id: &str, data: &Document) -> Result<Value, ChangeAnalysisError> {
        let path = self.item_path(id)?;
        let body = Value::Object(data.clone());
        self.client.patch(&path, &body).await
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<(), ChangeAnalysisError> {
        let path = self.item_path(id)?;
        self.client.delete(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id_trims() {
        assert_eq!(require_id("  cr-1 ", "change_request_id").unwrap(), "cr-1");
    }

    #[test]
    fn test_require_id_rejects_blank() {
        let err = require_id("   ", "system_id").unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::Validation(_)));
        assert!(err.to_string().contains("system_id"));
        assert!(require_id("", "system_id").is_err());
    }

    #[test]
    fn test_require_id_rejects_dot_segments() {
        for id in [".", "..", " .. "] {
            let err = require_id(id, "system_id").unwrap_err();
            assert!(matches!(err, ChangeAnalysisError::Validation(_)), "{id:?}");
            assert!(err.to_string().contains("system_id"));
        }
        assert_eq!(require_id("...", "system_id").unwrap(), "...");
        assert_eq!(require_id("v1.2", "system_id").unwrap(), "v1.2");
    }

    #[test]
    fn test_item_path_encodes_id() {
        let client = Arc::new(ApiClient::new(&crate::config::Config::new("http://x")).unwrap());
        let collection = Collection::new(client, "/systems", "system_id");
        assert_eq!(collection.item_path(" s-1 ").unwrap(), "/systems/s-1");
        assert_eq!(collection.item_path("a/b").unwrap(), "/systems/a%2Fb");
    }
}
