//! Change request operations.
//!
//! Besides plain CRUD, change requests support comments, approval and
//! rejection, plus a client-side keyword search over the full collection.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::api_client::ApiClient;
use crate::error::ChangeAnalysisError;
use crate::models::{matches_keyword, Document, QueryFilters};

use super::collection::Collection;

/// Filters accepted by the change request listing.
#[derive(Debug, Clone, Default)]
pub struct ChangeRequestFilters {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by priority.
    pub priority: Option<String>,
    /// Filter by department.
    pub department: Option<String>,
    /// Filter by assignee ID.
    pub assignee_id: Option<String>,
    /// Server-side search by key, title, or description.
    pub search: Option<String>,
}

impl ChangeRequestFilters {
    /// Converts to query parameters, dropping blank values.
    pub fn to_query(&self) -> QueryFilters {
        QueryFilters::new()
            .with("status", self.status.as_deref())
            .with("priority", self.priority.as_deref())
            .with("department", self.department.as_deref())
            .with("assignee_id", self.assignee_id.as_deref())
            .with("search", self.search.as_deref())
    }
}

/// Service for the `/change-requests` collection.
#[derive(Clone)]
pub struct ChangeRequestsService {
    collection: Collection,
}

impl ChangeRequestsService {
    /// Collection path on the backend.
    pub const PATH: &'static str = "/change-requests";

    /// Binds the service to a client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH, "change_request_id"),
        }
    }

    /// Lists change requests matching the filters.
    pub async fn list(
        &self,
        filters: &ChangeRequestFilters,
    ) -> Result<Vec<Value>, ChangeAnalysisError> {
        self.collection.list(&filters.to_query()).await
    }

    /// Gets a single change request.
    pub async fn get(&self, id: &str) -> Result<Value, ChangeAnalysisError> {
        self.collection.get(id).await
    }

    /// Creates a change request.
    pub async fn create(&self, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.create(data).await
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.update(id, data).await
    }

    /// Deletes a change request.
    pub async fn delete(&self, id: &str) -> Result<(), ChangeAnalysisError> {
        self.collection.delete(id).await
    }

    /// Adds a comment to a change request.
    pub async fn add_comment(
        &self,
        id: &str,
        comment: &Document,
    ) -> Result<Value, ChangeAnalysisError> {
        let path = format!("{}/comments", self.collection.item_path(id)?);
        let body = Value::Object(comment.clone());
        self.collection.client().post(&path, Some(&body)).await
    }

    /// Approves a change request, optionally with a comment.
    pub async fn approve(
        &self,
        id: &str,
        comment: Option<&str>,
    ) -> Result<Value, ChangeAnalysisError> {
        self.review(id, "approve", comment).await
    }

    /// Rejects a change request, optionally with a comment.
    pub async fn reject(
        &self,
        id: &str,
        comment: Option<&str>,
    ) -> Result<Value, ChangeAnalysisError> {
        self.review(id, "reject", comment).await
    }

    async fn review(
        &self,
        id: &str,
        action: &str,
        comment: Option<&str>,
    ) -> Result<Value, ChangeAnalysisError> {
        let path = format!("{}/{}", self.collection.item_path(id)?, action);
        let body = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| json!({ "comment": c }));
        self.collection.client().post(&path, body.as_ref()).await
    }

    /// Keyword search over `key`, `title` and `description`.
    ///
    /// Fetches the unfiltered collection and keeps entries containing the
    /// query, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ChangeAnalysisError::Validation` if the query is blank.
    pub async fn search(&self, query: &str) -> Result<Vec<Value>, ChangeAnalysisError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ChangeAnalysisError::validation(
                "query is required and cannot be empty",
            ));
        }

        let needle = query.to_lowercase();
        let all = self.list(&ChangeRequestFilters::default()).await?;
        let total = all.len();
        let matches: Vec<Value> = all
            .into_iter()
            .filter(|entry| matches_keyword(entry, &needle))
            .collect();

        tracing::debug!(
            query = %query,
            scanned = total,
            matched = matches.len(),
            "Keyword search over change requests"
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{any, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: &str) -> ChangeRequestsService {
        let mut client = ApiClient::new(&Config::new(base_url)).unwrap();
        client.open().unwrap();
        ChangeRequestsService::new(Arc::new(client))
    }

    #[test]
    fn test_filters_to_query_skips_blank() {
        let filters = ChangeRequestFilters {
            status: Some("open".to_string()),
            priority: Some("  ".to_string()),
            department: Some(String::new()),
            assignee_id: Some(" u-7 ".to_string()),
            search: None,
        };
        let query = filters.to_query();
        assert_eq!(
            query.pairs(),
            &[("status", "open".to_string()), ("assignee_id", "u-7".to_string())]
        );
        assert!(ChangeRequestFilters::default().to_query().is_empty());
    }

    #[tokio::test]
    async fn test_list_passes_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/change-requests"))
            .and(query_param("priority", "high"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "cr-1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let filters = ChangeRequestFilters {
            priority: Some("high".to_string()),
            ..Default::default()
        };
        let items = service(&server.uri()).list(&filters).await.unwrap();
        assert_eq!(items, vec![json!({"id": "cr-1"})]);
    }

    #[tokio::test]
    async fn test_get_blank_id_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = service(&server.uri()).get("   ").await.unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_comment_posts_to_sub_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/change-requests/cr-1/comments"))
            .and(body_json(json!({"text": "LGTM"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "c1", "text": "LGTM"})))
            .expect(1)
            .mount(&server)
            .await;

        let comment = json!({"text": "LGTM"}).as_object().cloned().unwrap();
        let created = service(&server.uri())
            .add_comment("cr-1", &comment)
            .await
            .unwrap();
        assert_eq!(created["id"], "c1");
    }

    #[tokio::test]
    async fn test_approve_with_and_without_comment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/change-requests/cr-1/approve"))
            .and(body_json(json!({"comment": "ship it"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "approved"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/change-requests/cr-2/reject"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "rejected"})))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server.uri());
        let approved = svc.approve("cr-1", Some(" ship it ")).await.unwrap();
        assert_eq!(approved["status"], "approved");

        let rejected = svc.reject("cr-2", Some("  ")).await.unwrap();
        assert_eq!(rejected["status"], "rejected");

        let requests = server.received_requests().await.unwrap();
        let reject = requests
            .iter()
            .find(|r| r.url.path().ends_with("/reject"))
            .unwrap();
        assert!(reject.body.is_empty());
    }

    #[tokio::test]
    async fn test_search_filters_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/change-requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "key": "CHG-1", "title": "CR-100 Update"},
                {"id": "2", "key": "CHG-2", "title": "Feedback-2"},
                {"id": "3", "key": "CHG-3", "title": "Misc", "description": "follow-up to cr-12"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let matches = service(&server.uri()).search(" cr-1 ").await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_search_blank_query() {
        let err = service("http://127.0.0.1:1").search("  ").await.unwrap_err();
        assert!(matches!(err, ChangeAnalysisError::Validation(_)));
    }
}
