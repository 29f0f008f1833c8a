//! Feedback operations.

use std::sync::Arc;

use serde_json::Value;

use crate::api_client::ApiClient;
use crate::error::ChangeAnalysisError;
use crate::models::{Document, QueryFilters};

use super::collection::Collection;

/// Filters accepted by the feedback listing.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilters {
    /// Only feedback on this change request.
    pub change_request_id: Option<String>,
    /// Only feedback on this system.
    pub system_id: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
    /// Server-side free-text search.
    pub search: Option<String>,
}

impl FeedbackFilters {
    /// Converts to query parameters, dropping blank values.
    pub fn to_query(&self) -> QueryFilters {
        QueryFilters::new()
            .with("change_request_id", self.change_request_id.as_deref())
            .with("system_id", self.system_id.as_deref())
            .with("status", self.status.as_deref())
            .with("search", self.search.as_deref())
    }
}

/// Service for the `/feedbacks` collection.
#[derive(Clone)]
pub struct FeedbacksService {
    collection: Collection,
}

impl FeedbacksService {
    /// Collection path on the backend.
    pub const PATH: &'static str = "/feedbacks";

    /// Binds the service to a client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH, "feedback_id"),
        }
    }

    /// Lists feedback entries matching the filters.
    pub async fn list(&self, filters: &FeedbackFilters) -> Result<Vec<Value>, ChangeAnalysisError> {
        self.collection.list(&filters.to_query()).await
    }

    /// Gets a single feedback entry.
    pub async fn get(&self, id: &str) -> Result<Value, ChangeAnalysisError> {
        self.collection.get(id).await
    }

    /// Records a feedback entry.
    pub async fn create(&self, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.create(data).await
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.update(id, data).await
    }

    /// Deletes a feedback entry.
    pub async fn delete(&self, id: &str) -> Result<(), ChangeAnalysisError> {
        self.collection.delete(id).await
    }
}
