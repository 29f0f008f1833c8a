//! Project operations.

use std::sync::Arc;

use serde_json::Value;

use crate::api_client::ApiClient;
use crate::error::ChangeAnalysisError;
use crate::models::{Document, QueryFilters};

use super::collection::Collection;

/// Filters accepted by the project listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilters {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by owner ID.
    pub owner_id: Option<String>,
    /// Server-side free-text search.
    pub search: Option<String>,
}

impl ProjectFilters {
    /// Converts to query parameters, dropping blank values.
    pub fn to_query(&self) -> QueryFilters {
        QueryFilters::new()
            .with("status", self.status.as_deref())
            .with("owner_id", self.owner_id.as_deref())
            .with("search", self.search.as_deref())
    }
}

/// Service for the `/projects` collection.
#[derive(Clone)]
pub struct ProjectsService {
    collection: Collection,
}

impl ProjectsService {
    /// Collection path on the backend.
    pub const PATH: &'static str = "/projects";

    /// Binds the service to a client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH, "project_id"),
        }
    }

    /// Lists projects matching the filters.
    pub async fn list(&self, filters: &ProjectFilters) -> Result<Vec<Value>, ChangeAnalysisError> {
        self.collection.list(&filters.to_query()).await
    }

    /// Gets a single project.
    pub async fn get(&self, id: &str) -> Result<Value, ChangeAnalysisError> {
        self.collection.get(id).await
    }

    /// Creates a project.
    pub async fn create(&self, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.create(data).await
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.update(id, data).await
    }

    /// Deletes a project.
    pub async fn delete(&self, id: &str) -> Result<(), ChangeAnalysisError> {
        self.collection.delete(id).await
    }
}
