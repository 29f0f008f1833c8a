//! System inventory operations.

use std::sync::Arc;

use serde_json::Value;

use crate::api_client::ApiClient;
use crate::error::ChangeAnalysisError;
use crate::models::{Document, QueryFilters};

use super::collection::Collection;

/// Filters accepted by the system listing.
#[derive(Debug, Clone, Default)]
pub struct SystemFilters {
    /// Filter by lifecycle status.
    pub status: Option<String>,
    /// Filter by business criticality.
    pub criticality: Option<String>,
    /// Filter by owner.
    pub owner: Option<String>,
    /// Server-side free-text search.
    pub search: Option<String>,
}

impl SystemFilters {
    /// Converts to query parameters, dropping blank values.
    pub fn to_query(&self) -> QueryFilters {
        QueryFilters::new()
            .with("status", self.status.as_deref())
            .with("criticality", self.criticality.as_deref())
            .with("owner", self.owner.as_deref())
            .with("search", self.search.as_deref())
    }
}

/// Service for the `/systems` collection.
#[derive(Clone)]
pub struct SystemsService {
    collection: Collection,
}

impl SystemsService {
    /// Collection path on the backend.
    pub const PATH: &'static str = "/systems";

    /// Binds the service to a client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH, "system_id"),
        }
    }

    /// Lists systems matching the filters.
    pub async fn list(&self, filters: &SystemFilters) -> Result<Vec<Value>, ChangeAnalysisError> {
        self.collection.list(&filters.to_query()).await
    }

    /// Gets a single system.
    pub async fn get(&self, id: &str) -> Result<Value, ChangeAnalysisError> {
        self.collection.get(id).await
    }

    /// Registers a system.
    pub async fn create(&self, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.create(data).await
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, data: &Document) -> Result<Value, ChangeAnalysisError> {
        self.collection.update(id, data).await
    }

    /// Deletes a system.
    pub async fn delete(&self, id: &str) -> Result<(), ChangeAnalysisError> {
        self.collection.delete(id).await
    }
}
