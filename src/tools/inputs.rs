//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields. This should be called before processing input.
//! Required IDs stay as (possibly empty) strings so the services can
//! reject them with a validation error.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

use crate::services::{ChangeRequestFilters, FeedbackFilters, ProjectFilters, SystemFilters};

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ============================================================================
// Change requests
// ============================================================================

/// Input parameters for the list_change_requests tool.
///
/// All fields are optional - use them to filter the results.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListChangeRequestsInput {
    /// Filter by status (e.g., "draft", "pending", "approved").
    #[serde(default)]
    pub status: Option<String>,

    /// Filter by priority (e.g., "low", "medium", "high").
    #[serde(default)]
    pub priority: Option<String>,

    /// Filter by department.
    #[serde(default)]
    pub department: Option<String>,

    /// Filter by assignee ID.
    #[serde(default)]
    pub assignee_id: Option<String>,

    /// Search by key, title, or description (server-side).
    #[serde(default)]
    pub search: Option<String>,
}

impl ListChangeRequestsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            status: trim_option(&self.status),
            priority: trim_option(&self.priority),
            department: trim_option(&self.department),
            assignee_id: trim_option(&self.assignee_id),
            search: trim_option(&self.search),
        }
    }
}

impl From<ListChangeRequestsInput> for ChangeRequestFilters {
    fn from(input: ListChangeRequestsInput) -> Self {
        Self {
            status: input.status,
            priority: input.priority,
            department: input.department,
            assignee_id: input.assignee_id,
            search: input.search,
        }
    }
}

/// Input parameters for tools addressing one change request.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChangeRequestIdInput {
    /// The unique ID of the change request.
    pub change_request_id: String,
}

impl ChangeRequestIdInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            change_request_id: self.change_request_id.trim().to_string(),
        }
    }
}

/// Input parameters for the create_change_request tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateChangeRequestInput {
    /// The change request as a JSON object string, e.g. '{"title": "Upgrade DB", "priority": "high"}'.
    pub data: String,
}

/// Input parameters for the update_change_request tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateChangeRequestInput {
    /// The unique ID of the change request to update.
    pub change_request_id: String,

    /// Fields to update as a JSON object string.
    pub data: String,
}

impl UpdateChangeRequestInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            change_request_id: self.change_request_id.trim().to_string(),
            data: self.data.trim().to_string(),
        }
    }
}

/// Input parameters for the add_change_request_comment tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCommentInput {
    /// The unique ID of the change request to comment on.
    pub change_request_id: String,

    /// The comment as a JSON object string, e.g. '{"text": "Looks good", "author_id": "u-1"}'.
    pub comment: String,
}

impl AddCommentInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            change_request_id: self.change_request_id.trim().to_string(),
            comment: self.comment.trim().to_string(),
        }
    }
}

/// Input parameters for the approve_change_request and reject_change_request tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReviewChangeRequestInput {
    /// The unique ID of the change request.
    pub change_request_id: String,

    /// Optional reviewer comment sent along with the decision.
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReviewChangeRequestInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            change_request_id: self.change_request_id.trim().to_string(),
            comment: trim_option(&self.comment),
        }
    }
}

/// Input parameters for the analyze_change tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeChangeInput {
    /// Keyword to look for in change request keys, titles and descriptions (case-insensitive).
    pub query: String,
}

impl AnalyzeChangeInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            query: self.query.trim().to_string(),
        }
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Input parameters for the list_systems tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListSystemsInput {
    /// Filter by lifecycle status (e.g., "active", "retired").
    #[serde(default)]
    pub status: Option<String>,

    /// Filter by business criticality (e.g., "low", "high").
    #[serde(default)]
    pub criticality: Option<String>,

    /// Filter by owner.
    #[serde(default)]
    pub owner: Option<String>,

    /// Free-text search (server-side).
    #[serde(default)]
    pub search: Option<String>,
}

impl ListSystemsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            status: trim_option(&self.status),
            criticality: trim_option(&self.criticality),
            owner: trim_option(&self.owner),
            search: trim_option(&self.search),
        }
    }
}

impl From<ListSystemsInput> for SystemFilters {
    fn from(input: ListSystemsInput) -> Self {
        Self {
            status: input.status,
            criticality: input.criticality,
            owner: input.owner,
            search: input.search,
        }
    }
}

/// Input parameters for tools addressing one system.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SystemIdInput {
    /// The unique ID of the system.
    pub system_id: String,
}

impl SystemIdInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            system_id: self.system_id.trim().to_string(),
        }
    }
}

/// Input parameters for the create_system tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateSystemInput {
    /// The system as a JSON object string, e.g. '{"name": "Billing", "criticality": "high"}'.
    pub data: String,
}

/// Input parameters for the update_system tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateSystemInput {
    /// The unique ID of the system to update.
    pub system_id: String,

    /// Fields to update as a JSON object string.
    pub data: String,
}

impl UpdateSystemInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            system_id: self.system_id.trim().to_string(),
            data: self.data.trim().to_string(),
        }
    }
}

// ============================================================================
// Feedbacks
// ============================================================================

/// Input parameters for the list_feedbacks tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListFeedbacksInput {
    /// Only feedback on this change request.
    #[serde(default)]
    pub change_request_id: Option<String>,

    /// Only feedback on this system.
    #[serde(default)]
    pub system_id: Option<String>,

    /// Filter by status.
    #[serde(default)]
    pub status: Option<String>,

    /// Free-text search (server-side).
    #[serde(default)]
    pub search: Option<String>,
}

impl ListFeedbacksInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            change_request_id: trim_option(&self.change_request_id),
            system_id: trim_option(&self.system_id),
            status: trim_option(&self.status),
            search: trim_option(&self.search),
        }
    }
}

impl From<ListFeedbacksInput> for FeedbackFilters {
    fn from(input: ListFeedbacksInput) -> Self {
        Self {
            change_request_id: input.change_request_id,
            system_id: input.system_id,
            status: input.status,
            search: input.search,
        }
    }
}

/// Input parameters for tools addressing one feedback entry.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FeedbackIdInput {
    /// The unique ID of the feedback entry.
    pub feedback_id: String,
}

impl FeedbackIdInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            feedback_id: self.feedback_id.trim().to_string(),
        }
    }
}

/// Input parameters for the create_feedback tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateFeedbackInput {
    /// The feedback as a JSON object string, e.g. '{"change_request_id": "cr-1", "rating": 4}'.
    pub data: String,
}

/// Input parameters for the update_feedback tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateFeedbackInput {
    /// The unique ID of the feedback entry to update.
    pub feedback_id: String,

    /// Fields to update as a JSON object string.
    pub data: String,
}

impl UpdateFeedbackInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            feedback_id: self.feedback_id.trim().to_string(),
            data: self.data.trim().to_string(),
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

/// Input parameters for the list_projects tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListProjectsInput {
    /// Filter by status.
    #[serde(default)]
    pub status: Option<String>,

    /// Filter by owner ID.
    #[serde(default)]
    pub owner_id: Option<String>,

    /// Free-text search (server-side).
    #[serde(default)]
    pub search: Option<String>,
}

impl ListProjectsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            status: trim_option(&self.status),
            owner_id: trim_option(&self.owner_id),
            search: trim_option(&self.search),
        }
    }
}

impl From<ListProjectsInput> for ProjectFilters {
    fn from(input: ListProjectsInput) -> Self {
        Self {
            status: input.status,
            owner_id: input.owner_id,
            search: input.search,
        }
    }
}

/// Input parameters for tools addressing one project.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProjectIdInput {
    /// The unique ID of the project.
    pub project_id: String,
}

impl ProjectIdInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            project_id: self.project_id.trim().to_string(),
        }
    }
}

/// Input parameters for the create_project tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateProjectInput {
    /// The project as a JSON object string, e.g. '{"name": "Datacenter move"}'.
    pub data: String,
}

/// Input parameters for the update_project tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateProjectInput {
    /// The unique ID of the project to update.
    pub project_id: String,

    /// Fields to update as a JSON object string.
    pub data: String,
}

impl UpdateProjectInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            project_id: self.project_id.trim().to_string(),
            data: self.data.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_change_requests_input_sanitize() {
        let input = ListChangeRequestsInput {
            status: Some("  open  ".to_string()),
            priority: Some("   ".to_string()),
            department: None,
            assignee_id: Some("u-1".to_string()),
            search: Some(String::new()),
        };
        let sanitized = input.sanitize();
        assert_eq!(sanitized.status.as_deref(), Some("open"));
        assert_eq!(sanitized.priority, None); // Whitespace-only becomes None
        assert_eq!(sanitized.assignee_id.as_deref(), Some("u-1"));
        assert_eq!(sanitized.search, None);
    }

    #[test]
    fn test_list_input_into_filters() {
        let input = ListProjectsInput {
            status: Some("active".to_string()),
            owner_id: None,
            search: None,
        };
        let filters: ProjectFilters = input.sanitize().into();
        assert_eq!(filters.to_query().get("status"), Some("active"));
        assert_eq!(filters.to_query().len(), 1);
    }

    #[test]
    fn test_id_inputs_trim() {
        let input = ChangeRequestIdInput {
            change_request_id: "  cr-1 ".to_string(),
        }
        .sanitize();
        assert_eq!(input.change_request_id, "cr-1");

        let input = SystemIdInput {
            system_id: "\t\n".to_string(),
        }
        .sanitize();
        assert!(input.system_id.is_empty());
    }

    #[test]
    fn test_review_input_blank_comment_becomes_none() {
        let input = ReviewChangeRequestInput {
            change_request_id: "cr-1".to_string(),
            comment: Some("  ".to_string()),
        }
        .sanitize();
        assert!(input.comment.is_none());
    }

    // ========================================================================
    // Deserialization tests
    // ========================================================================

    #[test]
    fn test_list_inputs_deserialize_empty() {
        let input: ListChangeRequestsInput = serde_json::from_str("{}").unwrap();
        assert!(input.status.is_none());
        let input: ListSystemsInput = serde_json::from_str("{}").unwrap();
        assert!(input.owner.is_none());
        let input: ListFeedbacksInput = serde_json::from_str("{}").unwrap();
        assert!(input.change_request_id.is_none());
        let input: ListProjectsInput = serde_json::from_str("{}").unwrap();
        assert!(input.owner_id.is_none());
    }

    #[test]
    fn test_update_input_deserialize() {
        let json = r#"{"feedback_id": "f-1", "data": "{\"rating\": 5}"}"#;
        let input: UpdateFeedbackInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.feedback_id, "f-1");
        assert_eq!(input.data, r#"{"rating": 5}"#);
    }

    #[test]
    fn test_add_comment_input_requires_comment() {
        let json = r#"{"change_request_id": "cr-1"}"#;
        assert!(serde_json::from_str::<AddCommentInput>(json).is_err());
    }

    #[test]
    fn test_analyze_change_input() {
        let input: AnalyzeChangeInput = serde_json::from_str(r#"{"query": " CR-1 "}"#).unwrap();
        assert_eq!(input.sanitize().query, "CR-1");
    }
}
