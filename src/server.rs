//! MCP server implementation for Change Analysis.
//!
//! This module defines the `ChangeAnalysisServer` struct that implements the
//! MCP `ServerHandler` trait, exposing Change Analysis API operations as tools.
//!
//! Every tool opens its own [`ServiceFactory`] scope, makes one call through
//! it and renders the outcome as a string. Tools never fail at the protocol
//! level: errors come back as text with the prefixes documented in
//! [`tools`](crate::tools).

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};

use crate::config::Config;
use crate::error::ChangeAnalysisError;
use crate::services::{
    ChangeRequestFilters, ChangeRequestsService, FeedbackFilters, ProjectFilters, ServiceFactory,
    Services, SystemFilters,
};
use crate::tools::{
    format_deleted, format_error, format_health_report, format_list, format_search,
    format_success, parse_document, to_json, AddCommentInput, AnalyzeChangeInput,
    ChangeRequestIdInput, CreateChangeRequestInput, CreateFeedbackInput, CreateProjectInput,
    CreateSystemInput, Entity, FeedbackIdInput, HealthStatus, ListChangeRequestsInput,
    ListFeedbacksInput, ListProjectsInput, ListSystemsInput, ProjectIdInput,
    ReviewChangeRequestInput, SystemIdInput, UpdateChangeRequestInput, UpdateFeedbackInput,
    UpdateProjectInput, UpdateSystemInput,
};

/// The Change Analysis MCP server.
#[derive(Clone)]
pub struct ChangeAnalysisServer {
    /// Process-wide configuration, read-only after startup.
    config: Arc<Config>,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

impl ChangeAnalysisServer {
    /// Runs `f` inside a fresh service factory scope.
    async fn scope<T, F, Fut>(&self, f: F) -> Result<T, ChangeAnalysisError>
    where
        F: FnOnce(Services) -> Fut,
        Fut: Future<Output = Result<T, ChangeAnalysisError>>,
    {
        ServiceFactory::scope(Arc::clone(&self.config), f).await
    }

    /// Logs a failure and renders it for the caller.
    fn fail(&self, action: &str, error: &ChangeAnalysisError) -> String {
        let sanitized = error.sanitized_display(self.config.api_key());
        if error.is_input_error() {
            tracing::warn!(error = %sanitized, action, "Rejected tool input");
        } else {
            tracing::error!(error = %sanitized, action, "Tool call failed");
        }
        format_error(action, error, self.config.api_key())
    }
}

#[tool_router]
impl ChangeAnalysisServer {
    /// Creates a new server instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// Returns the configuration the server was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========================================================================
    // Change requests
    // ========================================================================

    /// List change requests with optional filters.
    #[tool(description = "List change requests. Can filter by status, priority, department, assignee_id, or a server-side search term. Returns 'Found N change request(s): [...]' with the matching entries as JSON.")]
    async fn list_change_requests(
        &self,
        Parameters(input): Parameters<ListChangeRequestsInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "list_change_requests tool called");

        let filters = ChangeRequestFilters::from(input);
        let result = self
            .scope(|services| async move { services.change_requests.list(&filters).await })
            .await;

        match result {
            Ok(items) => format_list(Entity::ChangeRequest, &items),
            Err(e) => self.fail("listing change requests", &e),
        }
    }

    /// Get a single change request as raw JSON.
    #[tool(description = "Get full details of a single change request by ID. Returns the change request as raw JSON.")]
    async fn get_change_request(
        &self,
        Parameters(input): Parameters<ChangeRequestIdInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(change_request_id = %input.change_request_id, "get_change_request tool called");

        let id = input.change_request_id.as_str();
        let result = self
            .scope(|services| async move { services.change_requests.get(id).await })
            .await;

        match result {
            Ok(value) => to_json(&value),
            Err(e) => self.fail(&format!("getting change request '{}'", id), &e),
        }
    }

    /// Create a change request from a JSON object string.
    #[tool(description = "Create a new change request. 'data' is a JSON object string with the change request fields. Returns the created change request.")]
    async fn create_change_request(
        &self,
        Parameters(input): Parameters<CreateChangeRequestInput>,
    ) -> String {
        tracing::debug!("create_change_request tool called");
        let action = "creating change request";

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(action, &e),
        };

        let result = self
            .scope(|services| async move { services.change_requests.create(&data).await })
            .await;

        match result {
            Ok(created) => format_success("Change request created", &created),
            Err(e) => self.fail(action, &e),
        }
    }

    /// Update a change request.
    #[tool(description = "Update an existing change request. 'data' is a JSON object string containing only the fields to change. Change request ID is required.")]
    async fn update_change_request(
        &self,
        Parameters(input): Parameters<UpdateChangeRequestInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(change_request_id = %input.change_request_id, "update_change_request tool called");

        let id = input.change_request_id.as_str();
        let action = format!("updating change request '{}'", id);

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(&action, &e),
        };

        let result = self
            .scope(|services| async move { services.change_requests.update(id, &data).await })
            .await;

        match result {
            Ok(updated) => format_success(&format!("Change request {} updated", id), &updated),
            Err(e) => self.fail(&action, &e),
        }
    }

    /// Delete a change request.
    #[tool(description = "Delete a change request by ID. This cannot be undone.")]
    async fn delete_change_request(
        &self,
        Parameters(input): Parameters<ChangeRequestIdInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(change_request_id = %input.change_request_id, "delete_change_request tool called");

        let id = input.change_request_id.as_str();
        let result = self
            .scope(|services| async move { services.change_requests.delete(id).await })
            .await;

        match result {
            Ok(()) => format_deleted(Entity::ChangeRequest, id),
            Err(e) => self.fail(&format!("deleting change request '{}'", id), &e),
        }
    }

    /// Add a comment to a change request.
    #[tool(description = "Add a comment to a change request. 'comment' is a JSON object string, e.g. '{\"text\": \"Looks good\"}'. Change request ID is required.")]
    async fn add_change_request_comment(
        &self,
        Parameters(input): Parameters<AddCommentInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(change_request_id = %input.change_request_id, "add_change_request_comment tool called");

        let id = input.change_request_id.as_str();
        let action = format!("adding comment to change request '{}'", id);

        let comment = match parse_document("comment", &input.comment) {
            Ok(comment) => comment,
            Err(e) => return self.fail(&action, &e),
        };

        let result = self
            .scope(|services| async move { services.change_requests.add_comment(id, &comment).await })
            .await;

        match result {
            Ok(created) => {
                format_success(&format!("Comment added to change request {}", id), &created)
            }
            Err(e) => self.fail(&action, &e),
        }
    }

    /// Approve a change request.
    #[tool(description = "Approve a change request. An optional reviewer comment can be attached. Change request ID is required.")]
    async fn approve_change_request(
        &self,
        Parameters(input): Parameters<ReviewChangeRequestInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(change_request_id = %input.change_request_id, "approve_change_request tool called");

        let id = input.change_request_id.as_str();
        let comment = input.comment.as_deref();
        let result = self
            .scope(|services| async move { services.change_requests.approve(id, comment).await })
            .await;

        match result {
            Ok(updated) => format_success(&format!("Change request {} approved", id), &updated),
            Err(e) => self.fail(&format!("approving change request '{}'", id), &e),
        }
    }

    /// Reject a change request.
    #[tool(description = "Reject a change request. An optional reviewer comment can be attached. Change request ID is required.")]
    async fn reject_change_request(
        &self,
        Parameters(input): Parameters<ReviewChangeRequestInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(change_request_id = %input.change_request_id, "reject_change_request tool called");

        let id = input.change_request_id.as_str();
        let comment = input.comment.as_deref();
        let result = self
            .scope(|services| async move { services.change_requests.reject(id, comment).await })
            .await;

        match result {
            Ok(updated) => format_success(&format!("Change request {} rejected", id), &updated),
            Err(e) => self.fail(&format!("rejecting change request '{}'", id), &e),
        }
    }

    /// Keyword search over change requests.
    #[tool(description = "Search change requests by keyword. Matches the query case-insensitively against each change request's key, title, and description.")]
    async fn analyze_change(&self, Parameters(input): Parameters<AnalyzeChangeInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(query = %input.query, "analyze_change tool called");

        let query = input.query.as_str();
        let result = self
            .scope(|services| async move { services.change_requests.search(query).await })
            .await;

        match result {
            Ok(matches) => format_search(query, &matches),
            Err(e) => self.fail(&format!("searching for change '{}'", query), &e),
        }
    }

    // ========================================================================
    // Systems
    // ========================================================================

    /// List systems with optional filters.
    #[tool(description = "List systems. Can filter by status, criticality, owner, or a server-side search term.")]
    async fn list_systems(&self, Parameters(input): Parameters<ListSystemsInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "list_systems tool called");

        let filters = SystemFilters::from(input);
        let result = self
            .scope(|services| async move { services.systems.list(&filters).await })
            .await;

        match result {
            Ok(items) => format_list(Entity::System, &items),
            Err(e) => self.fail("listing systems", &e),
        }
    }

    /// Get a single system as raw JSON.
    #[tool(description = "Get full details of a single system by ID. Returns the system as raw JSON.")]
    async fn get_system(&self, Parameters(input): Parameters<SystemIdInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(system_id = %input.system_id, "get_system tool called");

        let id = input.system_id.as_str();
        let result = self
            .scope(|services| async move { services.systems.get(id).await })
            .await;

        match result {
            Ok(value) => to_json(&value),
            Err(e) => self.fail(&format!("getting system '{}'", id), &e),
        }
    }

    /// Register a system.
    #[tool(description = "Register a new system. 'data' is a JSON object string with the system fields. Returns the created system.")]
    async fn create_system(&self, Parameters(input): Parameters<CreateSystemInput>) -> String {
        tracing::debug!("create_system tool called");
        let action = "creating system";

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(action, &e),
        };

        let result = self
            .scope(|services| async move { services.systems.create(&data).await })
            .await;

        match result {
            Ok(created) => format_success("System created", &created),
            Err(e) => self.fail(action, &e),
        }
    }

    /// Update a system.
    #[tool(description = "Update an existing system. 'data' is a JSON object string containing only the fields to change. System ID is required.")]
    async fn update_system(&self, Parameters(input): Parameters<UpdateSystemInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(system_id = %input.system_id, "update_system tool called");

        let id = input.system_id.as_str();
        let action = format!("updating system '{}'", id);

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(&action, &e),
        };

        let result = self
            .scope(|services| async move { services.systems.update(id, &data).await })
            .await;

        match result {
            Ok(updated) => format_success(&format!("System {} updated", id), &updated),
            Err(e) => self.fail(&action, &e),
        }
    }

    /// Delete a system.
    #[tool(description = "Delete a system by ID. This cannot be undone.")]
    async fn delete_system(&self, Parameters(input): Parameters<SystemIdInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(system_id = %input.system_id, "delete_system tool called");

        let id = input.system_id.as_str();
        let result = self
            .scope(|services| async move { services.systems.delete(id).await })
            .await;

        match result {
            Ok(()) => format_deleted(Entity::System, id),
            Err(e) => self.fail(&format!("deleting system '{}'", id), &e),
        }
    }

    // ========================================================================
    // Feedbacks
    // ========================================================================

    /// List feedback entries with optional filters.
    #[tool(description = "List feedback entries. Can filter by change_request_id, system_id, status, or a server-side search term.")]
    async fn list_feedbacks(&self, Parameters(input): Parameters<ListFeedbacksInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "list_feedbacks tool called");

        let filters = FeedbackFilters::from(input);
        let result = self
            .scope(|services| async move { services.feedbacks.list(&filters).await })
            .await;

        match result {
            Ok(items) => format_list(Entity::Feedback, &items),
            Err(e) => self.fail("listing feedbacks", &e),
        }
    }

    /// Get a single feedback entry as raw JSON.
    #[tool(description = "Get a single feedback entry by ID. Returns the feedback as raw JSON.")]
    async fn get_feedback(&self, Parameters(input): Parameters<FeedbackIdInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(feedback_id = %input.feedback_id, "get_feedback tool called");

        let id = input.feedback_id.as_str();
        let result = self
            .scope(|services| async move { services.feedbacks.get(id).await })
            .await;

        match result {
            Ok(value) => to_json(&value),
            Err(e) => self.fail(&format!("getting feedback '{}'", id), &e),
        }
    }

    /// Record a feedback entry.
    #[tool(description = "Record new feedback. 'data' is a JSON object string with the feedback fields. Returns the created feedback.")]
    async fn create_feedback(&self, Parameters(input): Parameters<CreateFeedbackInput>) -> String {
        tracing::debug!("create_feedback tool called");
        let action = "creating feedback";

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(action, &e),
        };

        let result = self
            .scope(|services| async move { services.feedbacks.create(&data).await })
            .await;

        match result {
            Ok(created) => format_success("Feedback created", &created),
            Err(e) => self.fail(action, &e),
        }
    }

    /// Update a feedback entry.
    #[tool(description = "Update an existing feedback entry. 'data' is a JSON object string containing only the fields to change. Feedback ID is required.")]
    async fn update_feedback(&self, Parameters(input): Parameters<UpdateFeedbackInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(feedback_id = %input.feedback_id, "update_feedback tool called");

        let id = input.feedback_id.as_str();
        let action = format!("updating feedback '{}'", id);

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(&action, &e),
        };

        let result = self
            .scope(|services| async move { services.feedbacks.update(id, &data).await })
            .await;

        match result {
            Ok(updated) => format_success(&format!("Feedback {} updated", id), &updated),
            Err(e) => self.fail(&action, &e),
        }
    }

    /// Delete a feedback entry.
    #[tool(description = "Delete a feedback entry by ID. This cannot be undone.")]
    async fn delete_feedback(&self, Parameters(input): Parameters<FeedbackIdInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(feedback_id = %input.feedback_id, "delete_feedback tool called");

        let id = input.feedback_id.as_str();
        let result = self
            .scope(|services| async move { services.feedbacks.delete(id).await })
            .await;

        match result {
            Ok(()) => format_deleted(Entity::Feedback, id),
            Err(e) => self.fail(&format!("deleting feedback '{}'", id), &e),
        }
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// List projects with optional filters.
    #[tool(description = "List projects. Can filter by status, owner_id, or a server-side search term.")]
    async fn list_projects(&self, Parameters(input): Parameters<ListProjectsInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "list_projects tool called");

        let filters = ProjectFilters::from(input);
        let result = self
            .scope(|services| async move { services.projects.list(&filters).await })
            .await;

        match result {
            Ok(items) => format_list(Entity::Project, &items),
            Err(e) => self.fail("listing projects", &e),
        }
    }

    /// Get a single project as raw JSON.
    #[tool(description = "Get full details of a single project by ID. Returns the project as raw JSON.")]
    async fn get_project(&self, Parameters(input): Parameters<ProjectIdInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(project_id = %input.project_id, "get_project tool called");

        let id = input.project_id.as_str();
        let result = self
            .scope(|services| async move { services.projects.get(id).await })
            .await;

        match result {
            Ok(value) => to_json(&value),
            Err(e) => self.fail(&format!("getting project '{}'", id), &e),
        }
    }

    /// Create a project.
    #[tool(description = "Create a new project. 'data' is a JSON object string with the project fields. Returns the created project.")]
    async fn create_project(&self, Parameters(input): Parameters<CreateProjectInput>) -> String {
        tracing::debug!("create_project tool called");
        let action = "creating project";

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(action, &e),
        };

        let result = self
            .scope(|services| async move { services.projects.create(&data).await })
            .await;

        match result {
            Ok(created) => format_success("Project created", &created),
            Err(e) => self.fail(action, &e),
        }
    }

    /// Update a project.
    #[tool(description = "Update an existing project. 'data' is a JSON object string containing only the fields to change. Project ID is required.")]
    async fn update_project(&self, Parameters(input): Parameters<UpdateProjectInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(project_id = %input.project_id, "update_project tool called");

        let id = input.project_id.as_str();
        let action = format!("updating project '{}'", id);

        let data = match parse_document("data", &input.data) {
            Ok(data) => data,
            Err(e) => return self.fail(&action, &e),
        };

        let result = self
            .scope(|services| async move { services.projects.update(id, &data).await })
            .await;

        match result {
            Ok(updated) => format_success(&format!("Project {} updated", id), &updated),
            Err(e) => self.fail(&action, &e),
        }
    }

    /// Delete a project.
    #[tool(description = "Delete a project by ID. This cannot be undone.")]
    async fn delete_project(&self, Parameters(input): Parameters<ProjectIdInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(project_id = %input.project_id, "delete_project tool called");

        let id = input.project_id.as_str();
        let result = self
            .scope(|services| async move { services.projects.delete(id).await })
            .await;

        match result {
            Ok(()) => format_deleted(Entity::Project, id),
            Err(e) => self.fail(&format!("deleting project '{}'", id), &e),
        }
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Report backend reachability and the active configuration.
    ///
    /// Never fails; monitoring can poll it safely.
    #[tool(description = "Check connectivity to the Change Analysis API and report the active configuration (base URL, whether an API key is set, auth method, timeout).")]
    async fn health_check(&self) -> String {
        tracing::debug!("health_check tool called");

        let status = if !self.config.has_api_key() {
            HealthStatus::MissingApiKey
        } else {
            let probe = self
                .scope(|services| async move {
                    services.client().probe(ChangeRequestsService::PATH).await
                })
                .await;

            match probe {
                Ok(code) if code.is_success() => HealthStatus::Healthy(code),
                Ok(code) => HealthStatus::Degraded(code),
                Err(e) => {
                    let details = e.sanitized_display(self.config.api_key());
                    tracing::error!(error = %details, "Health check could not reach the API");
                    HealthStatus::Unreachable(details)
                }
            }
        };

        format_health_report(&self.config, &status)
    }
}

#[tool_handler]
impl ServerHandler for ChangeAnalysisServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Change Analysis exposes change requests, systems, feedbacks and projects. \
                 Use list_* tools to browse, get_* for one entry, and create_*/update_*/delete_* \
                 to modify. create/update tools take a 'data' argument holding a JSON object string. \
                 Use analyze_change to search change requests by keyword, and \
                 approve_change_request, reject_change_request or add_change_request_comment \
                 to review them. Start with 'health_check' to verify connectivity."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
