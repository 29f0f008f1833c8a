//! Scoped owner of one API client and the four domain services.
//!
//! A `ServiceFactory` is inert until `enter()`: that opens the client and
//! builds every service around it. `exit()` (or dropping the factory) tears
//! them down again and closes the connection. Service access outside that
//! window fails with `ChangeAnalysisError::NotInitialized`.

use std::future::Future;
use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::error::ChangeAnalysisError;

use super::{ChangeRequestsService, FeedbacksService, ProjectsService, SystemsService};

/// The four domain services bound to one shared client.
#[derive(Clone)]
pub struct Services {
    client: Arc<ApiClient>,
    /// Change request operations.
    pub change_requests: ChangeRequestsService,
    /// System operations.
    pub systems: SystemsService,
    /// Feedback operations.
    pub feedbacks: FeedbacksService,
    /// Project operations.
    pub projects: ProjectsService,
}

impl Services {
    fn new(client: Arc<ApiClient>) -> Self {
        Self {
            change_requests: ChangeRequestsService::new(Arc::clone(&client)),
            systems: SystemsService::new(Arc::clone(&client)),
            feedbacks: FeedbacksService::new(Arc::clone(&client)),
            projects: ProjectsService::new(Arc::clone(&client)),
            client,
        }
    }

    /// The client every service in this set shares.
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Drops the services and hands back the client.
    fn into_client(self) -> Arc<ApiClient> {
        self.client
    }
}

/// Scoped factory for domain services.
///
/// # Example
///
/// ```ignore
/// let items = ServiceFactory::scope(config, |services| async move {
///     services.systems.list(&SystemFilters::default()).await
/// })
/// .await?;
/// ```
pub struct ServiceFactory {
    config: Arc<Config>,
    services: Option<Services>,
}

impl ServiceFactory {
    /// Creates a factory that has not been entered yet.
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            services: None,
        }
    }

    /// Opens the client and constructs the services. Re-entering is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built from the configuration.
    pub fn enter(&mut self) -> Result<&Services, ChangeAnalysisError> {
        if self.services.is_none() {
            let mut client = ApiClient::new(&self.config)?;
            client.open()?;
            self.services = Some(Services::new(Arc::new(client)));
        }
        self.services()
    }

    /// Drops the services and closes the client.
    pub fn exit(&mut self) {
        let Some(services) = self.services.take() else {
            return;
        };

        match Arc::try_unwrap(services.into_client()) {
            Ok(mut client) => client.close(),
            Err(shared) => {
                // Outstanding clones keep the pool alive until they drop.
                tracing::warn!(
                    handles = Arc::strong_count(&shared) - 1,
                    "API client still referenced at scope exit"
                );
            }
        }
    }

    /// Returns true between `enter()` and `exit()`.
    pub fn is_active(&self) -> bool {
        self.services.is_some()
    }

    /// Returns the full service set.
    pub fn services(&self) -> Result<&Services, ChangeAnalysisError> {
        self.services
            .as_ref()
            .ok_or(ChangeAnalysisError::NotInitialized("service factory"))
    }

    /// Returns the change request service.
    pub fn change_requests(&self) -> Result<&ChangeRequestsService, ChangeAnalysisError> {
        Ok(&self.services()?.change_requests)
    }

    /// Returns the system service.
    pub fn systems(&self) -> Result<&SystemsService, ChangeAnalysisError> {
        Ok(&self.services()?.systems)
    }

    /// Returns the feedback service.
    pub fn feedbacks(&self) -> Result<&FeedbacksService, ChangeAnalysisError> {
        Ok(&self.services()?.feedbacks)
    }

    /// Returns the project service.
    pub fn projects(&self) -> Result<&ProjectsService, ChangeAnalysisError> {
        Ok(&self.services()?.projects)
    }

    /// Runs `f` inside a fresh factory scope.
    ///
    /// The scope is exited once `f` completes, whether it succeeded or not.
    pub async fn scope<T, F, Fut>(config: Arc<Config>, f: F) -> Result<T, ChangeAnalysisError>
    where
        F: FnOnce(Services) -> Fut,
        Fut: Future<Output = Result<T, ChangeAnalysisError>>,
    {
        let mut factory = ServiceFactory::new(config);
        let services = factory.enter()?.clone();
        let result = f(services).await;
        factory.exit();
        result
    }
}

impl Drop for ServiceFactory {
    fn drop(&mut self) {
        self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SystemFilters;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> Arc<Config> {
        Arc::new(Config::new("http://127.0.0.1:1"))
    }

    #[test]
    fn test_access_before_enter_fails() {
        let factory = ServiceFactory::new(config());
        assert!(!factory.is_active());
        assert!(matches!(
            factory.change_requests().err(),
            Some(ChangeAnalysisError::NotInitialized(_))
        ));
        assert!(factory.systems().is_err());
        assert!(factory.feedbacks().is_err());
        assert!(factory.projects().is_err());
    }

    #[test]
    fn test_access_after_exit_fails() {
        let mut factory = ServiceFactory::new(config());
        factory.enter().unwrap();
        assert!(factory.is_active());
        assert!(factory.services().unwrap().client().is_open());

        factory.exit();
        assert!(!factory.is_active());
        assert!(matches!(
            factory.projects().err(),
            Some(ChangeAnalysisError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_services_share_one_client_and_are_stable() {
        let mut factory = ServiceFactory::new(config());
        factory.enter().unwrap();

        let first = factory.change_requests().unwrap();
        let second = factory.change_requests().unwrap();
        assert!(std::ptr::eq(first, second));

        let client = factory.services().unwrap().client();
        assert_eq!(Arc::strong_count(client), 5);
    }

    #[test]
    fn test_exit_releases_client() {
        let mut factory = ServiceFactory::new(config());
        let weak = Arc::downgrade(factory.enter().unwrap().client());
        assert!(weak.upgrade().is_some());

        factory.exit();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_drop_releases_client() {
        let mut factory = ServiceFactory::new(config());
        let weak = Arc::downgrade(factory.enter().unwrap().client());
        drop(factory);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_scope_releases_client_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let config = Arc::new(Config::new(server.uri()));
        let (weak, items) = ServiceFactory::scope(config, |services| async move {
            let weak = Arc::downgrade(services.client());
            let items = services.systems.list(&SystemFilters::default()).await?;
            Ok((weak, items))
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_scope_releases_client_on_error() {
        let mut captured = None;
        let result = ServiceFactory::scope(config(), |services| {
            captured = Some(Arc::downgrade(services.client()));
            async move { services.projects.get("p1").await }
        })
        .await;

        assert!(result.unwrap_err().is_transport());
        assert!(captured.unwrap().upgrade().is_none());
    }
}
