//! Mock Hub API server.
//!
//! Provides an axum-based HTTP server that simulates the Hub API.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// A mock Hub API server for testing.
///
/// The server runs in the background and can be used to test the Hub client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with the default scenario.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server with empty state and no authentication.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Authentication
            .route("/api/tokens/authenticate", post(handlers::authenticate))
            .route("/j_spring_security_check", post(handlers::login))
            // Projects and versions
            .route(
                "/api/projects",
                get(handlers::list_projects).post(handlers::create_project),
            )
            .route(
                "/api/projects/:id",
                get(handlers::get_project)
                    .put(handlers::update_project)
                    .delete(handlers::delete_project),
            )
            .route(
                "/api/projects/:id/versions",
                get(handlers::list_versions).post(handlers::create_version),
            )
            .route("/api/projects/:id/versions/:version_id", get(handlers::get_version))
            .route(
                "/api/projects/:id/versions/:version_id/components",
                get(handlers::list_bom_components),
            )
            .route(
                "/api/projects/:id/versions/:version_id/vulnerable-bom-components",
                get(handlers::list_vulnerable_components),
            )
            .route(
                "/api/projects/:id/versions/:version_id/codelocations",
                get(handlers::list_version_code_locations),
            )
            .route("/api/codelocations/:id", get(handlers::get_code_location))
            .route("/api/policy-rules", get(handlers::list_policy_rules))
            // Rapid scans
            .route("/api/developer-scans", post(handlers::start_scan))
            .route("/api/developer-scans/:id", put(handlers::upload_chunk))
            .route(
                "/api/developer-scans/:id/full-result",
                get(handlers::full_result),
            )
            // Status
            .route("/api/health-checks/readiness", get(handlers::readiness))
            .route("/api/health-checks/liveness", get(handlers::liveness))
            .route("/api/current-version", get(handlers::current_version))
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::fixtures::DEFAULT_API_TOKEN;
    use crate::{Get, HubClient, List, ListOptions, Project};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/api/health-checks/liveness", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_projects_with_hub_client() {
        let server = MockServer::start().await;
        let client = HubClient::builder(server.url())
            .api_token(DEFAULT_API_TOKEN)
            .await
            .unwrap();

        let page = Project::list_page(&client, &(), &ListOptions::first_page())
            .await
            .expect("Failed to list projects");

        assert_eq!(page.total_count, 2);
        assert_eq!(page.items[0].name, "Test Project");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_requests_without_credentials_are_rejected() {
        let server = MockServer::start().await;
        let client = HubClient::builder(server.url()).build().unwrap();

        let err = Project::list_page(&client, &(), &ListOptions::first_page())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(401));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new().with_project(crate::ProjectRequest::new("My Custom Project"));

        let server = MockServer::with_state(state).await;
        let client = HubClient::builder(server.url()).build().unwrap();

        let projects = Project::list_all(&client, &(), ListOptions::default()).await.unwrap();
        assert_eq!(projects.len(), 1);

        let project = Project::get_href(&client, &projects[0].meta.href).await.unwrap();
        assert_eq!(project.name, "My Custom Project");

        server.shutdown().await;
    }
}
