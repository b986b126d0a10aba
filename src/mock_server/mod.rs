//! Mock Hub API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Hub API
//! for integration and end-to-end testing. Unlike wiremock which mocks at the
//! HTTP level per-test, this server maintains state across requests, enabling
//! realistic workflow testing: authentication, paged lists, creating and
//! deleting projects, and the rapid scan upload and poll cycle.
//!
//! Resource hrefs it hands out are server-relative (`/api/projects/<id>`);
//! the client resolves them against its base URL.
//!
//! # Example
//!
//! ```ignore
//! use hubclient::mock_server::{MockServer, DEFAULT_API_TOKEN};
//! use hubclient::{HubClient, List, ListOptions, Project};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = HubClient::builder(server.url())
//!         .api_token(DEFAULT_API_TOKEN)
//!         .await
//!         .unwrap();
//!
//!     let projects = Project::list_all(&client, &(), ListOptions::default()).await.unwrap();
//!     assert_eq!(projects[0].name, "Test Project");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{Fixtures, DEFAULT_API_TOKEN};
pub use server::MockServer;
pub use state::{MockState, RapidScan};
