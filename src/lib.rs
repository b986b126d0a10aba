//! Black Duck Hub API client library.
//!
//! A Rust library for the Hub REST API using a trait-based architecture
//! where each operation (Get, List, Create, Update, Delete) is a trait that
//! entity types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use hubclient::{HubClient, List, ListOptions, Project, ProjectVersion};
//!
//! #[tokio::main]
//! async fn main() -> hubclient::Result<()> {
//!     // Create client from environment variables
//!     let client = HubClient::from_env().await?;
//!
//!     // Walk every project and its versions
//!     let projects = Project::list_all(&client, &(), ListOptions::default()).await?;
//!     for project in &projects {
//!         let versions = ProjectVersion::list_all(&client, project, ListOptions::default()).await?;
//!         println!("{}: {} versions", project.name, versions.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`HubClient`] is the transport: headers, authentication, status checks
//!   and JSON encoding.
//! - [`Get`], [`List`], [`Create`], [`Update`] and [`Delete`] are implemented
//!   by the model types the Hub supports them for.
//! - Resources link to each other through `_meta.links`; see [`Meta`].
//! - [`rapid_scan`] implements the chunked upload and result polling flow.
//!
//! # Configuration
//!
//! [`HubClient::from_env`] reads:
//!
//! - `BLACKDUCK_URL` (required) - Base URL of the Hub
//! - `BLACKDUCK_API_TOKEN`, `BLACKDUCK_BEARER_TOKEN` or
//!   `BLACKDUCK_USERNAME` + `BLACKDUCK_PASSWORD` - credentials, first found wins
//! - `BLACKDUCK_TIMEOUT_SECS` (optional) - request timeout

mod auth;
mod client;
mod error;
mod links;
pub mod mime;
mod models;
mod pagination;
pub mod rapid_scan;
mod traits;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use auth::{AuthMode, AuthStatus, BearerTokenResponse, AUTHENTICATE_PATH, LOGIN_PATH};
pub use client::{DebugFlags, HubClient, HubClientBuilder, CSRF_HEADER};
pub use error::{HubError, Result, ResultExt, ServerErrorBody};
pub use links::{HasMeta, Meta, ResourceLink};
pub use output::PrettyPrint;
pub use pagination::{ItemList, ListOptions, TotalCount, DEFAULT_LIMIT};
pub use rapid_scan::PollConfig;

// Re-export traits
pub use traits::{delete_href, Create, Delete, Get, List, Update};

// Re-export models
pub use models::*;

// Cancellation handle accepted by the polling APIs.
pub use tokio_util::sync::CancellationToken;
