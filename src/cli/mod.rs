//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! hubclient binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{HubClient, HubError, Result};

/// Black Duck Hub command-line interface.
#[derive(Parser, Debug)]
#[command(name = "hubclient", about = "Black Duck Hub API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(flatten)]
    pub connection: Connection,

    #[command(subcommand)]
    pub command: Command,
}

/// Server address and credentials.
///
/// Credentials are tried in order: API token, bearer token, then username
/// and password.
#[derive(Args, Debug, Clone, Default)]
pub struct Connection {
    /// Base URL of the Hub.
    #[arg(long, env = "BLACKDUCK_URL", global = true)]
    pub url: Option<String>,

    /// API token to exchange for a bearer token.
    #[arg(long, env = "BLACKDUCK_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Pre-obtained bearer token.
    #[arg(long, env = "BLACKDUCK_BEARER_TOKEN", global = true, hide_env_values = true)]
    pub bearer_token: Option<String>,

    #[arg(long, env = "BLACKDUCK_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "BLACKDUCK_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "BLACKDUCK_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true, default_value = "false")]
    pub insecure: bool,
}

impl Connection {
    /// Build a client and authenticate with the first credential given.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ConfigMissing`] without a URL, or the login error.
    pub async fn connect(&self) -> Result<HubClient> {
        let url = self.url.as_deref().ok_or_else(|| {
            HubError::ConfigMissing("--url or BLACKDUCK_URL is required".to_string())
        })?;

        let mut builder = HubClient::builder(url).accept_invalid_certs(self.insecure);
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(token) = &self.api_token {
            return builder.api_token(token).await;
        }
        if let Some(token) = &self.bearer_token {
            return builder.bearer_token(token.clone()).await;
        }
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => builder.session_login(user, password).await,
            _ => builder.build(),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check server readiness and liveness (no credentials needed).
    Health,

    /// Show the server version.
    Version,

    /// Get a single entity by its URL.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity's URL (its `_meta.href`).
        href: String,
    },

    /// List entities with optional filtering and pagination.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// URL of the parent: a project for versions, a project version for
        /// BOM entries.
        #[arg(long)]
        parent: Option<String>,

        /// Number of items per page.
        #[arg(long)]
        limit: Option<u32>,

        /// Index of the first item.
        #[arg(long)]
        offset: Option<u32>,

        /// Filter expression, e.g. `name:my-project`.
        #[arg(long)]
        q: Option<String>,

        /// Sort expression, e.g. `name asc`.
        #[arg(long)]
        sort: Option<String>,

        /// Fetch every page instead of one.
        #[arg(long, default_value = "false")]
        all: bool,
    },

    /// Count the items behind a list URL.
    Count {
        /// List URL, absolute or relative to the server (e.g. `/api/projects`).
        url: String,
    },

    /// Run a rapid scan from BDIO files and print the results.
    RapidScan(RapidScanArgs),
}

#[derive(Args, Debug)]
pub struct RapidScanArgs {
    /// BDIO header document.
    pub header: PathBuf,

    /// BDIO chunk documents, uploaded in order.
    #[arg(required = true)]
    pub chunks: Vec<PathBuf>,

    /// Seconds between result polls.
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// Give up waiting for results after this many seconds.
    #[arg(long, default_value = "300")]
    pub wait_secs: u64,
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A Hub project.
    #[value(alias = "projects")]
    Project,
    /// A project version.
    #[value(alias = "versions")]
    Version,
    /// A bill of materials entry of a project version.
    #[value(alias = "components", alias = "bom")]
    Component,
    /// A BOM entry with a vulnerability.
    #[value(alias = "vulnerable-components")]
    VulnerableComponent,
    /// A policy rule.
    #[value(alias = "policy-rules", alias = "policies")]
    PolicyRule,
    /// A user account.
    #[value(alias = "users")]
    User,
    /// An API token of the current user.
    #[value(alias = "api-tokens", alias = "tokens")]
    ApiToken,
    /// A vulnerability record.
    #[value(alias = "vulnerabilities")]
    Vulnerability,
    /// A scanned source tree mapped to a project version.
    #[value(alias = "code-locations", alias = "codelocations")]
    CodeLocation,
    /// One scan of a code location.
    #[value(alias = "scans", alias = "scan-summaries")]
    ScanSummary,
}
