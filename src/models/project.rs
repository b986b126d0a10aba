//! Project and project version models and trait implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta, ResourceLink};
use crate::mime::{declare_content_type, BILL_OF_MATERIALS_V6, PROJECT_DETAIL_V4, PROJECT_DETAIL_V5};
use crate::traits::{Create, Delete, Get, List, Update};

/// Path of the project collection.
pub const PROJECTS_PATH: &str = "/api/projects";

/// Lifecycle phase of a project version.
pub mod phase {
    pub const PLANNING: &str = "PLANNING";
    pub const DEVELOPMENT: &str = "DEVELOPMENT";
    pub const RELEASED: &str = "RELEASED";
    pub const DEPRECATED: &str = "DEPRECATED";
    pub const ARCHIVED: &str = "ARCHIVED";
}

/// How a project version is distributed.
pub mod distribution {
    pub const EXTERNAL: &str = "EXTERNAL";
    pub const SAAS: &str = "SAAS";
    pub const INTERNAL: &str = "INTERNAL";
    pub const OPEN_SOURCE: &str = "OPENSOURCE";
}

/// A Hub project.
///
/// Projects group versions; each version carries its own bill of materials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// The project name (unique on the server).
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Where the project came from, e.g. `CUSTOM`.
    #[serde(default)]
    pub source: Option<String>,

    /// Business criticality, 1 (highest) to 5.
    #[serde(default)]
    pub project_tier: Option<u32>,

    /// Whether BOM adjustments apply to this project only.
    #[serde(default)]
    pub project_level_adjustments: bool,

    /// URL of the owning user.
    #[serde(default)]
    pub project_owner: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl Project {
    /// Link to this project's versions.
    pub fn versions_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("versions")
    }

    /// Link to the users assigned to this project.
    pub fn users_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("users")
    }

    /// Find a version by name.
    ///
    /// Returns `None` when the project has no version with that name.
    ///
    /// # Errors
    ///
    /// Returns an error if listing versions fails.
    pub async fn find_version(&self, client: &HubClient, name: &str) -> Result<Option<ProjectVersion>> {
        let options = crate::ListOptions::first_page().with_query(format!("versionName:{name}"));
        let page = ProjectVersion::list_page(client, self, &options).await?;
        Ok(page.into_iter().find(|v| v.version_name == name))
    }
}

/// Body for creating or updating a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_tier: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_owner: Option<String>,

    #[serde(default)]
    pub project_level_adjustments: bool,

    /// Create a first version together with the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_request: Option<ProjectVersionRequest>,
}

impl ProjectRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A version of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    pub version_name: String,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub release_comments: Option<String>,

    #[serde(default)]
    pub released_on: Option<DateTime<Utc>>,

    /// See [`phase`].
    #[serde(default)]
    pub phase: String,

    /// See [`distribution`].
    #[serde(default)]
    pub distribution: String,

    #[serde(default)]
    pub license: Option<crate::models::ComplexLicense>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl ProjectVersion {
    pub fn project_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("project")
    }

    pub fn code_locations_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("codelocations")
    }

    /// Link to the version's bill of materials.
    pub fn components_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("components")
    }

    pub fn vulnerable_components_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("vulnerable-components")
    }

    pub fn risk_profile_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("riskProfile")
    }

    pub fn policy_status_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("policy-status")
    }

    /// Fetch the version's risk profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the version has no risk profile link or the
    /// request fails.
    pub async fn risk_profile(&self, client: &HubClient) -> Result<ProjectVersionRiskProfile> {
        let link = self.risk_profile_link()?;
        ProjectVersionRiskProfile::get(client, link)
            .await
            .context("error trying to retrieve project version risk profile")
    }

    /// Fetch the version's policy status.
    ///
    /// # Errors
    ///
    /// Returns an error if the version has no policy status link or the
    /// request fails.
    pub async fn policy_status(&self, client: &HubClient) -> Result<ProjectVersionPolicyStatus> {
        let link = self.policy_status_link()?;
        ProjectVersionPolicyStatus::get(client, link)
            .await
            .context("error trying to retrieve project version policy status")
    }
}

/// Body for creating or updating a project version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersionRequest {
    pub version_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_comments: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_on: Option<DateTime<Utc>>,

    pub phase: String,

    pub distribution: String,
}

impl ProjectVersionRequest {
    /// A request for a version in development, distributed externally.
    pub fn new(version_name: impl Into<String>) -> Self {
        Self {
            version_name: version_name.into(),
            phase: phase::DEVELOPMENT.to_string(),
            distribution: distribution::EXTERNAL.to_string(),
            ..Default::default()
        }
    }
}

/// Risk counts per category (`VULNERABILITY`, `LICENSE`, ...) and level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersionRiskProfile {
    #[serde(default)]
    pub categories: BTreeMap<String, BTreeMap<String, u64>>,

    #[serde(default)]
    pub bom_last_updated_at: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl ProjectVersionRiskProfile {
    /// Count for one category and level, e.g. (`VULNERABILITY`, `HIGH`).
    pub fn count(&self, category: &str, level: &str) -> u64 {
        self.categories
            .get(category)
            .and_then(|levels| levels.get(level))
            .copied()
            .unwrap_or(0)
    }
}

/// Overall policy evaluation for a project version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersionPolicyStatus {
    /// `IN_VIOLATION`, `NOT_IN_VIOLATION` or `IN_VIOLATION_OVERRIDDEN`.
    pub overall_status: String,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(rename = "componentVersionStatusCounts", default)]
    pub status_counts: Vec<StatusCount>,

    #[serde(rename = "componentVersionPolicyViolationDetails", default)]
    pub policy_violation_details: Option<PolicyViolationDetail>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolationDetail {
    pub name: String,
    #[serde(default)]
    pub severity_levels: Vec<StatusCount>,
}

declare_content_type!(
    Project => PROJECT_DETAIL_V4,
    ProjectVersion => PROJECT_DETAIL_V5,
    ProjectVersionRiskProfile => BILL_OF_MATERIALS_V6,
    ProjectVersionPolicyStatus => BILL_OF_MATERIALS_V6,
);

impl HasMeta for Project {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ProjectVersion {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ProjectVersionRiskProfile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ProjectVersionPolicyStatus {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for Project {}
impl Get for ProjectVersion {}
impl Get for ProjectVersionRiskProfile {}
impl Get for ProjectVersionPolicyStatus {}

impl List for Project {
    type Parent = ();

    fn collection_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(PROJECTS_PATH))
    }
}

impl List for ProjectVersion {
    type Parent = Project;

    fn collection_url(_client: &HubClient, project: &Project) -> Result<String> {
        Ok(project.versions_link()?.href.clone())
    }
}

impl Create for Project {
    type Request = ProjectRequest;
    type Parent = ();

    fn create_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(PROJECTS_PATH))
    }
}

impl Create for ProjectVersion {
    type Request = ProjectVersionRequest;
    type Parent = Project;

    fn create_url(_client: &HubClient, project: &Project) -> Result<String> {
        Ok(project.versions_link()?.href.clone())
    }
}

impl Update for Project {
    type Request = ProjectRequest;
}

impl Update for ProjectVersion {
    type Request = ProjectVersionRequest;
}

impl Delete for Project {}
impl Delete for ProjectVersion {}
