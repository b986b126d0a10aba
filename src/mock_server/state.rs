//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Hub server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    BomComponent, BomVulnerableComponent, CodeLocation, Meta, PolicyRule, Project, ProjectRequest, ProjectVersion,
    ProjectVersionRequest, RapidScanComponent, ResourceLink,
};

/// A rapid scan in progress on the mock server.
#[derive(Debug, Clone, Default)]
pub struct RapidScan {
    /// The BDIO header document that started the scan.
    pub header: String,
    /// Chunks received with `X-BD-MODE: append`, in order.
    pub chunks: Vec<String>,
    /// Chunk count announced by `X-BD-DOCUMENT-COUNT`.
    pub announced_count: Option<usize>,
    /// Set once `X-BD-MODE: finish` arrives.
    pub finished: bool,
    /// Result polls answered so far.
    pub polls: u32,
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Projects indexed by id, in creation order.
    pub projects: BTreeMap<String, Project>,

    /// Versions indexed by project id.
    pub versions: HashMap<String, Vec<ProjectVersion>>,

    /// BOM entries indexed by version id.
    pub bom: HashMap<String, Vec<BomComponent>>,

    /// Vulnerable BOM entries indexed by version id.
    pub vulnerable_bom: HashMap<String, Vec<BomVulnerableComponent>>,

    pub policy_rules: Vec<PolicyRule>,

    /// Code locations indexed by id.
    pub code_locations: BTreeMap<String, CodeLocation>,

    /// API token accepted by `/api/tokens/authenticate`.
    pub api_token: Option<String>,

    /// Username and password accepted by the login form.
    pub login: Option<(String, String)>,

    /// When set, API requests need a bearer token or session cookie issued
    /// by this server.
    pub require_auth: bool,

    /// Bearer tokens and session ids handed out so far.
    pub issued_tokens: HashSet<String>,

    /// CSRF token returned with every successful authentication.
    pub csrf_token: String,

    /// Rapid scans indexed by id.
    pub rapid_scans: HashMap<String, RapidScan>,

    /// Components every finished rapid scan reports.
    pub rapid_scan_results: Vec<RapidScanComponent>,

    /// Result polls answered 404 before a finished scan reports results.
    pub rapid_scan_ready_after: u32,

    /// Reported by the readiness and liveness probes.
    pub healthy: bool,

    pub version: String,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            csrf_token: "mock-csrf-token".to_string(),
            healthy: true,
            version: "2024.1.0".to_string(),
            ..Self::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Accept `token` for the API token exchange and require authentication.
    pub fn with_api_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self.require_auth = true;
        self
    }

    /// Accept these credentials on the login form and require authentication.
    pub fn with_login(mut self, username: &str, password: &str) -> Self {
        self.login = Some((username.to_string(), password.to_string()));
        self.require_auth = true;
        self
    }

    /// Add a project to the state.
    pub fn with_project(mut self, request: ProjectRequest) -> Self {
        self.create_project(request);
        self
    }

    /// Set the components rapid scans report, and how many polls to 404 first.
    pub fn with_rapid_scan_results(mut self, results: Vec<RapidScanComponent>, ready_after: u32) -> Self {
        self.rapid_scan_results = results;
        self.rapid_scan_ready_after = ready_after;
        self
    }

    pub fn with_policy_rule(mut self, rule: PolicyRule) -> Self {
        self.policy_rules.push(rule);
        self
    }

    /// Hand out a fresh id.
    pub fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:08x}-0000-4000-8000-{:012x}", self.next_id, self.next_id)
    }

    /// Issue a new bearer token or session id.
    pub fn issue_token(&mut self, prefix: &str) -> String {
        let token = format!("{prefix}-{}", self.next_id());
        self.issued_tokens.insert(token.clone());
        token
    }

    /// Whether `token` was issued by this server.
    pub fn is_issued(&self, token: &str) -> bool {
        self.issued_tokens.contains(token)
    }

    /// Get a project by id.
    pub fn get_project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    /// List projects, optionally filtered by a `name:<text>` query.
    pub fn list_projects(&self, q: Option<&str>) -> Vec<&Project> {
        let name_filter = q
            .and_then(|q| q.strip_prefix("name:"))
            .map(str::to_lowercase);
        self.projects
            .values()
            .filter(|p| {
                name_filter
                    .as_ref()
                    .map(|n| p.name.to_lowercase().contains(n))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Create a project (and its first version, if requested); returns its id.
    pub fn create_project(&mut self, request: ProjectRequest) -> String {
        let id = self.next_id();
        let href = format!("/api/projects/{id}");
        let project = Project {
            name: request.name,
            description: request.description,
            source: Some("CUSTOM".to_string()),
            project_tier: request.project_tier,
            project_level_adjustments: request.project_level_adjustments,
            project_owner: request.project_owner,
            created_at: Some(chrono::Utc::now()),
            updated_at: None,
            meta: meta(
                &href,
                &[("versions", format!("{href}/versions")), ("users", format!("{href}/users"))],
            ),
        };
        self.projects.insert(id.clone(), project);
        self.versions.insert(id.clone(), Vec::new());

        if let Some(version) = request.version_request {
            self.create_version(&id, version);
        }
        id
    }

    /// Replace a project's editable fields.
    pub fn update_project(&mut self, id: &str, request: ProjectRequest) -> bool {
        match self.projects.get_mut(id) {
            Some(project) => {
                project.name = request.name;
                project.description = request.description;
                project.project_tier = request.project_tier;
                project.project_level_adjustments = request.project_level_adjustments;
                project.updated_at = Some(chrono::Utc::now());
                true
            }
            None => false,
        }
    }

    /// Remove a project and everything under it.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let removed = self.projects.remove(id).is_some();
        for version in self.versions.remove(id).unwrap_or_default() {
            let version_id = last_segment(&version.meta.href).to_string();
            self.bom.remove(&version_id);
            self.vulnerable_bom.remove(&version_id);
        }
        removed
    }

    /// Create a version under a project; returns its id.
    pub fn create_version(&mut self, project_id: &str, request: ProjectVersionRequest) -> Option<String> {
        if !self.projects.contains_key(project_id) {
            return None;
        }

        let id = self.next_id();
        let project_href = format!("/api/projects/{project_id}");
        let href = format!("{project_href}/versions/{id}");
        let version = ProjectVersion {
            version_name: request.version_name,
            nickname: request.nickname,
            release_comments: request.release_comments,
            released_on: request.released_on,
            phase: request.phase,
            distribution: request.distribution,
            license: None,
            meta: meta(
                &href,
                &[
                    ("project", project_href),
                    ("components", format!("{href}/components")),
                    ("vulnerable-components", format!("{href}/vulnerable-bom-components")),
                    ("riskProfile", format!("{href}/risk-profile")),
                    ("policy-status", format!("{href}/policy-status")),
                    ("codelocations", format!("{href}/codelocations")),
                ],
            ),
        };
        self.versions.entry(project_id.to_string()).or_default().push(version);
        self.bom.insert(id.clone(), Vec::new());
        self.vulnerable_bom.insert(id.clone(), Vec::new());
        Some(id)
    }

    /// Get a version by project and version id.
    pub fn get_version(&self, project_id: &str, version_id: &str) -> Option<&ProjectVersion> {
        self.versions
            .get(project_id)?
            .iter()
            .find(|v| last_segment(&v.meta.href) == version_id)
    }

    /// Replace the BOM of a version.
    pub fn set_bom(&mut self, version_id: &str, components: Vec<BomComponent>) {
        self.bom.insert(version_id.to_string(), components);
    }

    /// Replace the vulnerable BOM entries of a version.
    pub fn set_vulnerable_bom(&mut self, version_id: &str, components: Vec<BomVulnerableComponent>) {
        self.vulnerable_bom.insert(version_id.to_string(), components);
    }

    /// Add a code location mapped to the version at `version_href`; returns its id.
    pub fn map_code_location(&mut self, name: &str, version_href: &str) -> String {
        let id = self.next_id();
        let href = format!("/api/codelocations/{id}");
        self.code_locations.insert(
            id.clone(),
            CodeLocation {
                name: name.to_string(),
                mapped_project_version: Some(version_href.to_string()),
                meta: meta(&href, &[("scans", format!("{href}/scan-summaries"))]),
                ..CodeLocation::default()
            },
        );
        id
    }

    /// Code locations mapped to the version at `version_href`.
    pub fn code_locations_for(&self, version_href: &str) -> Vec<CodeLocation> {
        self.code_locations
            .values()
            .filter(|c| c.mapped_project_version.as_deref() == Some(version_href))
            .cloned()
            .collect()
    }

    /// Start a rapid scan; returns its id.
    pub fn start_rapid_scan(&mut self, header: String) -> String {
        let id = self.next_id();
        self.rapid_scans.insert(
            id.clone(),
            RapidScan {
                header,
                ..RapidScan::default()
            },
        );
        id
    }
}

/// Build a `_meta` block with the usual GET/PUT/DELETE allow list.
pub(crate) fn meta(href: &str, links: &[(&str, String)]) -> Meta {
    Meta {
        allow: vec!["GET".to_string(), "PUT".to_string(), "DELETE".to_string()],
        href: href.to_string(),
        links: links
            .iter()
            .map(|(rel, href)| ResourceLink {
                rel: (*rel).to_string(),
                ..ResourceLink::new(href.clone())
            })
            .collect(),
    }
}

fn last_segment(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_add_and_get_project() {
        let state = MockState::new().with_project(ProjectRequest::new("Test Project"));

        let (id, project) = state.projects.iter().next().unwrap();
        assert_eq!(project.name, "Test Project");
        assert_eq!(project.meta.href, format!("/api/projects/{id}"));
        assert_eq!(
            project.versions_link().unwrap().href,
            format!("/api/projects/{id}/versions")
        );
    }

    #[test]
    fn test_state_list_projects_with_filter() {
        let state = MockState::new()
            .with_project(ProjectRequest::new("Alpha Project"))
            .with_project(ProjectRequest::new("Beta Project"))
            .with_project(ProjectRequest::new("Gamma Test"));

        assert_eq!(state.list_projects(None).len(), 3);
        assert_eq!(state.list_projects(Some("name:project")).len(), 2);
        assert_eq!(state.list_projects(Some("name:gamma")).len(), 1);
    }

    #[test]
    fn test_state_versions_and_delete() {
        let mut state = MockState::new();
        let project_id = state.create_project(ProjectRequest {
            version_request: Some(ProjectVersionRequest::new("1.0")),
            ..ProjectRequest::new("demo")
        });
        let version_id = state.create_version(&project_id, ProjectVersionRequest::new("2.0")).unwrap();

        assert_eq!(state.versions[&project_id].len(), 2);
        let version = state.get_version(&project_id, &version_id).unwrap();
        assert_eq!(version.version_name, "2.0");
        assert!(version.components_link().is_ok());

        assert!(state.delete_project(&project_id));
        assert!(state.get_project(&project_id).is_none());
        assert!(!state.bom.contains_key(&version_id));
        assert!(state.create_version(&project_id, ProjectVersionRequest::new("3.0")).is_none());
    }

    #[test]
    fn test_code_locations_filtered_by_version() {
        let mut state = MockState::new();
        state.map_code_location("app/scan", "/api/projects/1/versions/2");
        state.map_code_location("other/scan", "/api/projects/1/versions/3");

        let mapped = state.code_locations_for("/api/projects/1/versions/2");
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].name, "app/scan");
        assert!(mapped[0].scans_link().unwrap().href.ends_with("/scan-summaries"));
    }
}
