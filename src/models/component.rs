//! Component catalog models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta, ResourceLink};
use crate::mime::{declare_content_type, COMPONENT_DETAIL_V4, COMPONENT_DETAIL_V5};
use crate::pagination::{ItemList, ListOptions};
use crate::traits::{Create, Delete, Get, List};

use super::ComplexLicense;

/// Path of the component catalog.
pub const COMPONENTS_PATH: &str = "/api/components";

/// A component in the Hub's knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub approval_status: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub additional_homepages: Vec<String>,

    #[serde(default)]
    pub primary_language: Option<String>,

    /// `KB` for knowledge-base components, `CUSTOM` otherwise.
    #[serde(default)]
    pub source: Option<String>,

    #[serde(rename = "type", default)]
    pub component_type: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl Component {
    pub fn versions_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("versions")
    }
}

/// Body for creating a custom component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_homepages: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One match of a component search: a component, one of its versions and
/// the origin (package coordinates) that identified it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentVariant {
    #[serde(default)]
    pub component_name: String,

    #[serde(default)]
    pub version_name: Option<String>,

    #[serde(default)]
    pub origin_id: Option<String>,

    /// URL of the component.
    #[serde(default)]
    pub component: String,

    /// URL of the component version.
    #[serde(default)]
    pub version: Option<String>,

    /// URL of the origin variant.
    #[serde(default)]
    pub variant: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// A released version of a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentVersion {
    pub version_name: String,

    #[serde(default)]
    pub released_on: Option<DateTime<Utc>>,

    #[serde(default)]
    pub license: Option<ComplexLicense>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(rename = "type", default)]
    pub component_type: Option<String>,

    #[serde(default)]
    pub additional_homepages: Vec<String>,

    #[serde(default)]
    pub approval_status: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl ComponentVersion {
    pub fn component_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("component")
    }

    pub fn vulnerabilities_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("vulnerabilities")
    }

    /// Versions to move to in order to fix this version's vulnerabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self, client), fields(version = %self.version_name))]
    pub async fn remediation(&self, client: &HubClient) -> Result<ComponentRemediation> {
        let url = format!("{}/remediating", self.href().trim_end_matches('/'));
        client
            .get_json(&url)
            .await
            .context("error trying to retrieve component version remediation")
    }

    /// Short and long term upgrade advice for this version.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn upgrade_guidance(&self, client: &HubClient) -> Result<ComponentUpgradeGuidance> {
        let url = format!("{}/upgrade-guidance", self.href().trim_end_matches('/'));
        client
            .get_json(&url)
            .await
            .context("error trying to retrieve component version upgrade guidance")
    }
}

/// Remediation options for a component version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentRemediation {
    pub fixes_previous_vulnerabilities: Option<RemediationInfo>,
    pub latest_after_current: Option<RemediationInfo>,
    pub no_vulnerabilities: Option<RemediationInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemediationInfo {
    pub name: String,
    /// URL of the suggested component version.
    pub component_version: String,
    pub released_on: Option<DateTime<Utc>>,
    pub vulnerability_count: u64,
}

/// Upgrade advice for a component version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentUpgradeGuidance {
    pub component: String,
    pub component_name: String,
    pub version: String,
    pub version_name: String,
    pub origin: Option<String>,
    pub origin_name: Option<String>,
    pub origin_external_namespace: Option<String>,
    pub origin_external_id: Option<String>,
    pub short_term: Option<UpgradeGuidance>,
    pub long_term: Option<UpgradeGuidance>,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpgradeGuidance {
    pub version: String,
    pub version_name: String,
    pub origin: Option<String>,
    pub origin_name: Option<String>,
    pub origin_external_namespace: Option<String>,
    pub origin_external_id: Option<String>,
    pub vulnerability_risk: VulnerabilityRisk,
}

/// Vulnerability counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VulnerabilityRisk {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl VulnerabilityRisk {
    pub fn total(&self) -> u64 {
        self.critical + self.high + self.medium + self.low
    }
}

declare_content_type!(
    Component => COMPONENT_DETAIL_V4,
    ComponentVariant => COMPONENT_DETAIL_V4,
    ComponentVersion => COMPONENT_DETAIL_V5,
    ComponentRemediation => COMPONENT_DETAIL_V4,
    ComponentUpgradeGuidance => COMPONENT_DETAIL_V4,
);

impl HasMeta for Component {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ComponentVariant {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ComponentVersion {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for Component {}
impl Delete for Component {}
impl Get for ComponentVersion {}

impl List for ComponentVersion {
    type Parent = Component;

    fn collection_url(_client: &HubClient, component: &Component) -> Result<String> {
        Ok(component.versions_link()?.href.clone())
    }
}

impl Create for Component {
    type Request = ComponentRequest;
    type Parent = ();

    fn create_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(COMPONENTS_PATH))
    }
}

/// Search the component catalog, e.g. with `q = "maven:org.slf4j:slf4j-api:1.7.30"`.
///
/// # Errors
///
/// Returns an error if the request fails.
#[tracing::instrument(skip(client))]
pub async fn search_components(
    client: &HubClient,
    q: &str,
    limit: Option<u32>,
) -> Result<ItemList<ComponentVariant>> {
    let mut options = ListOptions::first_page().with_query(q);
    if let Some(limit) = limit {
        options = options.with_limit(limit);
    }
    client
        .get_page(&client.api_url(COMPONENTS_PATH), &options)
        .await
        .context("error trying to search components")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_deserialize() {
        let json = r#"{
            "componentName": "SLF4J API Module",
            "versionName": "1.7.30",
            "originId": "org.slf4j:slf4j-api:1.7.30",
            "component": "https://hub.example.com/api/components/c1",
            "version": "https://hub.example.com/api/components/c1/versions/v1",
            "variant": "https://hub.example.com/api/components/c1/versions/v1/origins/o1"
        }"#;
        let variant: ComponentVariant = serde_json::from_str(json).unwrap();
        assert_eq!(variant.component_name, "SLF4J API Module");
        assert_eq!(variant.origin_id.as_deref(), Some("org.slf4j:slf4j-api:1.7.30"));
    }

    #[test]
    fn test_upgrade_guidance_risk() {
        let json = r#"{
            "componentName": "log4j-core",
            "versionName": "2.14.1",
            "shortTerm": {"versionName": "2.15.0", "vulnerabilityRisk": {"critical": 1, "high": 0, "medium": 2, "low": 0}},
            "longTerm": {"versionName": "2.17.1", "vulnerabilityRisk": {}}
        }"#;
        let guidance: ComponentUpgradeGuidance = serde_json::from_str(json).unwrap();
        assert_eq!(guidance.short_term.unwrap().vulnerability_risk.total(), 3);
        assert_eq!(guidance.long_term.unwrap().vulnerability_risk, VulnerabilityRisk::default());
    }

    #[test]
    fn test_component_request_skips_empty() {
        let request = ComponentRequest {
            name: "internal-lib".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"name": "internal-lib"}));
    }
}
