//! Bill of materials models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta};
use crate::mime::{declare_content_type, BILL_OF_MATERIALS_V6};
use crate::pagination::ListOptions;
use crate::traits::{Get, List};

use super::{ComplexLicense, ProjectVersion, VulnerabilityBase};

/// A component in a project version's bill of materials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomComponent {
    pub component_name: String,

    #[serde(default)]
    pub component_version_name: Option<String>,

    /// URL of the catalog component.
    #[serde(default)]
    pub component: String,

    /// URL of the catalog component version.
    #[serde(default)]
    pub component_version: Option<String>,

    #[serde(default)]
    pub component_type: Option<String>,

    #[serde(default)]
    pub component_modified: bool,

    #[serde(default)]
    pub ignored: bool,

    #[serde(default)]
    pub manually_adjusted: bool,

    #[serde(default)]
    pub licenses: Vec<ComplexLicense>,

    #[serde(default)]
    pub origins: Vec<BomOrigin>,

    /// `DIRECT_DEPENDENCY`, `TRANSITIVE_DEPENDENCY`, `FILE_EXACT`, ...
    #[serde(default)]
    pub match_types: Vec<String>,

    #[serde(default)]
    pub usages: Vec<String>,

    #[serde(default)]
    pub review_status: Option<String>,

    #[serde(default)]
    pub approval_status: Option<String>,

    /// `IN_VIOLATION`, `NOT_IN_VIOLATION`, ...
    #[serde(default)]
    pub policy_status: Option<String>,

    #[serde(default)]
    pub security_risk_profile: Option<RiskProfile>,

    #[serde(default)]
    pub license_risk_profile: Option<RiskProfile>,

    #[serde(default)]
    pub operational_risk_profile: Option<RiskProfile>,

    #[serde(default)]
    pub activity_risk_profile: Option<RiskProfile>,

    #[serde(default)]
    pub version_risk_profile: Option<RiskProfile>,

    #[serde(default)]
    pub activity_data: Option<ActivityData>,

    #[serde(default)]
    pub total_file_match_count: u64,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Where a BOM component was identified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BomOrigin {
    pub name: String,
    pub origin: String,
    pub external_namespace: String,
    pub external_id: String,
    pub external_namespace_distribution: bool,
}

/// Risk counts by level (`CRITICAL`, `HIGH`, `MEDIUM`, `LOW`, `OK`, `UNKNOWN`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskProfile {
    pub counts: Vec<RiskCount>,
}

impl RiskProfile {
    /// Count for one level, zero when absent.
    pub fn count(&self, level: &str) -> u64 {
        self.counts
            .iter()
            .filter(|c| c.count_type.eq_ignore_ascii_case(level))
            .map(|c| c.count)
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskCount {
    pub count_type: String,
    pub count: u64,
}

/// Commit activity of the component's upstream project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityData {
    pub contributor_count_12_month: u64,
    pub commit_count_12_month: u64,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub trend: Option<String>,
}

/// A BOM entry that carries a vulnerability, with its remediation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomVulnerableComponent {
    pub component_name: String,

    #[serde(default)]
    pub component_version_name: String,

    /// URL of the catalog component version.
    #[serde(default)]
    pub component_version: String,

    #[serde(default)]
    pub component_version_origin_name: Option<String>,

    #[serde(default)]
    pub component_version_origin_id: Option<String>,

    #[serde(default)]
    pub license: Option<ComplexLicense>,

    #[serde(default)]
    pub vulnerability_with_remediation: VulnerabilityWithRemediation,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Vulnerability summary plus the project's remediation decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityWithRemediation {
    #[serde(flatten)]
    pub vulnerability: VulnerabilityBase,

    /// `NEW`, `NEEDS_REVIEW`, `PATCHED`, `IGNORED`, ...
    #[serde(default)]
    pub remediation_status: String,

    #[serde(default)]
    pub remediation_created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub remediation_updated_at: Option<DateTime<Utc>>,
}

declare_content_type!(
    BomComponent => BILL_OF_MATERIALS_V6,
    BomVulnerableComponent => BILL_OF_MATERIALS_V6,
);

impl HasMeta for BomComponent {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for BomVulnerableComponent {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for BomComponent {}

impl List for BomComponent {
    type Parent = ProjectVersion;

    fn collection_url(_client: &HubClient, version: &ProjectVersion) -> Result<String> {
        Ok(version.components_link()?.href.clone())
    }
}

impl List for BomVulnerableComponent {
    type Parent = ProjectVersion;

    fn collection_url(_client: &HubClient, version: &ProjectVersion) -> Result<String> {
        Ok(version.vulnerable_components_link()?.href.clone())
    }
}

impl ProjectVersion {
    /// Number of vulnerable BOM entries in this version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version has no vulnerable components link or
    /// the request fails.
    pub async fn count_vulnerable_components(&self, client: &HubClient) -> Result<u64> {
        BomVulnerableComponent::count(client, self)
            .await
            .context("error trying to count vulnerable components")
    }

    /// Every vulnerable BOM entry in this version.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn all_vulnerable_components(&self, client: &HubClient) -> Result<Vec<BomVulnerableComponent>> {
        BomVulnerableComponent::list_all(client, self, ListOptions::first_page()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vulnerable_component_flattened_base() {
        let json = r#"{
            "componentName": "log4j-core",
            "componentVersionName": "2.14.1",
            "componentVersion": "https://hub.example.com/api/components/c1/versions/v1",
            "vulnerabilityWithRemediation": {
                "vulnerabilityName": "CVE-2021-44228",
                "severity": "CRITICAL",
                "overallScore": 10.0,
                "remediationStatus": "NEW"
            }
        }"#;
        let component: BomVulnerableComponent = serde_json::from_str(json).unwrap();
        let vuln = &component.vulnerability_with_remediation;
        assert_eq!(vuln.vulnerability.vulnerability_name, "CVE-2021-44228");
        assert_eq!(vuln.vulnerability.severity, "CRITICAL");
        assert_eq!(vuln.remediation_status, "NEW");
    }

    #[test]
    fn test_risk_profile_count() {
        let json = r#"{"counts": [{"countType": "HIGH", "count": 2}, {"countType": "LOW", "count": 5}]}"#;
        let profile: RiskProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.count("high"), 2);
        assert_eq!(profile.count("CRITICAL"), 0);
    }

    #[test]
    fn test_bom_component_defaults() {
        let component: BomComponent =
            serde_json::from_str(r#"{"componentName": "serde", "matchTypes": ["DIRECT_DEPENDENCY"]}"#).unwrap();
        assert_eq!(component.match_types, vec!["DIRECT_DEPENDENCY"]);
        assert!(component.security_risk_profile.is_none());
        assert!(!component.ignored);
    }
}
