//! Rapid scan result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::links::{HasMeta, Meta};
use crate::mime::{declare_content_type, RAPID_SCAN_RESULTS};
use crate::pagination::ItemList;

/// Full results of a rapid scan: one page of evaluated components.
pub type RapidScanResult = ItemList<RapidScanComponent>;

/// A component found by a rapid scan, with its policy evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RapidScanComponent {
    pub component_name: String,
    pub version_name: String,
    pub component_identifier: String,
    pub external_id: String,
    pub origin_id: String,
    pub violating_policies: Vec<ViolatedPolicy>,
    pub component_violating_policies: Vec<ViolatedPolicy>,
    pub all_vulnerabilities: Vec<ComponentVulnerability>,
    pub all_licenses: Vec<ComponentLicense>,
    pub policy_violation_vulnerabilities: Vec<ComponentVulnerability>,
    pub policy_violation_licenses: Vec<ComponentLicense>,
    pub partially_evaluated_policies: Vec<String>,
    pub non_evaluated_policies: Vec<String>,
    /// Paths from a direct dependency down to this component.
    pub dependency_tree: Vec<Vec<String>>,
    pub short_term_upgrade_guidance: Option<serde_json::Value>,
    pub long_term_upgrade_guidance: Option<serde_json::Value>,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

impl RapidScanComponent {
    /// Whether any policy flagged this component.
    pub fn is_in_violation(&self) -> bool {
        !self.violating_policies.is_empty() || !self.component_violating_policies.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolatedPolicy {
    #[serde(rename = "policyName")]
    pub name: String,
    pub description: String,
    #[serde(rename = "policySeverity")]
    pub severity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentVulnerability {
    pub name: String,
    pub description: String,
    #[serde(rename = "vulnSeverity")]
    pub severity: String,
    pub overall_score: f32,
    pub violating_policies: Vec<ViolatedPolicy>,
    pub published_date: Option<DateTime<Utc>>,
    pub vendor_fix_date: Option<DateTime<Utc>>,
    pub solution: String,
    pub workaround: String,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentLicense {
    pub name: String,
    #[serde(rename = "licenseFamilyName")]
    pub family_name: String,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

declare_content_type!(RapidScanComponent => RAPID_SCAN_RESULTS);

impl HasMeta for RapidScanComponent {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::ContentType;

    #[test]
    fn test_result_page() {
        let json = r#"{
            "totalCount": 1,
            "items": [{
                "componentName": "lodash",
                "versionName": "4.17.15",
                "externalId": "lodash/4.17.15",
                "violatingPolicies": [{"policyName": "No High Vulns", "policySeverity": "MAJOR"}],
                "allVulnerabilities": [{"name": "CVE-2020-8203", "vulnSeverity": "HIGH", "overallScore": 7.4}],
                "dependencyTree": [["my-app", "lodash"]]
            }],
            "appliedFilters": []
        }"#;
        let result: RapidScanResult = serde_json::from_str(json).unwrap();
        let component = &result.items[0];
        assert!(component.is_in_violation());
        assert_eq!(component.violating_policies[0].severity, "MAJOR");
        assert_eq!(component.all_vulnerabilities[0].severity, "HIGH");
        assert_eq!(component.dependency_tree[0], vec!["my-app", "lodash"]);
        assert_eq!(RapidScanResult::content_type(), Some(RAPID_SCAN_RESULTS));
    }
}
