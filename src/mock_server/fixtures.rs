//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use super::state::{meta, MockState};
use crate::{
    BomComponent, BomVulnerableComponent, ComplexLicense, ComponentLicense, ComponentVulnerability,
    PolicyExpression, PolicyExpressionParameter, PolicyExpressions, PolicyRule, ProjectRequest,
    ProjectVersionRequest, RapidScanComponent, RiskCount, RiskProfile, ViolatedPolicy,
    VulnerabilityBase, VulnerabilityWithRemediation,
};

/// API token accepted by the default scenario.
pub const DEFAULT_API_TOKEN: &str = "mock-api-token";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // BOM Fixtures
    // =========================================================================

    /// A BOM entry with one license.
    pub fn bom_component(name: &str, version: &str, license: &str) -> BomComponent {
        let component = format!("/api/components/{}", name.to_lowercase());
        let component_version = format!("{component}/versions/{version}");
        BomComponent {
            component_name: name.to_string(),
            component_version_name: Some(version.to_string()),
            component: component.clone(),
            component_version: Some(component_version),
            component_type: Some("KB_COMPONENT".to_string()),
            licenses: vec![ComplexLicense {
                license_display: license.to_string(),
                license_type: Some("CONJUNCTIVE".to_string()),
                ..ComplexLicense::default()
            }],
            match_types: vec!["FILE_DEPENDENCY_DIRECT".to_string()],
            usages: vec!["DYNAMICALLY_LINKED".to_string()],
            review_status: Some("NOT_REVIEWED".to_string()),
            approval_status: Some("UNREVIEWED".to_string()),
            policy_status: Some("NOT_IN_VIOLATION".to_string()),
            security_risk_profile: Some(RiskProfile {
                counts: ["CRITICAL", "HIGH", "MEDIUM", "LOW", "OK"]
                    .iter()
                    .map(|level| RiskCount {
                        count_type: (*level).to_string(),
                        count: u64::from(*level == "OK"),
                    })
                    .collect(),
            }),
            meta: meta(&component, &[]),
            ..BomComponent::default()
        }
    }

    /// A vulnerable BOM entry.
    pub fn vulnerable_component(
        name: &str,
        version: &str,
        vulnerability: &str,
        severity: &str,
    ) -> BomVulnerableComponent {
        BomVulnerableComponent {
            component_name: name.to_string(),
            component_version_name: version.to_string(),
            component_version: format!("/api/components/{}/versions/{version}", name.to_lowercase()),
            vulnerability_with_remediation: VulnerabilityWithRemediation {
                vulnerability: VulnerabilityBase {
                    vulnerability_name: vulnerability.to_string(),
                    severity: severity.to_string(),
                    source: "NVD".to_string(),
                    base_score: 7.5,
                    overall_score: 7.5,
                    ..VulnerabilityBase::default()
                },
                remediation_status: "NEW".to_string(),
                ..VulnerabilityWithRemediation::default()
            },
            ..BomVulnerableComponent::default()
        }
    }

    // =========================================================================
    // Policy Fixtures
    // =========================================================================

    /// A rule that forbids components with high severity vulnerabilities.
    pub fn policy_rule(name: &str, severity: &str) -> PolicyRule {
        PolicyRule {
            name: name.to_string(),
            description: format!("{name} rule"),
            enabled: true,
            overridable: true,
            severity: severity.to_string(),
            expression: PolicyExpressions {
                operator: "AND".to_string(),
                expressions: vec![PolicyExpression {
                    name: "HIGH_SEVERITY_VULN_COUNT".to_string(),
                    operation: "GREATER_THAN".to_string(),
                    parameters: PolicyExpressionParameter {
                        values: vec!["0".to_string()],
                        ..PolicyExpressionParameter::default()
                    },
                }],
            },
            meta: meta(&format!("/api/policy-rules/{}", name.to_lowercase()), &[]),
            ..PolicyRule::default()
        }
    }

    // =========================================================================
    // Rapid Scan Fixtures
    // =========================================================================

    /// A rapid scan component with no findings.
    pub fn clean_scan_component(name: &str, version: &str) -> RapidScanComponent {
        RapidScanComponent {
            component_name: name.to_string(),
            version_name: version.to_string(),
            component_identifier: format!("maven:org.example:{name}:{version}"),
            external_id: format!("org.example:{name}:{version}"),
            all_licenses: vec![ComponentLicense {
                name: "Apache License 2.0".to_string(),
                family_name: "Permissive".to_string(),
                ..ComponentLicense::default()
            }],
            ..RapidScanComponent::default()
        }
    }

    /// A rapid scan component that violates a vulnerability policy.
    pub fn violating_scan_component(name: &str, version: &str, vulnerability: &str) -> RapidScanComponent {
        let policy = ViolatedPolicy {
            name: "No High Vulnerabilities".to_string(),
            description: "Blocks components with high severity vulnerabilities".to_string(),
            severity: "BLOCKER".to_string(),
        };
        let vuln = ComponentVulnerability {
            name: vulnerability.to_string(),
            severity: "HIGH".to_string(),
            overall_score: 8.1,
            violating_policies: vec![policy.clone()],
            ..ComponentVulnerability::default()
        };
        RapidScanComponent {
            violating_policies: vec![policy],
            all_vulnerabilities: vec![vuln.clone()],
            policy_violation_vulnerabilities: vec![vuln],
            ..Self::clean_scan_component(name, version)
        }
    }

    // =========================================================================
    // Scenario Fixtures
    // =========================================================================

    /// A complete test scenario: two projects, a populated version, a policy
    /// rule and rapid scan results available after one poll.
    pub fn default_scenario() -> MockState {
        let mut state = MockState::new()
            .with_api_token(DEFAULT_API_TOKEN)
            .with_login("sysadmin", "blackduck")
            .with_policy_rule(Self::policy_rule("No High Vulnerabilities", "BLOCKER"))
            .with_rapid_scan_results(
                vec![
                    Self::clean_scan_component("commons-lang3", "3.12.0"),
                    Self::violating_scan_component("log4j-core", "2.14.1", "CVE-2021-44228"),
                ],
                1,
            );

        let project_id = state.create_project(ProjectRequest {
            description: Some("Test project".to_string()),
            project_tier: Some(3),
            ..ProjectRequest::new("Test Project")
        });
        if let Some(version_id) = state.create_version(&project_id, ProjectVersionRequest::new("1.0.0")) {
            state.set_bom(
                &version_id,
                vec![
                    Self::bom_component("commons-lang3", "3.12.0", "Apache License 2.0"),
                    Self::bom_component("log4j-core", "2.14.1", "Apache License 2.0"),
                    Self::bom_component("slf4j-api", "1.7.36", "MIT License"),
                ],
            );
            state.set_vulnerable_bom(
                &version_id,
                vec![Self::vulnerable_component("log4j-core", "2.14.1", "CVE-2021-44228", "CRITICAL")],
            );
            let version_href = format!("/api/projects/{project_id}/versions/{version_id}");
            state.map_code_location("test-project/1.0.0 scan", &version_href);
        }
        state.create_version(&project_id, ProjectVersionRequest::new("2.0.0"));

        state.create_project(ProjectRequest::new("Another Project"));
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_contents() {
        let state = Fixtures::default_scenario();

        assert_eq!(state.projects.len(), 2);
        assert_eq!(state.bom.values().map(Vec::len).sum::<usize>(), 3);
        assert_eq!(state.rapid_scan_results.len(), 2);
        assert_eq!(state.code_locations.len(), 1);
        assert!(state.require_auth);
    }

    #[test]
    fn test_violating_scan_component() {
        let component = Fixtures::violating_scan_component("log4j-core", "2.14.1", "CVE-2021-44228");
        assert!(component.is_in_violation());
        assert!(!Fixtures::clean_scan_component("a", "1").is_in_violation());
    }
}
