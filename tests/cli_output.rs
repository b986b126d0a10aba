//! Tests for CLI output formatting: JSON with `--json`, pretty-print otherwise.

use hubclient::{BomComponent, PolicyRule, PrettyPrint, Project, RapidScanComponent, User, Vulnerability};

fn make_test_project() -> Project {
    serde_json::from_value(serde_json::json!({
        "name": "Test Project",
        "description": "A project used in output tests",
        "projectTier": 2,
        "createdAt": "2024-03-01T10:00:00.000Z",
        "_meta": {
            "allow": ["GET", "PUT", "DELETE"],
            "href": "https://hub.example.com/api/projects/p1",
            "links": [{"rel": "versions", "href": "https://hub.example.com/api/projects/p1/versions"}]
        }
    }))
    .unwrap()
}

// ============================================================================
// JSON Output Tests
// ============================================================================

#[test]
fn test_json_output_keeps_hub_field_names() {
    let project = make_test_project();
    let json_output = serde_json::to_string_pretty(&project).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert_eq!(parsed["name"], "Test Project");
    assert_eq!(parsed["projectTier"], 2);
    assert_eq!(parsed["_meta"]["href"], "https://hub.example.com/api/projects/p1");
    assert_eq!(parsed["_meta"]["links"][0]["rel"], "versions");
}

#[test]
fn test_json_round_trip_preserves_links() {
    let project = make_test_project();
    let json = serde_json::to_value(&project).unwrap();
    let back: Project = serde_json::from_value(json).unwrap();

    assert_eq!(back.meta, project.meta);
    assert_eq!(back.versions_link().unwrap().href, project.versions_link().unwrap().href);
}

// ============================================================================
// Pretty Print Tests
// ============================================================================

#[test]
fn test_project_pretty_print() {
    let output = make_test_project().pretty_print();

    assert!(output.starts_with("Project: Test Project"));
    assert!(output.contains("Tier:           2"));
    assert!(output.contains("Created:        2024-03-01 10:00:00 UTC"));
    assert!(!output.contains('{'));
}

#[test]
fn test_bom_component_pretty_print_shows_risk() {
    let component: BomComponent = serde_json::from_value(serde_json::json!({
        "componentName": "log4j-core",
        "componentVersionName": "2.14.1",
        "component": "https://hub.example.com/api/components/c1",
        "licenses": [{"licenseDisplay": "Apache License 2.0", "licenses": []}],
        "matchTypes": ["FILE_DEPENDENCY_DIRECT"],
        "policyStatus": "IN_VIOLATION",
        "securityRiskProfile": {"counts": [
            {"countType": "CRITICAL", "count": 1},
            {"countType": "HIGH", "count": 2}
        ]}
    }))
    .unwrap();

    let output = component.pretty_print();
    assert!(output.starts_with("Component: log4j-core 2.14.1"));
    assert!(output.contains("Apache License 2.0"));
    assert!(output.contains("IN_VIOLATION"));
    assert!(output.contains("1 critical, 2 high, 0 medium, 0 low"));
}

#[test]
fn test_policy_rule_pretty_print_lists_conditions() {
    let rule: PolicyRule = serde_json::from_value(serde_json::json!({
        "name": "No GPL",
        "enabled": true,
        "overridable": false,
        "severity": "MAJOR",
        "expression": {
            "operator": "AND",
            "expressions": [{
                "name": "LICENSE_FAMILY",
                "operation": "EQ",
                "parameters": {"values": ["RECIPROCAL"]}
            }]
        }
    }))
    .unwrap();

    let output = rule.pretty_print();
    assert!(output.contains("Severity:       MAJOR"));
    assert!(output.contains("Overridable:    no"));
    assert!(output.contains("Condition:      LICENSE_FAMILY EQ RECIPROCAL"));
}

#[test]
fn test_user_pretty_print_joins_names() {
    let user: User = serde_json::from_value(serde_json::json!({
        "userName": "jdoe",
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@example.com",
        "active": true
    }))
    .unwrap();

    let output = user.pretty_print();
    assert!(output.contains("Name:           Jane Doe"));
    assert!(output.contains("Active:         yes"));
}

#[test]
fn test_vulnerability_pretty_print() {
    let vuln: Vulnerability = serde_json::from_value(serde_json::json!({
        "name": "CVE-2021-44228",
        "source": "NVD",
        "severity": "CRITICAL",
        "title": "Log4Shell",
        "cvss3": {"baseScore": 10.0}
    }))
    .unwrap();

    let output = vuln.pretty_print();
    assert!(output.starts_with("Vulnerability: CVE-2021-44228"));
    assert!(output.contains("Severity:       CRITICAL"));
    assert!(output.contains("Title:          Log4Shell"));
}

#[test]
fn test_rapid_scan_component_pretty_print() {
    let component: RapidScanComponent = serde_json::from_value(serde_json::json!({
        "componentName": "lodash",
        "versionName": "4.17.15",
        "externalId": "npm:lodash:4.17.15",
        "violatingPolicies": [{"policyName": "No High Vulns", "policySeverity": "MAJOR"}],
        "allVulnerabilities": [{"name": "CVE-2020-8203", "vulnSeverity": "HIGH", "overallScore": 7.4}]
    }))
    .unwrap();

    let output = component.pretty_print();
    assert!(output.starts_with("lodash 4.17.15"));
    assert!(output.contains("Violates:       No High Vulns (MAJOR)"));
    assert!(output.contains("Vulnerability:  CVE-2020-8203 HIGH 7.4"));
}
