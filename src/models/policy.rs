//! Policy rule models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::Result;
use crate::links::{HasMeta, Meta};
use crate::mime::{declare_content_type, POLICY_V5};
use crate::traits::{Create, Delete, Get, List, Update};

/// Path of the policy rule collection.
pub const POLICY_RULES_PATH: &str = "/api/policy-rules";

/// A policy rule evaluated against BOM components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub overridable: bool,

    /// `BLOCKER`, `CRITICAL`, `MAJOR`, `MINOR` or `TRIVIAL`.
    #[serde(default)]
    pub severity: String,

    #[serde(default)]
    pub expression: PolicyExpressions,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default)]
    pub created_by_user: Option<String>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_by: Option<String>,

    #[serde(default)]
    pub updated_by_user: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Conditions joined by `operator` (`AND` or `OR`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyExpressions {
    pub operator: String,
    pub expressions: Vec<PolicyExpression>,
}

/// One condition, e.g. `HIGH_SEVERITY_VULN_COUNT GREATER_THAN 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyExpression {
    pub name: String,
    pub operation: String,
    pub parameters: PolicyExpressionParameter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyExpressionParameter {
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<serde_json::Value>,
}

/// Body for creating or updating a policy rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRuleRequest {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub overridable: bool,
    pub severity: String,
    pub expression: PolicyExpressions,
}

impl PolicyRule {
    /// Whether two rules define the same policy.
    ///
    /// Names, descriptions and severities compare case-insensitively; audit
    /// fields, `enabled` and links are ignored.
    pub fn is_equal(&self, other: &PolicyRule) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.description.eq_ignore_ascii_case(&other.description)
            && self.severity.eq_ignore_ascii_case(&other.severity)
            && self.overridable == other.overridable
            && self.expression == other.expression
    }

    /// The request that would recreate this rule.
    pub fn to_request(&self) -> PolicyRuleRequest {
        PolicyRuleRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            enabled: self.enabled,
            overridable: self.overridable,
            severity: self.severity.clone(),
            expression: self.expression.clone(),
        }
    }
}

declare_content_type!(PolicyRule => POLICY_V5);

impl HasMeta for PolicyRule {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for PolicyRule {}

impl List for PolicyRule {
    type Parent = ();

    fn collection_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(POLICY_RULES_PATH))
    }
}

impl Create for PolicyRule {
    type Request = PolicyRuleRequest;
    type Parent = ();

    fn create_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(POLICY_RULES_PATH))
    }

    fn request_content_type() -> &'static str {
        POLICY_V5
    }
}

impl Update for PolicyRule {
    type Request = PolicyRuleRequest;

    fn request_content_type() -> &'static str {
        POLICY_V5
    }
}

impl Delete for PolicyRule {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, severity: &str, threshold: &str) -> PolicyRule {
        PolicyRule {
            name: name.to_string(),
            description: "No high vulns".to_string(),
            enabled: true,
            severity: severity.to_string(),
            expression: PolicyExpressions {
                operator: "AND".to_string(),
                expressions: vec![PolicyExpression {
                    name: "HIGH_SEVERITY_VULN_COUNT".to_string(),
                    operation: "GREATER_THAN".to_string(),
                    parameters: PolicyExpressionParameter {
                        values: vec![threshold.to_string()],
                        data: Vec::new(),
                    },
                }],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_is_equal_ignores_case_and_audit_fields() {
        let a = rule("No High", "MAJOR", "0");
        let mut b = rule("no high", "major", "0");
        b.enabled = false;
        b.created_by = Some("sysadmin".to_string());
        assert!(a.is_equal(&b));
    }

    #[test]
    fn test_is_equal_compares_expression() {
        assert!(!rule("r", "MAJOR", "0").is_equal(&rule("r", "MAJOR", "1")));
        assert!(!rule("r", "MAJOR", "0").is_equal(&rule("r", "MINOR", "0")));
    }

    #[test]
    fn test_to_request() {
        let request = rule("r", "MAJOR", "0").to_request();
        assert_eq!(request.name, "r");
        assert_eq!(request.expression.expressions.len(), 1);
    }
}
