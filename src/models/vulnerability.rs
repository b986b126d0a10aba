//! Vulnerability models.

use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta};
use crate::mime::{declare_content_type, VULNERABILITY_V4};
use crate::traits::Get;

/// Path of the vulnerability catalog.
pub const VULNERABILITIES_PATH: &str = "/api/vulnerabilities";

/// A vulnerability record (e.g. a CVE or BDSA entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// `NVD` or `BDSA`.
    #[serde(default)]
    pub source: String,

    /// Identifier such as `CVE-2021-44228`.
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub technical_description: String,

    #[serde(default)]
    pub published_date: Option<String>,

    #[serde(default)]
    pub updated_date: Option<String>,

    #[serde(default)]
    pub disclosure_date: Option<String>,

    #[serde(default)]
    pub solution: String,

    #[serde(default)]
    pub workaround: String,

    /// `CRITICAL`, `HIGH`, `MEDIUM` or `LOW`.
    #[serde(default)]
    pub severity: String,

    #[serde(default)]
    pub cvss2: Option<Cvss>,

    #[serde(default)]
    pub cvss3: Option<Cvss>,

    #[serde(rename = "useCvss3", default)]
    pub use_cvss3: bool,

    #[serde(default)]
    pub zero_day: bool,

    #[serde(default)]
    pub under_review: bool,

    #[serde(default)]
    pub parent_advisory: bool,

    #[serde(default)]
    pub credit: String,

    #[serde(default)]
    pub vendor_fix_date: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// CVSS scoring details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cvss {
    pub base_score: f32,
    pub impact_subscore: f32,
    pub exploitability_subscore: f32,
    pub access_vector: String,
    pub access_complexity: String,
    pub authentication: String,
    pub confidentiality_impact: String,
    pub integrity_impact: String,
    pub availability_impact: String,
    pub privileges_required: String,
    pub scope: String,
    pub user_interaction: String,
    pub temporal_metrics: Option<VulnerabilityMetrics>,
    pub vector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VulnerabilityMetrics {
    pub exploitability: String,
    pub remediation_level: String,
    pub report_confidence: String,
    pub score: f32,
}

/// Vulnerability summary embedded in BOM entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VulnerabilityBase {
    pub vulnerability_name: String,
    pub description: String,
    pub vulnerability_published_date: Option<String>,
    pub vulnerability_updated_date: Option<String>,
    pub base_score: f32,
    pub overall_score: f32,
    pub exploitability_subscore: f32,
    pub impact_subscore: f32,
    pub source: String,
    pub severity: String,
    pub cwe_id: Option<String>,
}

declare_content_type!(Vulnerability => VULNERABILITY_V4);

impl HasMeta for Vulnerability {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for Vulnerability {}

impl Vulnerability {
    /// Score to report: CVSS3 when the Hub prefers it, else CVSS2.
    pub fn preferred_score(&self) -> Option<f32> {
        let cvss = if self.use_cvss3 { &self.cvss3 } else { &self.cvss2 };
        cvss.as_ref().map(|c| c.base_score)
    }

    /// Fetch a vulnerability by identifier, e.g. `CVE-2021-44228`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vulnerability is not found or the request fails.
    #[tracing::instrument(skip(client))]
    pub async fn get_by_id(client: &HubClient, id: &str) -> Result<Self> {
        let url = client.api_url(&format!(
            "{VULNERABILITIES_PATH}/{}",
            urlencoding::encode(id)
        ));
        Self::get_href(client, &url)
            .await
            .with_context(|| format!("error trying to retrieve vulnerability {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_score() {
        let json = r#"{
            "name": "CVE-2021-44228",
            "source": "NVD",
            "severity": "CRITICAL",
            "useCvss3": true,
            "cvss2": {"baseScore": 9.3},
            "cvss3": {"baseScore": 10.0, "vector": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:C/C:H/I:H/A:H"}
        }"#;
        let vuln: Vulnerability = serde_json::from_str(json).unwrap();
        assert_eq!(vuln.preferred_score(), Some(10.0));
        assert!(vuln.meta.links.is_empty());
    }
}
