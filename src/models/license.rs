//! License models.

use serde::{Deserialize, Serialize};

use crate::links::{HasMeta, Meta, ResourceLink};
use crate::mime::{declare_content_type, COMPONENT_DETAIL_V5};

/// A license expression as attached to components and BOM entries.
///
/// Compound licenses (e.g. dual licensing) nest their parts in `licenses`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexLicense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `OPEN_SOURCE`, `PROPRIETARY`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,

    /// `CONJUNCTIVE` or `DISJUNCTIVE` for compound licenses.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,

    #[serde(default)]
    pub license_display: String,

    #[serde(default)]
    pub licenses: Vec<ComplexLicense>,

    /// URL of the license resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// SPDX identifier, when the license has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spdx_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_family_summary: Option<ResourceLink>,
}

impl ComplexLicense {
    /// SPDX identifiers of this license and every nested one.
    pub fn spdx_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.spdx_id.as_deref().into_iter().collect();
        for nested in &self.licenses {
            ids.extend(nested.spdx_ids());
        }
        ids
    }
}

/// A license in the Hub's license catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub name: String,

    #[serde(default)]
    pub ownership: String,

    #[serde(default)]
    pub code_sharing: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_status: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

declare_content_type!(License => COMPONENT_DETAIL_V5);

impl HasMeta for License {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl crate::traits::Get for License {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_spdx_ids() {
        let json = r#"{
            "type": "DISJUNCTIVE",
            "licenseDisplay": "Apache-2.0 OR MIT",
            "licenses": [
                {"name": "Apache License 2.0", "spdxId": "Apache-2.0", "licenseDisplay": "Apache-2.0", "licenses": []},
                {"name": "MIT License", "spdxId": "MIT", "licenseDisplay": "MIT", "licenses": []}
            ]
        }"#;
        let license: ComplexLicense = serde_json::from_str(json).unwrap();
        assert_eq!(license.license_type.as_deref(), Some("DISJUNCTIVE"));
        assert_eq!(license.spdx_ids(), vec!["Apache-2.0", "MIT"]);
    }
}
