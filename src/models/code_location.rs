//! Code locations, their scan summaries and external extensions.
//!
//! A code location is a scanned source tree or artifact. It is mapped to at
//! most one project version and keeps a history of scans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta, ResourceLink};
use crate::mime::{declare_content_type, ContentType, SCAN_V4};
use crate::models::ProjectVersion;
use crate::pagination::ListOptions;
use crate::traits::{Get, List};

pub const CODE_LOCATIONS_PATH: &str = "/api/codelocations";

/// A scanned source tree or artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLocation {
    pub name: String,

    /// Where the scanned files came from.
    #[serde(default)]
    pub url: Option<String>,

    /// Bytes scanned.
    #[serde(default)]
    pub scan_size: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Href of the project version this location is mapped to.
    #[serde(default)]
    pub mapped_project_version: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl CodeLocation {
    pub fn scans_link(&self) -> Result<&ResourceLink> {
        self.meta.find_link_by_rel("scans")
    }
}

/// One scan of a code location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// e.g. `COMPLETE`, `BUILD_BOM`, `ERROR`.
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub status_message: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// A third-party integration registered with the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalExtension {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub info_url: String,

    #[serde(default)]
    pub authenticated: bool,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

declare_content_type!(CodeLocation => SCAN_V4, ScanSummary => SCAN_V4);
impl ContentType for ExternalExtension {}

impl HasMeta for CodeLocation {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ScanSummary {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for ExternalExtension {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for CodeLocation {}
impl Get for ScanSummary {}
impl Get for ExternalExtension {}

/// Code locations mapped to a project version.
impl List for CodeLocation {
    type Parent = ProjectVersion;

    fn collection_url(_client: &HubClient, version: &ProjectVersion) -> Result<String> {
        Ok(version.code_locations_link()?.href.clone())
    }
}

impl List for ScanSummary {
    type Parent = CodeLocation;

    fn collection_url(_client: &HubClient, location: &CodeLocation) -> Result<String> {
        Ok(location.scans_link()?.href.clone())
    }
}

impl HubClient {
    /// Every code location on the server, mapped or not.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn all_code_locations(&self, options: ListOptions) -> Result<Vec<CodeLocation>> {
        self.list_all(&self.api_url(CODE_LOCATIONS_PATH), options)
            .await
            .context("error trying to list code locations")
    }
}
