//! Snippet matching.

use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::Meta;

pub const SNIPPET_MATCHING_PATH: &str = "/api/snippet-matching";

/// Matches of a source fragment, grouped by license family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnippetMatchResponse {
    pub snippet_matches: SnippetMatches,
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub log_ref: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub arguments: Option<SnippetArguments>,
    pub errors: Vec<SnippetError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct SnippetMatches {
    pub unknown: Vec<Snippet>,
    pub reciprocal: Vec<Snippet>,
    #[serde(rename = "RECIPROCAL_AGPL")]
    pub reciprocal_agpl: Vec<Snippet>,
    pub weak_reciprocal: Vec<Snippet>,
    pub restricted_proprietary: Vec<Snippet>,
    pub internal_proprietary: Vec<Snippet>,
    pub permissive: Vec<Snippet>,
}

impl SnippetMatches {
    /// Every match, regardless of license family.
    pub fn all(&self) -> impl Iterator<Item = &Snippet> {
        self.unknown
            .iter()
            .chain(&self.reciprocal)
            .chain(&self.reciprocal_agpl)
            .chain(&self.weak_reciprocal)
            .chain(&self.restricted_proprietary)
            .chain(&self.internal_proprietary)
            .chain(&self.permissive)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    pub project_name: String,
    pub release_version: String,
    pub license_definition: LicenseDefinition,
    pub matched_file_path: String,
    pub regions: Regions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseDefinition {
    pub name: String,
    pub spdx_id: Option<String>,
    pub ownership: String,
    pub license_display_name: String,
}

/// Line ranges of a match in the scanned text and in the matched file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Regions {
    pub source_start_lines: Vec<u32>,
    pub source_end_lines: Vec<u32>,
    pub matched_start_lines: Vec<u32>,
    pub matched_end_lines: Vec<u32>,
}

impl Regions {
    pub fn source_start_line(&self) -> Option<u32> {
        self.source_start_lines.first().copied()
    }

    pub fn source_end_line(&self) -> Option<u32> {
        self.source_end_lines.first().copied()
    }

    pub fn matched_start_line(&self) -> Option<u32> {
        self.matched_start_lines.first().copied()
    }

    pub fn matched_end_line(&self) -> Option<u32> {
        self.matched_end_lines.first().copied()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnippetArguments {
    pub num_characters: Option<String>,
    pub min_characters: Option<String>,
    pub max_characters: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnippetError {
    pub log_ref: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub arguments: Option<SnippetArguments>,
}

impl HubClient {
    /// Look up open source matches for a fragment of source text.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 200.
    #[tracing::instrument(skip(self, content), fields(len = content.len()))]
    pub async fn find_snippet_matches(&self, content: String) -> Result<SnippetMatchResponse> {
        let (_, result) = self
            .post_raw_expect_result(&self.api_url(SNIPPET_MATCHING_PATH), content, "text/plain", 200)
            .await
            .context("error kicking off a snippet scan")?;
        Ok(result)
    }
}
