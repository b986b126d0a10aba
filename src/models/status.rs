//! Server status endpoints: version, SSO/MFA settings, health checks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta};
use crate::mime::{declare_content_type, ADMIN_V4, ADMIN_V5, STATUS_V4};
use crate::traits::Get;

pub const CURRENT_VERSION_PATH: &str = "/api/current-version";
pub const DETECT_URI_PATH: &str = "/api/external-config/detect-uri";
pub const SSO_STATUS_PATH: &str = "/api/sso/status";
pub const MFA_STATUS_PATH: &str = "/api/mfa/status";
pub const READINESS_PATH: &str = "/api/health-checks/readiness";
pub const LIVENESS_PATH: &str = "/api/health-checks/liveness";

/// Version of the Hub server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentVersion {
    pub version: String,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Where to download the Detect scanner configured for this server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectUri {
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoStatus {
    pub sso_enabled: bool,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaStatus {
    pub mfa_enabled: bool,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Body of the readiness and liveness probes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckStatus {
    pub healthy: bool,
    pub details: BTreeMap<String, serde_json::Value>,
}

declare_content_type!(
    CurrentVersion => STATUS_V4,
    SsoStatus => ADMIN_V4,
    MfaStatus => ADMIN_V5,
);

impl crate::mime::ContentType for DetectUri {}

impl HasMeta for CurrentVersion {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for SsoStatus {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for MfaStatus {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for CurrentVersion {}
impl Get for DetectUri {}
impl Get for SsoStatus {}
impl Get for MfaStatus {}

impl HubClient {
    /// Version of the server.
    pub async fn current_version(&self) -> Result<CurrentVersion> {
        CurrentVersion::get_href(self, &self.api_url(CURRENT_VERSION_PATH))
            .await
            .context("error trying to retrieve current version")
    }

    /// Detect download location configured on the server.
    pub async fn detect_uri(&self) -> Result<DetectUri> {
        DetectUri::get_href(self, &self.api_url(DETECT_URI_PATH))
            .await
            .context("error trying to get detect uri")
    }

    /// Whether single sign-on is enabled.
    pub async fn sso_status(&self) -> Result<SsoStatus> {
        SsoStatus::get_href(self, &self.api_url(SSO_STATUS_PATH))
            .await
            .context("error trying to get sso status")
    }

    /// Whether multi-factor authentication is enabled.
    pub async fn mfa_status(&self) -> Result<MfaStatus> {
        MfaStatus::get_href(self, &self.api_url(MFA_STATUS_PATH))
            .await
            .context("error trying to get mfa status")
    }

    /// Readiness probe. Sent without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 200 with a status body.
    pub async fn check_readiness(&self) -> Result<HealthCheckStatus> {
        self.get_json_unauthenticated(&self.api_url(READINESS_PATH))
            .await
            .context("error fetching hub health status")
    }

    /// Liveness probe. Sent without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 200 with a status body.
    pub async fn check_liveness(&self) -> Result<HealthCheckStatus> {
        self.get_json_unauthenticated(&self.api_url(LIVENESS_PATH))
            .await
            .context("error fetching hub health status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_tolerates_missing_fields() {
        let status: HealthCheckStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.healthy);

        let status: HealthCheckStatus =
            serde_json::from_str(r#"{"healthy": true, "details": {"db": "up"}}"#).unwrap();
        assert!(status.healthy);
        assert_eq!(status.details["db"], "up");
    }
}
