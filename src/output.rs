//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::{
    BomComponent, CodeLocation, HasMeta, HealthCheckStatus, PolicyRule, Project, ProjectVersion,
    RapidScanComponent, ScanSummary, User, Vulnerability,
};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header(title: String) -> Vec<String> {
    let divider = "─".repeat(title.chars().count().max(30));
    vec![title, divider]
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Project: {}", self.name));

        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {}", description));
        }

        if let Some(tier) = self.project_tier {
            lines.push(format!("Tier:           {}", tier));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        if !self.href().is_empty() {
            lines.push(format!("Href:           {}", self.href()));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ProjectVersion {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Version: {}", self.version_name));
        lines.push(format!("Phase:          {}", self.phase));
        lines.push(format!("Distribution:   {}", self.distribution));

        if let Some(ref nickname) = self.nickname {
            lines.push(format!("Nickname:       {}", nickname));
        }

        if let Some(ref released) = self.released_on {
            lines.push(format!("Released:       {}", timestamp(released)));
        }

        if let Some(ref license) = self.license {
            lines.push(format!("License:        {}", license.license_display));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for BomComponent {
    fn pretty_print(&self) -> String {
        let title = match &self.component_version_name {
            Some(version) => format!("Component: {} {}", self.component_name, version),
            None => format!("Component: {}", self.component_name),
        };
        let mut lines = header(title);

        let licenses: Vec<&str> = self.licenses.iter().map(|l| l.license_display.as_str()).collect();
        if !licenses.is_empty() {
            lines.push(format!("Licenses:       {}", licenses.join(", ")));
        }

        if !self.match_types.is_empty() {
            lines.push(format!("Match Types:    {}", self.match_types.join(", ")));
        }

        if let Some(ref status) = self.policy_status {
            lines.push(format!("Policy Status:  {}", status));
        }

        if let Some(ref risk) = self.security_risk_profile {
            lines.push(format!(
                "Security Risk:  {} critical, {} high, {} medium, {} low",
                risk.count("CRITICAL"),
                risk.count("HIGH"),
                risk.count("MEDIUM"),
                risk.count("LOW")
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for PolicyRule {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Policy Rule: {}", self.name));
        lines.push(format!("Severity:       {}", self.severity));
        lines.push(format!("Enabled:        {}", if self.enabled { "yes" } else { "no" }));
        lines.push(format!("Overridable:    {}", if self.overridable { "yes" } else { "no" }));

        if !self.description.is_empty() {
            lines.push(format!("Description:    {}", self.description));
        }

        for condition in &self.expression.expressions {
            lines.push(format!(
                "Condition:      {} {} {}",
                condition.name,
                condition.operation,
                condition.parameters.values.join(",")
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("User: {}", self.user_name));

        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !full_name.is_empty() {
            lines.push(format!("Name:           {}", full_name));
        }

        if let Some(ref email) = self.email {
            lines.push(format!("Email:          {}", email));
        }

        lines.push(format!("Active:         {}", if self.active { "yes" } else { "no" }));
        lines.join("\n")
    }
}

impl PrettyPrint for Vulnerability {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Vulnerability: {}", self.name));
        lines.push(format!("Source:         {}", self.source));
        lines.push(format!("Severity:       {}", self.severity));

        if let Some(score) = self.preferred_score() {
            lines.push(format!("Score:          {:.1}", score));
        }

        if let Some(ref published) = self.published_date {
            lines.push(format!("Published:      {}", published));
        }

        if !self.title.is_empty() {
            lines.push(format!("Title:          {}", self.title));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for RapidScanComponent {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("{} {}", self.component_name, self.version_name));

        if !self.external_id.is_empty() {
            lines.push(format!("External Id:    {}", self.external_id));
        }

        for policy in self.violating_policies.iter().chain(&self.component_violating_policies) {
            lines.push(format!("Violates:       {} ({})", policy.name, policy.severity));
        }

        for vuln in &self.all_vulnerabilities {
            lines.push(format!(
                "Vulnerability:  {} {} {:.1}",
                vuln.name, vuln.severity, vuln.overall_score
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for CodeLocation {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Code location: {}", self.name));

        if let Some(ref url) = self.url {
            lines.push(format!("Source:         {}", url));
        }
        if let Some(size) = self.scan_size {
            lines.push(format!("Scan size:      {} bytes", size));
        }
        lines.push(format!(
            "Mapped to:      {}",
            self.mapped_project_version.as_deref().unwrap_or("(unmapped)")
        ));
        if let Some(ref updated) = self.updated_at {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ScanSummary {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Scan: {}", self.status));
        if let Some(ref message) = self.status_message {
            lines.push(format!("Message:        {}", message));
        }
        if let Some(ref created) = self.created_at {
            lines.push(format!("Started:        {}", timestamp(created)));
        }
        if let Some(ref updated) = self.updated_at {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }
        lines.join("\n")
    }
}

impl PrettyPrint for HealthCheckStatus {
    fn pretty_print(&self) -> String {
        let mut lines = vec![format!("Healthy:        {}", if self.healthy { "yes" } else { "no" })];
        for (check, status) in &self.details {
            let shown = status
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| status.to_string());
            lines.push(format!("  {:<14}{}", check, shown));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_pretty_print_format() {
        let project: Project = serde_json::from_value(serde_json::json!({
            "name": "my-project",
            "description": "Demo",
            "_meta": {"href": "https://hub.example.com/api/projects/p1", "links": []}
        }))
        .unwrap();

        let output = project.pretty_print();
        assert!(output.starts_with("Project: my-project"));
        assert!(output.contains("Description:    Demo"));
        assert!(output.contains("https://hub.example.com/api/projects/p1"));
    }

    #[test]
    fn test_health_pretty_print() {
        let status: HealthCheckStatus =
            serde_json::from_str(r#"{"healthy": false, "details": {"database": "down"}}"#).unwrap();
        let output = status.pretty_print();
        assert!(output.contains("Healthy:        no"));
        assert!(output.contains("database"));
        assert!(output.contains("down"));
    }
}
