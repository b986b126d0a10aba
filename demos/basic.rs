//! Basic example demonstrating the Hub API client.
//!
//! Run with:
//! ```
//! BLACKDUCK_URL=https://hub.example.com BLACKDUCK_API_TOKEN=your-token cargo run --example basic
//! ```

use hubclient::{
    BomComponent, BomVulnerableComponent, HubClient, List, ListOptions, Project, ProjectVersion,
};

#[tokio::main]
async fn main() -> hubclient::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Connecting to the Hub...");
    let client = HubClient::from_env().await?;
    println!("Connected to: {}", client.base_url());

    let version = client.current_version().await?;
    println!("Server version: {}", version.version);

    // List first page of projects
    println!("\n--- Listing Projects (first page) ---");
    let options = ListOptions::first_page().with_limit(10);
    let projects = Project::list_page(&client, &(), &options).await?;
    println!("Found {} projects (total: {})", projects.len(), projects.total_count);

    for project in &projects {
        println!("  - {} ({})", project.name, project.meta.href);
    }

    let Some(project) = projects.items.first() else {
        client.close();
        return Ok(());
    };

    // Follow the versions link of the first project
    println!("\n--- Versions of {} ---", project.name);
    let versions = ProjectVersion::list_all(&client, project, ListOptions::default()).await?;
    for version in &versions {
        println!("  - {} [{} / {}]", version.version_name, version.phase, version.distribution);
    }

    if let Some(version) = versions.first() {
        println!("\n--- Bill of Materials for {} ---", version.version_name);
        let total = BomComponent::count(&client, version).await?;
        println!("{total} components");

        let bom = BomComponent::list_page(&client, version, &ListOptions::first_page().with_limit(5)).await?;
        for component in &bom {
            println!(
                "  - {} {}",
                component.component_name,
                component.component_version_name.as_deref().unwrap_or("?")
            );
        }

        let vulnerable = BomVulnerableComponent::list_all(&client, version, ListOptions::default()).await?;
        println!("\n{} vulnerable component entries", vulnerable.len());
        for entry in vulnerable.iter().take(5) {
            let vuln = &entry.vulnerability_with_remediation;
            println!(
                "  - {} {}: {} ({})",
                entry.component_name,
                entry.component_version_name,
                vuln.vulnerability.vulnerability_name,
                vuln.vulnerability.severity
            );
        }
    }

    client.close();
    println!("\nDone!");
    Ok(())
}
