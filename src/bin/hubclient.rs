//! Black Duck Hub CLI binary.
//!
//! A command-line interface for interacting with the Hub API.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use hubclient::cli::{Cli, Command, Entity, RapidScanArgs};
use hubclient::{
    ApiToken, BomComponent, BomVulnerableComponent, CancellationToken, CodeLocation, Get, HubClient,
    HubError, ItemList, List, ListOptions, PolicyRule, PollConfig, PrettyPrint, Project,
    ProjectVersion, ResultExt, ScanSummary, User, Vulnerability,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let client = match cli.connection.connect().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, HubError::ConfigMissing(_)) {
                eprintln!("Hint: Set BLACKDUCK_URL and BLACKDUCK_API_TOKEN environment variables");
            }
            return ExitCode::FAILURE;
        }
    };

    let result = run(&client, cli).await;
    client.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &HubClient, cli: Cli) -> hubclient::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Health => handle_health(client, json).await,
        Command::Version => {
            let version = client.current_version().await?;
            if json {
                print_json(&version)
            } else {
                println!("{}", version.version);
                Ok(())
            }
        }
        Command::Get { entity, href } => handle_get(client, entity, &href, json).await,
        Command::List {
            entity,
            parent,
            limit,
            offset,
            q,
            sort,
            all,
        } => {
            let mut options = ListOptions::first_page();
            options.limit = limit.or(options.limit);
            options.offset = offset.or(options.offset);
            options.q = q;
            options.sort = sort;
            handle_list(client, entity, parent.as_deref(), options, all, json).await
        }
        Command::Count { url } => {
            let total = client.count(&url).await?;
            println!("{total}");
            Ok(())
        }
        Command::RapidScan(args) => handle_rapid_scan(client, args, json).await,
    }
}

async fn handle_health(client: &HubClient, json: bool) -> hubclient::Result<()> {
    let readiness = client.check_readiness().await?;
    let liveness = client.check_liveness().await?;
    if json {
        return print_json(&serde_json::json!({
            "readiness": readiness,
            "liveness": liveness,
        }));
    }
    println!("Readiness\n{}\n", readiness.pretty_print());
    println!("Liveness\n{}", liveness.pretty_print());
    Ok(())
}

async fn handle_get(client: &HubClient, entity: Entity, href: &str, json: bool) -> hubclient::Result<()> {
    match entity {
        Entity::Project => output_single(&Project::get_href(client, href).await?, json),
        Entity::Version => output_single(&ProjectVersion::get_href(client, href).await?, json),
        Entity::Component => output_single(&BomComponent::get_href(client, href).await?, json),
        Entity::PolicyRule => output_single(&PolicyRule::get_href(client, href).await?, json),
        Entity::User => output_single(&User::get_href(client, href).await?, json),
        Entity::Vulnerability => output_single(&Vulnerability::get_href(client, href).await?, json),
        Entity::CodeLocation => output_single(&CodeLocation::get_href(client, href).await?, json),
        Entity::ScanSummary => output_single(&ScanSummary::get_href(client, href).await?, json),
        Entity::VulnerableComponent | Entity::ApiToken => {
            eprintln!("Error: {entity:?} entries can only be listed, not retrieved individually");
            Err(HubError::RequestConstruction(
                "get is not supported for this entity".to_string(),
            ))
        }
    }
}

async fn handle_list(
    client: &HubClient,
    entity: Entity,
    parent: Option<&str>,
    options: ListOptions,
    all: bool,
    json: bool,
) -> hubclient::Result<()> {
    match entity {
        Entity::Project => {
            let page = fetch::<Project>(client, &(), options, all).await?;
            output_page(&page, json, |x| ProjectRow::from(x))
        }
        Entity::Version => {
            let project = Project::get_href(client, require_parent(parent, "project")?).await?;
            let page = fetch::<ProjectVersion>(client, &project, options, all).await?;
            output_page(&page, json, |x| VersionRow::from(x))
        }
        Entity::Component => {
            let version = ProjectVersion::get_href(client, require_parent(parent, "project version")?).await?;
            let page = fetch::<BomComponent>(client, &version, options, all).await?;
            output_page(&page, json, |x| BomRow::from(x))
        }
        Entity::VulnerableComponent => {
            let version = ProjectVersion::get_href(client, require_parent(parent, "project version")?).await?;
            let page = fetch::<BomVulnerableComponent>(client, &version, options, all).await?;
            output_page(&page, json, |x| VulnerableRow::from(x))
        }
        Entity::PolicyRule => {
            let page = fetch::<PolicyRule>(client, &(), options, all).await?;
            output_page(&page, json, |x| PolicyRow::from(x))
        }
        Entity::User => {
            let page = fetch::<User>(client, &(), options, all).await?;
            output_page(&page, json, |x| UserRow::from(x))
        }
        Entity::ApiToken => {
            let page = fetch::<ApiToken>(client, &(), options, all).await?;
            output_page(&page, json, |x| TokenRow::from(x))
        }
        Entity::CodeLocation => {
            let version = ProjectVersion::get_href(client, require_parent(parent, "project version")?).await?;
            let page = fetch::<CodeLocation>(client, &version, options, all).await?;
            output_page(&page, json, |x| CodeLocationRow::from(x))
        }
        Entity::ScanSummary => {
            let location = CodeLocation::get_href(client, require_parent(parent, "code location")?).await?;
            let page = fetch::<ScanSummary>(client, &location, options, all).await?;
            output_page(&page, json, |x| ScanRow::from(x))
        }
        Entity::Vulnerability => {
            eprintln!("Hint: Use 'hubclient get vulnerability <href>'");
            Err(HubError::RequestConstruction(
                "vulnerabilities can only be retrieved individually".to_string(),
            ))
        }
    }
}

async fn handle_rapid_scan(client: &HubClient, args: RapidScanArgs, json: bool) -> hubclient::Result<()> {
    let header = read_file(&args.header)?;
    let chunks = args
        .chunks
        .iter()
        .map(|path| read_file(path))
        .collect::<hubclient::Result<Vec<_>>>()?;

    let config = PollConfig::new(
        Duration::from_secs(args.interval_secs),
        Duration::from_secs(args.wait_secs),
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let result = client.rapid_scan(&header, &chunks, &config, &cancel).await?;
    if json {
        return print_json(&result.items);
    }

    for component in &result.items {
        println!("{}\n", component.pretty_print());
    }
    let violations = result.iter().filter(|c| c.is_in_violation()).count();
    println!("{} components, {} in violation", result.len(), violations);
    Ok(())
}

/// One page, or every page collected into one when `all` is set.
async fn fetch<T>(
    client: &HubClient,
    parent: &T::Parent,
    options: ListOptions,
    all: bool,
) -> hubclient::Result<ItemList<T>>
where
    T: List,
{
    if all {
        let items = T::list_all(client, parent, options).await?;
        Ok(ItemList {
            total_count: items.len() as u64,
            items,
            ..ItemList::default()
        })
    } else {
        T::list_page(client, parent, &options).await
    }
}

fn require_parent<'a>(parent: Option<&'a str>, what: &str) -> hubclient::Result<&'a str> {
    parent.ok_or_else(|| HubError::RequestConstruction(format!("--parent <{what} href> is required")))
}

fn read_file(path: &std::path::Path) -> hubclient::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> hubclient::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> hubclient::Result<()> {
    if json {
        print_json(item)
    } else {
        println!("{}", item.pretty_print());
        Ok(())
    }
}

fn output_page<T, R, F>(page: &ItemList<T>, json: bool, to_row: F) -> hubclient::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        print_json(&page.items)
    } else {
        let rows: Vec<R> = page.items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} of {} items", page.len(), page.total_count);
        Ok(())
    }
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct ProjectRow {
    name: String,
    tier: String,
    href: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            name: p.name.clone(),
            tier: p.project_tier.map(|t| t.to_string()).unwrap_or_default(),
            href: p.meta.href.clone(),
        }
    }
}

#[derive(Tabled)]
struct VersionRow {
    version: String,
    phase: String,
    distribution: String,
    href: String,
}

impl From<&ProjectVersion> for VersionRow {
    fn from(v: &ProjectVersion) -> Self {
        Self {
            version: v.version_name.clone(),
            phase: v.phase.clone(),
            distribution: v.distribution.clone(),
            href: v.meta.href.clone(),
        }
    }
}

#[derive(Tabled)]
struct BomRow {
    component: String,
    version: String,
    licenses: String,
    policy: String,
}

impl From<&BomComponent> for BomRow {
    fn from(c: &BomComponent) -> Self {
        Self {
            component: c.component_name.clone(),
            version: c.component_version_name.clone().unwrap_or_default(),
            licenses: c
                .licenses
                .iter()
                .map(|l| l.license_display.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            policy: c.policy_status.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct VulnerableRow {
    component: String,
    version: String,
    vulnerability: String,
    severity: String,
    remediation: String,
}

impl From<&BomVulnerableComponent> for VulnerableRow {
    fn from(c: &BomVulnerableComponent) -> Self {
        let vuln = &c.vulnerability_with_remediation;
        Self {
            component: c.component_name.clone(),
            version: c.component_version_name.clone(),
            vulnerability: vuln.vulnerability.vulnerability_name.clone(),
            severity: vuln.vulnerability.severity.clone(),
            remediation: vuln.remediation_status.clone(),
        }
    }
}

#[derive(Tabled)]
struct PolicyRow {
    name: String,
    severity: String,
    enabled: bool,
}

impl From<&PolicyRule> for PolicyRow {
    fn from(r: &PolicyRule) -> Self {
        Self {
            name: r.name.clone(),
            severity: r.severity.clone(),
            enabled: r.enabled,
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "user")]
    user_name: String,
    email: String,
    active: bool,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            user_name: u.user_name.clone(),
            email: u.email.clone().unwrap_or_default(),
            active: u.active,
        }
    }
}

#[derive(Tabled)]
struct TokenRow {
    name: String,
    scopes: String,
    href: String,
}

impl From<&ApiToken> for TokenRow {
    fn from(t: &ApiToken) -> Self {
        Self {
            name: t.name.clone(),
            scopes: t.scopes.join(","),
            href: t.meta.href.clone(),
        }
    }
}

#[derive(Tabled)]
struct CodeLocationRow {
    name: String,
    size: String,
    updated: String,
    href: String,
}

impl From<&CodeLocation> for CodeLocationRow {
    fn from(c: &CodeLocation) -> Self {
        Self {
            name: c.name.clone(),
            size: c.scan_size.map(|s| s.to_string()).unwrap_or_default(),
            updated: c.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            href: c.meta.href.clone(),
        }
    }
}

#[derive(Tabled)]
struct ScanRow {
    status: String,
    created: String,
    href: String,
}

impl From<&ScanSummary> for ScanRow {
    fn from(s: &ScanSummary) -> Self {
        Self {
            status: s.status.clone(),
            created: s.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            href: s.meta.href.clone(),
        }
    }
}
