//! CLI argument parsing tests.

use std::path::PathBuf;

use clap::Parser;
use hubclient::cli::{Cli, Command, Entity};
use hubclient::HubError;

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from([
        "hubclient",
        "get",
        "project",
        "https://hub.example.com/api/projects/p1",
    ]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { entity, href } => {
            assert_eq!(entity, Entity::Project);
            assert_eq!(href, "https://hub.example.com/api/projects/p1");
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_list_with_paging_options() {
    let cli = Cli::parse_from([
        "hubclient",
        "list",
        "projects",
        "--limit",
        "25",
        "--offset",
        "50",
        "--q",
        "name:demo",
        "--sort",
        "name asc",
    ]);

    match cli.command {
        Command::List {
            entity,
            parent,
            limit,
            offset,
            q,
            sort,
            all,
        } => {
            assert_eq!(entity, Entity::Project);
            assert!(parent.is_none());
            assert_eq!(limit, Some(25));
            assert_eq!(offset, Some(50));
            assert_eq!(q.as_deref(), Some("name:demo"));
            assert_eq!(sort.as_deref(), Some("name asc"));
            assert!(!all);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_cli_list_with_parent_and_all() {
    let cli = Cli::parse_from([
        "hubclient",
        "list",
        "bom",
        "--parent",
        "/api/projects/p1/versions/v1",
        "--all",
    ]);

    match cli.command {
        Command::List {
            entity, parent, all, ..
        } => {
            assert_eq!(entity, Entity::Component);
            assert_eq!(parent.as_deref(), Some("/api/projects/p1/versions/v1"));
            assert!(all);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_entity_aliases() {
    let cases = [
        ("versions", Entity::Version),
        ("components", Entity::Component),
        ("vulnerable-components", Entity::VulnerableComponent),
        ("policies", Entity::PolicyRule),
        ("policy-rules", Entity::PolicyRule),
        ("users", Entity::User),
        ("tokens", Entity::ApiToken),
        ("vulnerabilities", Entity::Vulnerability),
        ("code-locations", Entity::CodeLocation),
        ("scans", Entity::ScanSummary),
    ];

    for (alias, expected) in cases {
        let cli = Cli::parse_from(["hubclient", "list", alias]);
        match cli.command {
            Command::List { entity, .. } => assert_eq!(entity, expected, "alias {alias}"),
            _ => panic!("Expected List command"),
        }
    }
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "hubclient",
        "version",
        "--json",
        "--url",
        "https://hub.example.com",
        "--api-token",
        "secret",
        "--timeout-secs",
        "30",
        "--insecure",
    ]);

    assert!(cli.json);
    assert!(matches!(cli.command, Command::Version));
    assert_eq!(cli.connection.url.as_deref(), Some("https://hub.example.com"));
    assert_eq!(cli.connection.api_token.as_deref(), Some("secret"));
    assert_eq!(cli.connection.timeout_secs, Some(30));
    assert!(cli.connection.insecure);
}

#[test]
fn test_cli_parses_rapid_scan() {
    let cli = Cli::parse_from([
        "hubclient",
        "rapid-scan",
        "header.jsonld",
        "chunk-1.jsonld",
        "chunk-2.jsonld",
        "--interval-secs",
        "2",
    ]);

    match cli.command {
        Command::RapidScan(args) => {
            assert_eq!(args.header, PathBuf::from("header.jsonld"));
            assert_eq!(args.chunks.len(), 2);
            assert_eq!(args.interval_secs, 2);
            assert_eq!(args.wait_secs, 300);
        }
        _ => panic!("Expected RapidScan command"),
    }
}

#[test]
fn test_rapid_scan_requires_a_chunk() {
    let result = Cli::try_parse_from(["hubclient", "rapid-scan", "header.jsonld"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_count_and_health() {
    let cli = Cli::parse_from(["hubclient", "count", "/api/projects"]);
    assert!(matches!(cli.command, Command::Count { ref url } if url == "/api/projects"));

    let cli = Cli::parse_from(["hubclient", "health"]);
    assert!(matches!(cli.command, Command::Health));
}

#[test]
fn test_unknown_entity_is_rejected() {
    let result = Cli::try_parse_from(["hubclient", "list", "revisions"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_connect_without_url_is_config_missing() {
    let cli = Cli::parse_from(["hubclient", "health"]);
    let mut connection = cli.connection;
    connection.url = None;

    let err = connection.connect().await.unwrap_err();
    assert!(matches!(err, HubError::ConfigMissing(_)));
}

#[test]
fn test_rapid_scan_rejects_zero_interval() {
    let result = Cli::try_parse_from([
        "hubclient",
        "rapid-scan",
        "header.jsonld",
        "chunk-1.jsonld",
        "--interval-secs",
        "0",
    ]);
    assert!(result.is_err());
}
