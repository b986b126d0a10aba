//! E2E tests using the mock Hub server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use std::time::Duration;

use hubclient::mock_server::{Fixtures, MockServer, MockState, DEFAULT_API_TOKEN};
use hubclient::{
    BomComponent, BomVulnerableComponent, CancellationToken, CodeLocation, Create, Delete, Get,
    HubClient, HubError, List, ListOptions, PolicyRule, PollConfig, Project, ProjectRequest,
    ProjectVersion, ProjectVersionRequest, Update,
};

async fn connect(server: &MockServer) -> HubClient {
    HubClient::builder(server.url())
        .api_token(DEFAULT_API_TOKEN)
        .await
        .expect("token exchange")
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_health_needs_no_credentials() {
    let server = MockServer::start().await;
    let client = HubClient::new(server.url()).unwrap();

    assert!(client.check_readiness().await.unwrap().healthy);
    assert!(client.check_liveness().await.unwrap().healthy);

    server.state().write().await.healthy = false;
    let err = client.check_readiness().await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));

    server.shutdown().await;
}

// =============================================================================
// Authentication Workflows
// =============================================================================

#[tokio::test]
async fn test_api_token_then_current_version() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let version = client.current_version().await.unwrap();
    assert_eq!(version.version, "2024.1.0");

    server.shutdown().await;
}

#[tokio::test]
async fn test_session_login_workflow() {
    let server = MockServer::start().await;
    let client = HubClient::builder(server.url())
        .session_login("sysadmin", "blackduck")
        .await
        .unwrap();

    let projects = Project::list_all(&client, &(), ListOptions::default()).await.unwrap();
    assert_eq!(projects.len(), 2);

    server.shutdown().await;
}

#[tokio::test]
async fn test_wrong_credentials_are_rejected() {
    let server = MockServer::start().await;

    let err = HubClient::builder(server.url())
        .api_token("not-the-token")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    let err = HubClient::builder(server.url())
        .session_login("sysadmin", "wrong")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    server.shutdown().await;
}

#[tokio::test]
async fn test_writes_without_csrf_are_forbidden() {
    let server = MockServer::start().await;
    let bearer = server.state().write().await.issue_token("bearer");
    let client = HubClient::builder(server.url())
        .bearer_token(bearer)
        .await
        .unwrap();

    Project::list_page(&client, &(), &ListOptions::first_page())
        .await
        .unwrap();
    let err = Project::create(&client, &(), &ProjectRequest::new("no-csrf"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(403));

    server.shutdown().await;
}

// =============================================================================
// Project Workflows
// =============================================================================

#[tokio::test]
async fn test_project_lifecycle() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let location = Project::create(&client, &(), &ProjectRequest::new("lifecycle"))
        .await
        .unwrap();
    let project = Project::get_href(&client, &location).await.unwrap();
    assert_eq!(project.name, "lifecycle");

    let mut request = ProjectRequest::new("lifecycle");
    request.description = Some("updated".to_string());
    project.update(&client, &request).await.unwrap();
    let project = Project::get_href(&client, &location).await.unwrap();
    assert_eq!(project.description.as_deref(), Some("updated"));

    project.delete(&client).await.unwrap();
    let err = Project::get_href(&client, &location).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.server_error().is_some());

    server.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_project_name_is_a_server_error() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let err = Project::create(&client, &(), &ProjectRequest::new("Test Project"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(412));
    let body = err.server_error().unwrap();
    assert!(body
        .error_code
        .as_deref()
        .unwrap()
        .contains("project_name_duplicate_not_allowed"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_versions_and_bom_through_links() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let projects = Project::list_all(&client, &(), ListOptions::default().with_query("name:test"))
        .await
        .unwrap();
    assert_eq!(projects.len(), 1);
    let project = &projects[0];

    let versions = ProjectVersion::list_all(&client, project, ListOptions::default())
        .await
        .unwrap();
    assert_eq!(versions.len(), 2);

    let version = project.find_version(&client, "1.0.0").await.unwrap().unwrap();
    let bom = BomComponent::list_all(&client, &version, ListOptions::default().with_limit(2))
        .await
        .unwrap();
    assert_eq!(bom.len(), 3);
    assert!(bom.iter().any(|c| c.component_name == "log4j-core"));

    let vulnerable = BomVulnerableComponent::list_all(&client, &version, ListOptions::default())
        .await
        .unwrap();
    assert_eq!(vulnerable.len(), 1);
    assert_eq!(
        vulnerable[0].vulnerability_with_remediation.vulnerability.vulnerability_name,
        "CVE-2021-44228"
    );

    assert!(project.find_version(&client, "9.9.9").await.unwrap().is_none());

    server.shutdown().await;
}

#[tokio::test]
async fn test_code_locations_of_a_version() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let project = Project::list_all(&client, &(), ListOptions::default().with_query("name:test"))
        .await
        .unwrap()
        .remove(0);
    let version = project.find_version(&client, "1.0.0").await.unwrap().unwrap();

    let locations = CodeLocation::list_all(&client, &version, ListOptions::default())
        .await
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].mapped_project_version.as_deref(), Some(version.meta.href.as_str()));

    let fetched = CodeLocation::get_href(&client, &locations[0].meta.href).await.unwrap();
    assert_eq!(fetched.name, "test-project/1.0.0 scan");

    server.shutdown().await;
}

#[tokio::test]
async fn test_create_version_under_project() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let project = Project::list_all(&client, &(), ListOptions::default())
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Another Project")
        .unwrap();

    let location = ProjectVersion::create(&client, &project, &ProjectVersionRequest::new("0.1.0"))
        .await
        .unwrap();
    let version = ProjectVersion::get_href(&client, &location).await.unwrap();
    assert_eq!(version.version_name, "0.1.0");
    assert_eq!(version.phase, "DEVELOPMENT");

    assert_eq!(ProjectVersion::count(&client, &project).await.unwrap(), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_policy_rules_page() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let rules = PolicyRule::list_all(&client, &(), ListOptions::default()).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].severity, "BLOCKER");

    server.shutdown().await;
}

#[tokio::test]
async fn test_many_projects_are_paged() {
    let mut state = MockState::new();
    for i in 0..23 {
        state.create_project(ProjectRequest::new(format!("project-{i:02}")));
    }
    let server = MockServer::with_state(state).await;
    let client = HubClient::new(server.url()).unwrap();

    assert_eq!(client.count("/api/projects").await.unwrap(), 23);
    let projects = Project::list_all(&client, &(), ListOptions::default().with_limit(5))
        .await
        .unwrap();
    assert_eq!(projects.len(), 23);

    server.shutdown().await;
}

// =============================================================================
// Rapid Scan Workflows
// =============================================================================

#[tokio::test]
async fn test_rapid_scan_round_trip() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let config = PollConfig::new(Duration::from_millis(20), Duration::from_secs(5)).with_page_limit(1);
    let result = client
        .rapid_scan("{\"header\":true}", &["chunk-a", "chunk-b"], &config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.iter().filter(|c| c.is_in_violation()).count(), 1);

    let state = server.state();
    let state = state.read().await;
    let scan = state.rapid_scans.values().next().unwrap();
    assert_eq!(scan.chunks, vec!["chunk-a", "chunk-b"]);
    assert_eq!(scan.announced_count, Some(2));
    assert!(scan.finished);
    assert!(scan.polls >= 2);

    server.shutdown().await;
}

#[tokio::test]
async fn test_rapid_scan_times_out_when_results_never_arrive() {
    let state = MockState::new().with_rapid_scan_results(
        vec![Fixtures::clean_scan_component("a", "1")],
        u32::MAX,
    );
    let server = MockServer::with_state(state).await;
    let client = HubClient::new(server.url()).unwrap();

    let config = PollConfig::new(Duration::from_millis(20), Duration::from_millis(120));
    let err = client
        .rapid_scan("header", &["chunk"], &config, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::PollTimeout { .. }));

    server.shutdown().await;
}

#[tokio::test]
async fn test_upload_after_finish_is_rejected() {
    let server = MockServer::start_empty().await;
    let client = HubClient::new(server.url()).unwrap();

    let endpoint = client.start_rapid_scan("header").await.unwrap();
    client.upload_bdio_chunks(&endpoint, &["chunk"]).await.unwrap();
    let err = client.upload_bdio_chunks(&endpoint, &["late"]).await.unwrap_err();

    assert_eq!(err.status_code(), Some(409));

    server.shutdown().await;
}
