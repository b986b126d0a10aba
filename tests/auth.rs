//! Authentication tests: API token exchange, session login and bearer tokens.

use hubclient::{AuthMode, AuthStatus, Get, HubClient, HubError, Project};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_json() -> serde_json::Value {
    serde_json::json!({"name": "demo", "_meta": {"href": "/api/projects/p1", "links": []}})
}

async fn mount_project(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/projects/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_api_token_exchange_sets_bearer_and_csrf() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .and(header("authorization", "token my-api-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-CSRF-TOKEN", "csrf-123")
                .set_body_json(serde_json::json!({
                    "bearerToken": "bearer-abc",
                    "expiresInMilliseconds": 7_200_000
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_project(&server).await;

    let client = HubClient::builder(&server.uri())
        .api_token("my-api-token")
        .await
        .unwrap();

    assert_eq!(client.auth_mode().await, AuthMode::ApiToken);
    assert_eq!(client.auth_status().await, AuthStatus::Authenticated);
    assert_eq!(client.bearer_token().await.as_deref(), Some("bearer-abc"));
    assert_eq!(client.csrf_token().await.as_deref(), Some("csrf-123"));
    assert!(client.token_expires_at().await.unwrap() > chrono::Utc::now());

    Project::get_href(&client, "/api/projects/p1").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let get = requests.iter().find(|r| r.url.path() == "/api/projects/p1").unwrap();
    assert_eq!(get.headers.get("authorization").unwrap(), "Bearer bearer-abc");
    assert_eq!(get.headers.get("x-csrf-token").unwrap(), "csrf-123");
}

#[tokio::test]
async fn test_api_token_exchange_without_csrf_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bearerToken": "bearer-abc",
            "expiresInMilliseconds": 7_200_000
        })))
        .mount(&server)
        .await;

    let client = HubClient::new(&server.uri()).unwrap();
    let err = client.authenticate_api_token("my-api-token").await.unwrap_err();

    match &err {
        HubError::Authentication { message, .. } => assert!(message.contains("CSRF")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.auth_status().await, AuthStatus::Unauthenticated);
    assert!(client.bearer_token().await.is_none());
}

#[tokio::test]
async fn test_api_token_exchange_with_empty_bearer_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-CSRF-TOKEN", "csrf-123")
                .set_body_json(serde_json::json!({"bearerToken": ""})),
        )
        .mount(&server)
        .await;

    let client = HubClient::new(&server.uri()).unwrap();
    let err = client.authenticate_api_token("my-api-token").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(client.csrf_token().await.is_none());
}

#[tokio::test]
async fn test_rejected_api_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = HubClient::builder(&server.uri())
        .api_token("wrong")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn test_session_login_uses_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .and(body_string_contains("j_username=sysadmin"))
        .and(body_string_contains("j_password=secret"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("Set-Cookie", "AUTHORIZATION_BEARER=session-1; Path=/")
                .insert_header("X-CSRF-TOKEN", "csrf-session"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_project(&server).await;

    let client = HubClient::builder(&server.uri())
        .session_login("sysadmin", "secret")
        .await
        .unwrap();

    assert_eq!(client.auth_mode().await, AuthMode::Session);
    assert!(client.bearer_token().await.is_none());
    assert_eq!(client.csrf_token().await.as_deref(), Some("csrf-session"));

    Project::get_href(&client, "/api/projects/p1").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let get = requests.iter().find(|r| r.url.path() == "/api/projects/p1").unwrap();
    let cookie = get.headers.get("cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("AUTHORIZATION_BEARER=session-1"));
    assert!(get.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_session_login_requires_204() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = HubClient::new(&server.uri()).unwrap();
    let err = client.login("sysadmin", "secret").await.unwrap_err();

    assert!(matches!(err, HubError::Authentication { status: Some(200), .. }));
    assert_eq!(client.auth_status().await, AuthStatus::Unauthenticated);
}

#[tokio::test]
async fn test_bearer_token_is_sent_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/p1"))
        .and(header("authorization", "Bearer given-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HubClient::builder(&server.uri())
        .bearer_token("given-token")
        .await
        .unwrap();
    assert_eq!(client.auth_mode().await, AuthMode::BearerToken);

    Project::get_href(&client, "/api/projects/p1").await.unwrap();

    let err = client.reauthenticate().await.unwrap_err();
    assert!(matches!(err, HubError::Authentication { status: None, .. }));
}

#[tokio::test]
async fn test_reauthenticate_repeats_token_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-CSRF-TOKEN", "csrf-123")
                .set_body_json(serde_json::json!({"bearerToken": "bearer-abc"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = HubClient::builder(&server.uri())
        .api_token("my-api-token")
        .await
        .unwrap();
    client.reauthenticate().await.unwrap();
    assert_eq!(client.auth_status().await, AuthStatus::Authenticated);
}

#[tokio::test]
async fn test_clones_share_authentication() {
    let server = MockServer::start().await;
    mount_project(&server).await;

    let client = HubClient::new(&server.uri()).unwrap();
    let clone = client.clone();
    client.set_bearer_token("shared").await;

    assert_eq!(clone.bearer_token().await.as_deref(), Some("shared"));
}
