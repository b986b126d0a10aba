//! User and API token models.

use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::{HasMeta, Meta};
use crate::mime::{declare_content_type, APPLICATION_JSON, USER_V4};
use crate::traits::{Delete, Get, List};

/// Path of the user collection.
pub const USERS_PATH: &str = "/api/users";
/// Path of the authenticated user.
pub const CURRENT_USER_PATH: &str = "/api/current-user";
/// Path of the authenticated user's API tokens.
pub const CURRENT_USER_TOKENS_PATH: &str = "/api/current-user/tokens";

/// A Hub user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_name: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// `INTERNAL` or `EXTERNAL` (LDAP/SSO).
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,

    #[serde(default)]
    pub active: bool,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Body for creating a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub user_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    pub active: bool,
}

/// The authenticated user, as returned by `/api/current-user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_name: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(rename = "type", default)]
    pub user_type: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Body for creating an API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTokenRequest {
    pub name: String,
    pub description: String,
    pub scopes: Vec<String>,
}

impl ApiTokenRequest {
    /// A token with `read` scope, plus `write` unless `read_only`.
    pub fn new(name: impl Into<String>, description: impl Into<String>, read_only: bool) -> Self {
        let mut scopes = vec!["read".to_string()];
        if !read_only {
            scopes.push("write".to_string());
        }
        Self {
            name: name.into(),
            description: description.into(),
            scopes,
        }
    }
}

/// An API token of the authenticated user. The secret is not included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

/// Response to an API token creation. `token` is only ever shown once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiTokenResponse {
    pub token: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

declare_content_type!(
    User => USER_V4,
    CurrentUser => USER_V4,
);

impl HasMeta for User {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for CurrentUser {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl crate::mime::ContentType for ApiToken {}

impl HasMeta for ApiToken {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl HasMeta for CreateApiTokenResponse {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Get for User {}
impl Get for CurrentUser {}

impl List for User {
    type Parent = ();

    fn collection_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(USERS_PATH))
    }
}

impl List for ApiToken {
    type Parent = ();

    fn collection_url(client: &HubClient, _parent: &()) -> Result<String> {
        Ok(client.api_url(CURRENT_USER_TOKENS_PATH))
    }
}

impl Delete for ApiToken {}

impl User {
    /// Create a user and return the created record.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 201.
    #[tracing::instrument(skip(client, request), fields(user = %request.user_name))]
    pub async fn create(client: &HubClient, request: &UserRequest) -> Result<User> {
        let (_, user) = client
            .post_json_expect_result(&client.api_url(USERS_PATH), request, USER_V4, 201)
            .await
            .context("error trying to create user")?;
        Ok(user)
    }
}

impl CurrentUser {
    /// Fetch the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch(client: &HubClient) -> Result<Self> {
        Self::get_href(client, &client.api_url(CURRENT_USER_PATH))
            .await
            .context("error trying to retrieve current user")
    }
}

/// Create an API token for the authenticated user.
///
/// Returns the new token's URL (when the server sends one) and its secret.
///
/// # Errors
///
/// Returns an error unless the server answers 201.
#[tracing::instrument(skip(client))]
pub async fn create_api_token(
    client: &HubClient,
    name: &str,
    description: &str,
    read_only: bool,
) -> Result<(Option<String>, String)> {
    let request = ApiTokenRequest::new(name, description, read_only);
    let (location, response): (_, CreateApiTokenResponse) = client
        .post_json_expect_result(
            &client.api_url(CURRENT_USER_TOKENS_PATH),
            &request,
            APPLICATION_JSON,
            201,
        )
        .await
        .context("error trying to create api token")?;

    if location.is_none() {
        tracing::warn!("no location header returned for the new api token");
    }
    Ok((location, response.token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_scopes() {
        assert_eq!(ApiTokenRequest::new("ci", "", true).scopes, vec!["read"]);
        assert_eq!(
            ApiTokenRequest::new("ci", "", false).scopes,
            vec!["read", "write"]
        );
    }

    #[test]
    fn test_user_request_uses_type_key() {
        let request = UserRequest {
            user_name: "jdoe".to_string(),
            user_type: Some("INTERNAL".to_string()),
            active: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "INTERNAL");
        assert_eq!(json["userName"], "jdoe");
        assert!(json.get("password").is_none());
    }
}
