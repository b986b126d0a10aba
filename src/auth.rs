//! Authentication strategies.
//!
//! A client authenticates in one of three ways, chosen when it is built:
//!
//! - **Session**: username and password are posted to the login form; the
//!   session cookie carries authentication from then on.
//! - **Bearer token**: a pre-obtained token is sent as
//!   `Authorization: Bearer <token>`.
//! - **API token**: a long-lived API token is exchanged for a short-lived
//!   bearer token plus a CSRF token.
//!
//! Expired tokens are not refreshed automatically. Callers that see a
//! 401/403 call [`HubClient::reauthenticate`].

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

use crate::client::{header_pair, HubClient, CSRF_HEADER};
use crate::error::{HubError, Result, ResultExt};

/// Path of the API token exchange endpoint.
pub const AUTHENTICATE_PATH: &str = "/api/tokens/authenticate";
/// Path of the session login form.
pub const LOGIN_PATH: &str = "/j_spring_security_check";

/// How the client authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials are sent.
    #[default]
    None,
    /// Session cookie from a username/password login.
    Session,
    /// Caller-supplied bearer token.
    BearerToken,
    /// Bearer token obtained by exchanging an API token.
    ApiToken,
}

/// Where the client is in its authentication lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Response of the API token exchange.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerTokenResponse {
    /// Short-lived bearer token.
    #[serde(default)]
    pub bearer_token: String,

    /// Lifetime of the bearer token.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "expiresInMilliseconds", default)]
    pub expires_in: Duration,
}

/// Credentials kept so a session can be re-established on demand.
#[derive(Clone)]
enum Credentials {
    Password { username: String, password: String },
    ApiToken(String),
}

/// Mutable authentication state shared by clones of a client.
#[derive(Clone, Default)]
pub(crate) struct AuthState {
    mode: AuthMode,
    status: AuthStatus,
    bearer: Option<String>,
    csrf: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    credentials: Option<Credentials>,
}

impl AuthState {
    /// Headers this state adds to every authenticated request.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer {
            let (name, value) = header_pair(AUTHORIZATION.as_str(), &format!("Bearer {token}"))?;
            headers.insert(name, value);
        }
        if let Some(csrf) = &self.csrf {
            let (name, value) = header_pair(CSRF_HEADER, csrf)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl HubClient {
    /// The active authentication strategy.
    pub async fn auth_mode(&self) -> AuthMode {
        self.auth.read().await.mode
    }

    /// Current authentication status.
    pub async fn auth_status(&self) -> AuthStatus {
        self.auth.read().await.status
    }

    /// Bearer token sent with requests, if any.
    pub async fn bearer_token(&self) -> Option<String> {
        self.auth.read().await.bearer.clone()
    }

    /// CSRF token sent with requests, if one was issued.
    pub async fn csrf_token(&self) -> Option<String> {
        self.auth.read().await.csrf.clone()
    }

    /// When the exchanged bearer token expires.
    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.auth.read().await.expires_at
    }

    /// Use a pre-obtained bearer token from now on.
    pub async fn set_bearer_token(&self, token: impl Into<String>) {
        let mut state = self.auth.write().await;
        state.mode = AuthMode::BearerToken;
        state.status = AuthStatus::Authenticated;
        state.bearer = Some(token.into());
        state.expires_at = None;
        state.credentials = None;
    }

    /// Log in with a username and password.
    ///
    /// The server answers 204 and sets a session cookie, which the client's
    /// cookie store sends with later requests.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Authentication`] unless the server answers 204.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.begin_authentication().await;

        match self.post_login(username, password).await {
            Ok(csrf) => {
                let mut state = self.auth.write().await;
                state.mode = AuthMode::Session;
                state.status = AuthStatus::Authenticated;
                state.bearer = None;
                state.csrf = csrf;
                state.expires_at = None;
                state.credentials = Some(Credentials::Password {
                    username: username.to_string(),
                    password: password.to_string(),
                });
                tracing::debug!("logged in with session credentials");
                Ok(())
            }
            Err(e) => {
                self.fail_authentication().await;
                Err(e)
            }
        }
    }

    /// Exchange an API token for a bearer token and CSRF token.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Authentication`] if the server does not answer
    /// 200, omits the CSRF header, or returns an empty bearer token.
    #[tracing::instrument(skip(self, api_token))]
    pub async fn authenticate_api_token(&self, api_token: &str) -> Result<()> {
        self.begin_authentication().await;

        match self.exchange_api_token(api_token).await {
            Ok((token, csrf)) => {
                let expires_at = chrono::Duration::from_std(token.expires_in)
                    .ok()
                    .map(|lifetime| Utc::now() + lifetime);

                let mut state = self.auth.write().await;
                state.mode = AuthMode::ApiToken;
                state.status = AuthStatus::Authenticated;
                state.bearer = Some(token.bearer_token);
                state.csrf = Some(csrf);
                state.expires_at = expires_at;
                state.credentials = Some(Credentials::ApiToken(api_token.to_string()));
                tracing::debug!("logged in with API token");
                Ok(())
            }
            Err(e) => {
                self.fail_authentication().await;
                Err(e)
            }
        }
    }

    /// Run the original authentication again, e.g. after a 401.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Authentication`] when the client has nothing to
    /// re-run (no credentials, or a caller-supplied bearer token), or when
    /// the login itself fails.
    pub async fn reauthenticate(&self) -> Result<()> {
        let credentials = self.auth.read().await.credentials.clone();
        match credentials {
            Some(Credentials::ApiToken(token)) => self.authenticate_api_token(&token).await,
            Some(Credentials::Password { username, password }) => {
                self.login(&username, &password).await
            }
            None => Err(HubError::Authentication {
                message: "no credentials to re-authenticate with".to_string(),
                status: None,
            }),
        }
    }

    async fn begin_authentication(&self) {
        self.auth.write().await.status = AuthStatus::Authenticating;
    }

    async fn fail_authentication(&self) {
        let mut state = self.auth.write().await;
        state.status = AuthStatus::Unauthenticated;
        state.bearer = None;
        state.csrf = None;
        state.expires_at = None;
    }

    async fn post_login(&self, username: &str, password: &str) -> Result<Option<String>> {
        let url = self.api_url(LOGIN_PATH);
        let response = self
            .http
            .post(&url)
            .header(USER_AGENT, self.user_agent_value())
            .form(&[("j_username", username), ("j_password", password)])
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(HubError::Authentication {
                message: format!("got a {} response instead of a 204", status.as_u16()),
                status: Some(status.as_u16()),
            });
        }

        Ok(csrf_from(&response))
    }

    async fn exchange_api_token(&self, api_token: &str) -> Result<(BearerTokenResponse, String)> {
        let url = self.api_url(AUTHENTICATE_PATH);
        let (auth_name, auth_value) =
            header_pair(AUTHORIZATION.as_str(), &format!("token {api_token}"))?;

        let response = self
            .http
            .post(&url)
            .header(USER_AGENT, self.user_agent_value())
            .header(auth_name, auth_value)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(HubError::Authentication {
                message: format!("got a {} response instead of a 200", status.as_u16()),
                status: Some(status.as_u16()),
            });
        }

        let csrf = csrf_from(&response).ok_or_else(|| HubError::Authentication {
            message: "CSRF token not found".to_string(),
            status: Some(status.as_u16()),
        })?;

        let body = response
            .text()
            .await
            .with_context(|| format!("reading response from {url}"))?;
        let token: BearerTokenResponse =
            serde_json::from_str(&body).context("error decoding bearer token response")?;

        if token.bearer_token.is_empty() {
            return Err(HubError::Authentication {
                message: "bearer token not found".to_string(),
                status: Some(status.as_u16()),
            });
        }

        Ok((token, csrf))
    }
}

fn csrf_from(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
