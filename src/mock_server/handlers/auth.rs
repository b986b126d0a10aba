//! Authentication endpoint handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{hub_error, SESSION_COOKIE};
use crate::mock_server::state::MockState;
use crate::{BearerTokenResponse, CSRF_HEADER};

/// Lifetime reported for exchanged bearer tokens.
const BEARER_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// Form posted to the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub j_username: String,
    pub j_password: String,
}

/// POST /api/tokens/authenticate
pub async fn authenticate(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("token "));

    let valid = presented.is_some() && presented == state.api_token.as_deref();
    if !valid {
        return hub_error(
            StatusCode::UNAUTHORIZED,
            "core.rest.unauthorized",
            "Invalid API token",
        );
    }

    let body = BearerTokenResponse {
        bearer_token: state.issue_token("bearer"),
        expires_in: BEARER_LIFETIME,
    };
    (
        StatusCode::OK,
        [(CSRF_HEADER, state.csrf_token.clone())],
        Json(body),
    )
        .into_response()
}

/// POST /j_spring_security_check
pub async fn login(
    State(state): State<Arc<RwLock<MockState>>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut state = state.write().await;

    let valid = state
        .login
        .as_ref()
        .map(|(user, password)| *user == form.j_username && *password == form.j_password)
        .unwrap_or(false);
    if !valid {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let session = state.issue_token("session");
    (
        StatusCode::NO_CONTENT,
        [
            (
                header::SET_COOKIE.as_str(),
                format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly"),
            ),
            (CSRF_HEADER, state.csrf_token.clone()),
        ],
    )
        .into_response()
}
