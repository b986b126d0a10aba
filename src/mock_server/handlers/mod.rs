//! HTTP request handlers for the mock server.

pub mod auth;
pub mod projects;
pub mod rapid_scans;
pub mod status;

pub use auth::*;
pub use projects::*;
pub use rapid_scans::*;
pub use status::*;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::mock_server::state::{meta, MockState};
use crate::{ItemList, ServerErrorBody, CSRF_HEADER};

/// Name of the session cookie set by the login form.
pub const SESSION_COOKIE: &str = "AUTHORIZATION_BEARER";

/// Page size used when a list request has no `limit`.
const DEFAULT_PAGE_SIZE: usize = 10;

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub q: Option<String>,
    #[allow(dead_code)] // accepted for parity with the Hub, ordering is fixed
    pub sort: Option<String>,
}

/// Slice `items` into one Hub-style page.
pub(crate) fn page<T: Serialize + Clone>(items: &[T], query: &PageQuery, href: &str) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let page = ItemList {
        total_count: items.len() as u64,
        meta: meta(href, &[]),
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        ..ItemList::default()
    };
    (StatusCode::OK, Json(page)).into_response()
}

/// A Hub-style error response.
pub(crate) fn hub_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = ServerErrorBody {
        error_message: Some(message.into()),
        error_code: Some(format!("{{{code}}}")),
        ..ServerErrorBody::default()
    };
    (status, Json(body)).into_response()
}

pub(crate) fn not_found(what: &str, id: &str) -> Response {
    hub_error(
        StatusCode::NOT_FOUND,
        "central.constraint_violation.not_found",
        format!("No {what} found with id: {id}"),
    )
}

/// Check the caller's credentials; writes also need the CSRF token.
///
/// Returns the rejection to send when the request is not allowed.
pub(crate) fn guard(state: &MockState, headers: &HeaderMap, write: bool) -> Result<(), Response> {
    if !state.require_auth {
        return Ok(());
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .filter_map(|c| c.trim().split_once('='))
                .find(|(name, _)| *name == SESSION_COOKIE)
                .map(|(_, value)| value)
        });

    let authenticated = bearer.or(session).map(|t| state.is_issued(t)).unwrap_or(false);
    if !authenticated {
        return Err(hub_error(
            StatusCode::UNAUTHORIZED,
            "core.rest.unauthorized",
            "Authentication required",
        ));
    }

    let csrf = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
    if write && csrf != Some(state.csrf_token.as_str()) {
        return Err(hub_error(
            StatusCode::FORBIDDEN,
            "core.rest.csrf_invalid",
            "Missing or invalid CSRF token",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_guard_accepts_issued_bearer_and_cookie() {
        let mut state = MockState::new().with_api_token("t");
        let bearer = state.issue_token("bearer");
        let session = state.issue_token("session");

        let mut headers = HeaderMap::new();
        assert!(guard(&state, &headers, false).is_err());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bearer}")).unwrap(),
        );
        assert!(guard(&state, &headers, false).is_ok());
        assert!(guard(&state, &headers, true).is_err());

        headers.insert(CSRF_HEADER, HeaderValue::from_static("mock-csrf-token"));
        assert!(guard(&state, &headers, true).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("other=1; {SESSION_COOKIE}={session}")).unwrap(),
        );
        assert!(guard(&state, &headers, false).is_ok());
    }

    #[test]
    fn test_guard_open_without_auth() {
        let state = MockState::new();
        assert!(guard(&state, &HeaderMap::new(), true).is_ok());
    }
}
