//! Error types for Hub API operations.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during Hub API operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// Configuration is missing or incomplete.
    #[error("Hub configuration required: {0}")]
    ConfigMissing(String),

    /// The request could not be built (bad header value, bad options, ...).
    #[error("Invalid request: {0}")]
    RequestConstruction(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a status code the call does not accept.
    #[error("got a {status} response instead of {expected:?}{detail}", detail = server_message(.server_error))]
    UnexpectedStatus {
        status: u16,
        expected: Vec<u16>,
        server_error: Option<ServerErrorBody>,
        body: String,
    },

    /// Local file error, e.g. a scan document that cannot be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Login or token exchange failed.
    #[error("Authentication failed: {message}")]
    Authentication { message: String, status: Option<u16> },

    /// A response lacked a header the call depends on, e.g. `Location`.
    #[error("response is missing the {0} header")]
    MissingHeader(String),

    /// A `_meta.links` lookup found no link with the relation.
    #[error("no relation '{0}' found")]
    LinkNotFound(String),

    /// Rapid scan results were not ready before the timeout elapsed.
    #[error("polling for rapid scan result timed out after {timeout:?}: {endpoint}")]
    PollTimeout { endpoint: String, timeout: Duration },

    /// Rapid scan polling was cancelled by the caller.
    #[error("polling for rapid scan result was cancelled: {endpoint}")]
    PollCancelled { endpoint: String },

    /// An error annotated with the call context it unwound through.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<HubError>,
    },
}

fn server_message(server_error: &Option<ServerErrorBody>) -> String {
    match server_error {
        Some(body) => match (&body.error_code, &body.error_message) {
            (Some(code), Some(msg)) => format!(" ({code}: {msg})"),
            (None, Some(msg)) => format!(" ({msg})"),
            (Some(code), None) => format!(" ({code})"),
            (None, None) => String::new(),
        },
        None => String::new(),
    }
}

/// Structured error body returned by the Hub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorBody {
    /// Human readable message.
    #[serde(default)]
    pub error_message: Option<String>,

    /// Machine readable code, e.g. `{central.constraint_violation.project_name_duplicate_not_allowed}`.
    #[serde(default)]
    pub error_code: Option<String>,

    /// Field arguments attached to validation failures.
    #[serde(default)]
    pub arguments: BTreeMap<String, serde_json::Value>,

    /// Nested errors.
    #[serde(default)]
    pub errors: Vec<ServerErrorBody>,

    /// Server-side log reference.
    #[serde(default)]
    pub log_ref: Option<String>,
}

impl HubError {
    /// Wrap this error with additional context, keeping it as the source.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        HubError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every context layer.
    pub fn root(&self) -> &HubError {
        let mut err = self;
        while let HubError::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// HTTP status code carried anywhere in the chain.
    pub fn status_code(&self) -> Option<u16> {
        match self.root() {
            HubError::UnexpectedStatus { status, .. } => Some(*status),
            HubError::Authentication { status, .. } => *status,
            HubError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Decoded server error body, when the server sent one.
    pub fn server_error(&self) -> Option<&ServerErrorBody> {
        match self.root() {
            HubError::UnexpectedStatus { server_error, .. } => server_error.as_ref(),
            _ => None,
        }
    }

    /// Returns true for a 404 response or a missing link relation.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), HubError::LinkNotFound(_)) || self.status_code() == Some(404)
    }

    /// Returns true for 401/403 responses and failed authentication.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.root(), HubError::Authentication { .. })
            || matches!(self.status_code(), Some(401) | Some(403))
    }

    /// Returns true when the server could not be reached.
    pub fn is_network(&self) -> bool {
        match self.root() {
            HubError::HttpError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Returns true when a poll gave up waiting.
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), HubError::PollTimeout { .. })
    }
}

/// Result type alias for Hub operations.
pub type Result<T> = core::result::Result<T, HubError>;

/// Annotate errors as they propagate.
pub trait ResultExt<T> {
    /// Wrap the error (if any) with `context`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Wrap the error (if any) with a lazily built context.
    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T, E: Into<HubError>> ResultExt<T> for core::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }

    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> HubError {
        HubError::UnexpectedStatus {
            status: 412,
            expected: vec![201],
            server_error: Some(ServerErrorBody {
                error_message: Some("Project name already exists".to_string()),
                error_code: Some("{central.constraint_violation.project_name_duplicate_not_allowed}".to_string()),
                ..Default::default()
            }),
            body: String::new(),
        }
    }

    #[test]
    fn test_context_preserves_status_and_server_error() {
        let err = conflict()
            .context("POST https://hub.example.com/api/projects")
            .context("while creating project");

        assert_eq!(err.status_code(), Some(412));
        let body = err.server_error().expect("server error survives wrapping");
        assert_eq!(
            body.error_code.as_deref(),
            Some("{central.constraint_violation.project_name_duplicate_not_allowed}")
        );

        let message = err.to_string();
        assert!(message.starts_with("while creating project: POST"));
        assert!(message.contains("got a 412 response"));
        assert!(message.contains("Project name already exists"));
    }

    #[test]
    fn test_classification() {
        let not_found = HubError::UnexpectedStatus {
            status: 404,
            expected: vec![200],
            server_error: None,
            body: String::new(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_unauthorized());

        assert!(HubError::LinkNotFound("versions".into()).is_not_found());

        let unauthorized = HubError::UnexpectedStatus {
            status: 401,
            expected: vec![200],
            server_error: None,
            body: String::new(),
        }
        .context("GET /api/projects");
        assert!(unauthorized.is_unauthorized());
        assert!(!unauthorized.is_network());
    }

    #[test]
    fn test_result_ext_wraps_foreign_errors() {
        let parsed: core::result::Result<u32, serde_json::Error> = serde_json::from_str("nope");
        let err = parsed.context("decoding count").unwrap_err();
        assert!(matches!(err.root(), HubError::ParseError(_)));
        assert!(err.to_string().starts_with("decoding count: "));
    }

    #[test]
    fn test_server_error_body_deserialize_nested() {
        let json = r#"{
            "errorMessage": "Validation failed",
            "errorCode": "{central.constraint_violation}",
            "arguments": {"fieldname": "name"},
            "errors": [{"errorMessage": "name must not be empty", "errorCode": "{central.required}"}],
            "logRef": "central.abc"
        }"#;
        let body: ServerErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.errors.len(), 1);
        assert_eq!(body.arguments["fieldname"], "name");
        assert_eq!(body.log_ref.as_deref(), Some("central.abc"));
    }
}
