//! Hub API client.
//!
//! Low-level HTTP transport that handles authentication headers, status
//! validation and JSON encoding. Higher-level operations are implemented via
//! traits on entity types and in the [`pagination`](crate::pagination) and
//! [`rapid_scan`](crate::rapid_scan) modules.

use std::env;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION, USER_AGENT,
};
use reqwest::{Body, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::auth::AuthState;
use crate::error::{HubError, Result, ResultExt, ServerErrorBody};
use crate::mime::ContentType;

/// Header carrying the CSRF token once one has been issued.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_USER_AGENT: &str = concat!("hubclient/", env!("CARGO_PKG_VERSION"));

/// Which extra diagnostics the transport emits through `tracing`.
///
/// Flags combine with `|`:
///
/// ```
/// use hubclient::DebugFlags;
///
/// let flags = DebugFlags::TIMINGS | DebugFlags::CONTENT;
/// assert!(flags.contains(DebugFlags::CONTENT));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DebugFlags(u8);

impl DebugFlags {
    /// No extra diagnostics.
    pub const NONE: Self = Self(0);
    /// Log request start and elapsed milliseconds.
    pub const TIMINGS: Self = Self(1);
    /// Log raw response bodies.
    pub const CONTENT: Self = Self(1 << 1);

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Raw bit value.
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for DebugFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Hub API client.
///
/// Owns a pooled HTTP client, the session's authentication state and an
/// immutable set of default headers. Entity-specific operations are
/// implemented via the `Get`, `List`, `Create`, `Update` and `Delete`
/// traits on model types.
///
/// Clones share the connection pool and the authentication state.
///
/// # Example
///
/// ```no_run
/// use hubclient::HubClient;
///
/// # async fn example() -> hubclient::Result<()> {
/// // Create from environment variables
/// let client = HubClient::from_env().await?;
///
/// // Or configure manually
/// let client = HubClient::builder("https://hub.example.com")
///     .api_token("my-api-token")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HubClient {
    pub(crate) http: Client,
    base_url: Arc<Url>,
    user_agent: HeaderValue,
    headers: Arc<HeaderMap>,
    pub(crate) auth: Arc<RwLock<AuthState>>,
    debug: DebugFlags,
}

impl fmt::Debug for HubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubClient")
            .field("base_url", &self.base_url.as_str())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`HubClient`].
///
/// Obtained from [`HubClient::builder`]. The terminal methods decide the
/// authentication strategy: [`build`](Self::build) (none),
/// [`bearer_token`](Self::bearer_token), [`session_login`](Self::session_login)
/// or [`api_token`](Self::api_token).
#[derive(Debug, Clone)]
pub struct HubClientBuilder {
    base_url: String,
    timeout: Duration,
    debug: DebugFlags,
    user_agent: String,
    headers: Vec<(String, String)>,
    accept_invalid_certs: bool,
}

impl HubClientBuilder {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            debug: DebugFlags::NONE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            accept_invalid_certs: false,
        }
    }

    /// Per-request timeout (default 60 seconds).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra diagnostics to emit.
    #[must_use]
    pub fn debug_flags(mut self, flags: DebugFlags) -> Self {
        self.debug = flags;
        self
    }

    /// User agent sent with every request.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a session-level default header. Repeating a name adds a value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Skip TLS certificate verification. Only for self-signed test servers.
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or a header is invalid, or the HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<HubClient> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(HubError::RequestConstruction(format!(
                "base URL {} cannot be a base",
                self.base_url
            )));
        }

        let user_agent = HeaderValue::from_str(&self.user_agent).map_err(|e| {
            HubError::RequestConstruction(format!("invalid user agent {:?}: {e}", self.user_agent))
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let (name, value) = header_pair(name, value)?;
            headers.append(name, value);
        }

        let http = Client::builder()
            .cookie_store(true)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(HubError::HttpError)?;

        Ok(HubClient {
            http,
            base_url: Arc::new(base_url),
            user_agent,
            headers: Arc::new(headers),
            auth: Arc::new(RwLock::new(AuthState::default())),
            debug: self.debug,
        })
    }

    /// Build a client that sends `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub async fn bearer_token(self, token: impl Into<String>) -> Result<HubClient> {
        let client = self.build()?;
        client.set_bearer_token(token).await;
        Ok(client)
    }

    /// Build a client and log in with a username and password.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Authentication`] if the login is rejected.
    pub async fn session_login(self, username: &str, password: &str) -> Result<HubClient> {
        let client = self.build()?;
        client.login(username, password).await?;
        Ok(client)
    }

    /// Build a client and exchange an API token for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Authentication`] if the exchange fails.
    pub async fn api_token(self, api_token: &str) -> Result<HubClient> {
        let client = self.build()?;
        client.authenticate_api_token(api_token).await?;
        Ok(client)
    }
}

impl HubClient {
    /// Start configuring a client for the Hub at `base_url`.
    pub fn builder(base_url: &str) -> HubClientBuilder {
        HubClientBuilder::new(base_url)
    }

    /// Create an unauthenticated client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Create a client from environment variables.
    ///
    /// Uses `BLACKDUCK_URL` for the server and the first credential found
    /// among `BLACKDUCK_API_TOKEN`, `BLACKDUCK_BEARER_TOKEN` and
    /// `BLACKDUCK_USERNAME` + `BLACKDUCK_PASSWORD`. `BLACKDUCK_TIMEOUT_SECS`
    /// overrides the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `BLACKDUCK_URL` is not set, no credential is set,
    /// or authentication fails.
    pub async fn from_env() -> Result<Self> {
        let base_url = env::var("BLACKDUCK_URL").map_err(|_| {
            HubError::ConfigMissing("BLACKDUCK_URL environment variable not set".to_string())
        })?;

        let mut builder = Self::builder(&base_url);
        if let Ok(secs) = env::var("BLACKDUCK_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                HubError::ConfigMissing(format!("BLACKDUCK_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Ok(token) = env::var("BLACKDUCK_API_TOKEN") {
            return builder.api_token(&token).await;
        }
        if let Ok(token) = env::var("BLACKDUCK_BEARER_TOKEN") {
            return builder.bearer_token(token).await;
        }
        match (env::var("BLACKDUCK_USERNAME"), env::var("BLACKDUCK_PASSWORD")) {
            (Ok(user), Ok(password)) => builder.session_login(&user, &password).await,
            _ => Err(HubError::ConfigMissing(
                "set BLACKDUCK_API_TOKEN, BLACKDUCK_BEARER_TOKEN or BLACKDUCK_USERNAME/BLACKDUCK_PASSWORD"
                    .to_string(),
            )),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Debug flags this client was built with.
    pub fn debug_flags(&self) -> DebugFlags {
        self.debug
    }

    /// Absolute URL for an API path such as `/api/projects`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// A client that also sends `name: value` on every request.
    ///
    /// The original client is unchanged; both share the connection pool and
    /// authentication state.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::RequestConstruction`] for an invalid header.
    pub fn with_header(&self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = header_pair(name, value)?;
        let mut headers = (*self.headers).clone();
        headers.insert(name, value);
        Ok(Self {
            headers: Arc::new(headers),
            ..self.clone()
        })
    }

    /// Session-level default headers.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn user_agent_value(&self) -> HeaderValue {
        self.user_agent.clone()
    }

    /// Release this handle.
    ///
    /// The connection pool closes once every clone has been closed or dropped.
    pub fn close(self) {
        tracing::debug!(base_url = %self.base_url, "closing hub client");
    }

    /// GET a JSON document with status 200, using `T`'s content type as `Accept`.
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned + ContentType,
    {
        self.get_json_with(url, &[200], None).await
    }

    /// GET a JSON document.
    ///
    /// `Accept` is `accept` when given, else `T`'s declared content type,
    /// else omitted.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnexpectedStatus`] if the status is not in
    /// `expected` and [`HubError::ParseError`] if the body does not decode.
    #[tracing::instrument(skip(self))]
    pub async fn get_json_with<T>(&self, url: &str, expected: &[u16], accept: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned + ContentType,
    {
        let call = accept_header(accept.or_else(|| T::content_type()))?;
        let response = self.send(Method::GET, url, call, None, expected).await?;
        self.decode(response).await
    }

    /// GET without reading the body; only the status is checked.
    #[tracing::instrument(skip(self))]
    pub async fn get_status(&self, url: &str, expected: &[u16], accept: Option<&str>) -> Result<StatusCode> {
        let call = accept_header(accept)?;
        let response = self.send(Method::GET, url, call, None, expected).await?;
        Ok(response.status())
    }

    /// GET the raw body as text.
    #[tracing::instrument(skip(self))]
    pub async fn get_string(
        &self,
        url: &str,
        expected: &[u16],
        accept: Option<&str>,
    ) -> Result<(StatusCode, String)> {
        let call = accept_header(accept)?;
        let response = self.send(Method::GET, url, call, None, expected).await?;
        let status = response.status();
        let body = self.read_body(response).await?;
        Ok((status, body))
    }

    /// PUT a text body. `extra` headers are applied last and replace any
    /// header with the same name.
    #[tracing::instrument(skip(self, body, extra))]
    pub async fn put_string(
        &self,
        url: &str,
        body: String,
        content_type: &str,
        expected: u16,
        extra: &HeaderMap,
    ) -> Result<()> {
        let mut call = content_type_header(content_type)?;
        merge_headers(&mut call, extra);
        self.send(Method::PUT, url, call, Some(body.into()), &[expected])
            .await?;
        Ok(())
    }

    /// PUT a JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put_json<B>(&self, url: &str, body: &B, content_type: &str, expected: u16) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = encode_json(body)?;
        let call = content_type_header(content_type)?;
        self.send(Method::PUT, url, call, Some(body.into()), &[expected])
            .await?;
        Ok(())
    }

    /// POST a text body; returns the `Location` header, if any.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_string(
        &self,
        url: &str,
        body: String,
        content_type: &str,
        expected: u16,
    ) -> Result<Option<String>> {
        let call = content_type_header(content_type)?;
        let response = self
            .send(Method::POST, url, call, Some(body.into()), &[expected])
            .await?;
        Ok(location(&response))
    }

    /// POST a JSON body; returns the `Location` header, if any.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        content_type: &str,
        expected: u16,
    ) -> Result<Option<String>>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = encode_json(body)?;
        let call = content_type_header(content_type)?;
        let response = self
            .send(Method::POST, url, call, Some(body.into()), &[expected])
            .await?;
        Ok(location(&response))
    }

    /// POST a JSON body and decode the JSON response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json_expect_result<B, T>(
        &self,
        url: &str,
        body: &B,
        content_type: &str,
        expected: u16,
    ) -> Result<(Option<String>, T)>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = encode_json(body)?;
        let call = content_type_header(content_type)?;
        let response = self
            .send(Method::POST, url, call, Some(body.into()), &[expected])
            .await?;
        let location = location(&response);
        let result = self.decode(response).await?;
        Ok((location, result))
    }

    /// POST a raw body (e.g. source text) and decode the JSON response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_raw_expect_result<T>(
        &self,
        url: &str,
        body: String,
        content_type: &str,
        expected: u16,
    ) -> Result<(Option<String>, T)>
    where
        T: DeserializeOwned,
    {
        let call = content_type_header(content_type)?;
        let response = self
            .send(Method::POST, url, call, Some(body.into()), &[expected])
            .await?;
        let location = location(&response);
        let result = self.decode(response).await?;
        Ok((location, result))
    }

    /// POST the contents of a file, e.g. a BDIO scan document; returns the
    /// `Location` header, if any.
    ///
    /// The file is streamed rather than read into memory.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Io`] when the file cannot be opened, otherwise the
    /// same errors as [`post_string`](Self::post_string).
    #[tracing::instrument(skip(self))]
    pub async fn post_file(
        &self,
        url: &str,
        path: &Path,
        content_type: &str,
        expected: u16,
    ) -> Result<Option<String>> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("error opening {}", path.display()))?;
        let body = Body::wrap_stream(ReaderStream::new(file));
        let call = content_type_header(content_type)?;
        let response = self
            .send(Method::POST, url, call, Some(body), &[expected])
            .await?;
        Ok(location(&response))
    }

    /// DELETE a resource.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, url: &str, content_type: &str, expected: u16) -> Result<()> {
        let call = content_type_header(content_type)?;
        self.send(Method::DELETE, url, call, None, &[expected])
            .await?;
        Ok(())
    }

    /// GET without any authentication headers.
    pub(crate) async fn get_json_unauthenticated<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let call = accept_header(Some(crate::mime::APPLICATION_JSON))?;
        let response = self
            .dispatch(Method::GET, url, call, None, &[200], false)
            .await?;
        self.decode(response).await
    }

    /// Resolve `url` as absolute, or relative to the base URL.
    pub(crate) fn resolve(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Url::parse(&self.api_url(url))?),
            Err(e) => Err(e.into()),
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        call: HeaderMap,
        body: Option<Body>,
        expected: &[u16],
    ) -> Result<Response> {
        self.dispatch(method, url, call, body, expected, true).await
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        call: HeaderMap,
        body: Option<Body>,
        expected: &[u16],
        with_auth: bool,
    ) -> Result<Response> {
        let context = format!("{method} {url}");
        self.execute(method, url, call, body, expected, with_auth)
            .await
            .context(context)
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        call: HeaderMap,
        body: Option<Body>,
        expected: &[u16],
        with_auth: bool,
    ) -> Result<Response> {
        let target = self.resolve(url)?;
        let headers = self.request_headers(&call, with_auth).await?;

        tracing::debug!(
            method = %method,
            url = %target,
            headers = ?masked_headers(&headers),
            "sending request"
        );

        let mut request = self.http.request(method.clone(), target).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let started = Instant::now();
        let response = request.send().await?;

        if self.debug.contains(DebugFlags::TIMINGS) {
            tracing::debug!(
                method = %method,
                url,
                elapsed_ms = started.elapsed().as_millis(),
                "request finished"
            );
        }

        self.check_response(response, expected).await
    }

    /// Layer headers: user agent, then auth, then session defaults, then the
    /// call's own headers. Each layer replaces earlier values of a name.
    async fn request_headers(&self, call: &HeaderMap, with_auth: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());

        if with_auth {
            let auth = self.auth.read().await.headers()?;
            merge_headers(&mut headers, &auth);
        }

        merge_headers(&mut headers, &self.headers);
        merge_headers(&mut headers, call);
        Ok(headers)
    }

    /// Check the status against `expected`, decoding the server's error
    /// body when it sent one.
    async fn check_response(&self, response: Response, expected: &[u16]) -> Result<Response> {
        let status = response.status().as_u16();
        if expected.contains(&status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        self.report_body(&body);

        let server_error = serde_json::from_str::<ServerErrorBody>(&body)
            .ok()
            .filter(|e| e.error_message.is_some() || e.error_code.is_some());

        Err(HubError::UnexpectedStatus {
            status,
            expected: expected.to_vec(),
            server_error,
            body,
        })
    }

    async fn read_body(&self, response: Response) -> Result<String> {
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .with_context(|| format!("reading response from {url}"))?;
        self.report_body(&body);
        Ok(body)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let url = response.url().to_string();
        let body = self.read_body(response).await?;
        serde_json::from_str(&body).with_context(|| format!("decoding response from {url}"))
    }

    fn report_body(&self, body: &str) {
        if self.debug.contains(DebugFlags::CONTENT) {
            tracing::debug!(body, "response body");
        }
    }
}

/// Replace every header in `base` that `layer` names, keeping all of
/// `layer`'s values for it.
pub(crate) fn merge_headers(base: &mut HeaderMap, layer: &HeaderMap) {
    for name in layer.keys() {
        base.remove(name);
        for value in layer.get_all(name) {
            base.append(name.clone(), value.clone());
        }
    }
}

/// Header values rendered for logs, with credentials hidden.
pub(crate) fn masked_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name == AUTHORIZATION {
                let scheme = value
                    .to_str()
                    .ok()
                    .and_then(|v| v.split_whitespace().next())
                    .unwrap_or("Bearer");
                format!("{scheme} <NOT_SHOWN>")
            } else if name.as_str().eq_ignore_ascii_case(CSRF_HEADER) {
                "<NOT_SHOWN>".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.to_string(), shown)
        })
        .collect()
}

pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| HubError::RequestConstruction(format!("invalid header name {name:?}: {e}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| HubError::RequestConstruction(format!("invalid value for header {name}: {e}")))?;
    Ok((header_name, header_value))
}

fn accept_header(accept: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(accept) = accept.filter(|a| !a.is_empty()) {
        let (_, value) = header_pair(ACCEPT.as_str(), accept)?;
        headers.insert(ACCEPT, value);
    }
    Ok(headers)
}

fn content_type_header(content_type: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let (_, value) = header_pair(CONTENT_TYPE.as_str(), content_type)?;
    headers.insert(CONTENT_TYPE, value);
    Ok(headers)
}

fn encode_json<B: Serialize + ?Sized>(body: &B) -> Result<String> {
    serde_json::to_string(body)
        .map_err(|e| HubError::RequestConstruction(format!("error encoding json: {e}")))
}

fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let (name, value) = header_pair(name, value).unwrap();
            headers.append(name, value);
        }
        headers
    }

    #[test]
    fn test_client_debug() {
        let client = HubClient::new("https://hub.example.com").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("HubClient"));
        assert!(debug.contains("base_url"));
    }

    #[test]
    fn test_api_url_joins_without_double_slash() {
        let a = HubClient::new("https://hub.example.com").unwrap();
        let b = HubClient::new("https://hub.example.com/").unwrap();
        assert_eq!(a.api_url("/api/projects"), "https://hub.example.com/api/projects");
        assert_eq!(b.api_url("api/projects"), "https://hub.example.com/api/projects");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let client = HubClient::new("https://hub.example.com").unwrap();
        assert_eq!(
            client.resolve("/api/users").unwrap().as_str(),
            "https://hub.example.com/api/users"
        );
        assert_eq!(
            client.resolve("https://other.example.com/x").unwrap().as_str(),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn test_merge_replaces_never_duplicates() {
        let mut base = map(&[("x-a", "1"), ("x-b", "1"), ("x-b", "2")]);
        let layer = map(&[("x-b", "3"), ("x-c", "1"), ("x-c", "2")]);
        merge_headers(&mut base, &layer);

        let b: Vec<_> = base.get_all("x-b").iter().collect();
        assert_eq!(b, vec!["3"]);
        let c: Vec<_> = base.get_all("x-c").iter().collect();
        assert_eq!(c, vec!["1", "2"]);
        assert_eq!(base.get("x-a").unwrap(), "1");
    }

    #[test]
    fn test_with_header_leaves_original_unchanged() {
        let client = HubClient::builder("https://hub.example.com")
            .header("X-Team", "red")
            .build()
            .unwrap();
        let tagged = client.with_header("X-Team", "blue").unwrap();

        assert_eq!(client.default_headers().get("x-team").unwrap(), "red");
        assert_eq!(tagged.default_headers().get("x-team").unwrap(), "blue");
        assert_eq!(tagged.default_headers().get_all("x-team").iter().count(), 1);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = HubClient::builder("https://hub.example.com")
            .header("bad header", "v")
            .build()
            .unwrap_err();
        assert!(matches!(err, HubError::RequestConstruction(_)));
    }

    #[test]
    fn test_masked_headers_hide_credentials() {
        let headers = map(&[
            ("authorization", "Bearer secret"),
            ("x-csrf-token", "csrf"),
            ("accept", "application/json"),
        ]);
        let masked = masked_headers(&headers);
        let rendered = format!("{masked:?}");
        assert!(rendered.contains("Bearer <NOT_SHOWN>"));
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("\"csrf\""));
        assert!(rendered.contains("application/json"));
    }

    #[test]
    fn test_debug_flags() {
        let flags = DebugFlags::TIMINGS | DebugFlags::CONTENT;
        assert!(flags.contains(DebugFlags::TIMINGS));
        assert!(!DebugFlags::TIMINGS.contains(DebugFlags::CONTENT));
        assert!(!DebugFlags::default().contains(DebugFlags::NONE));
        assert_eq!(flags.bits(), 3);
    }
}
