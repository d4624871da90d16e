//! Memory API HTTP client
//!
//! Async client for the hosted mem0 REST API.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::context::CallContext;
use super::decode;
use super::error::{MemoryError, Result};
use super::types::*;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.mem0.ai/v1";

/// Timeout applied when the client builds its own transport
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const HEADER_ORGANIZATION_ID: &str = "Mem0-Organization-ID";
pub const HEADER_PROJECT_ID: &str = "Mem0-Project-ID";
pub const HEADER_USER_ID: &str = "Mem0-User-ID";

const AUTH_SCHEME: &str = "Token ";

/// Which identity headers are attached when their value is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderToggles {
    pub user_id: bool,
    pub organization_id: bool,
    pub project_id: bool,
}

impl Default for HeaderToggles {
    fn default() -> Self {
        Self {
            user_id: true,
            organization_id: true,
            project_id: true,
        }
    }
}

impl HeaderToggles {
    /// Send only the authorization header
    pub fn none() -> Self {
        Self {
            user_id: false,
            organization_id: false,
            project_id: false,
        }
    }
}

/// Connection settings for [`RemoteMemoryClient`]
///
/// ```no_run
/// use mem0_client::remote::ClientConfig;
///
/// let client = ClientConfig::new("m0-key")
///     .with_organization_id("org-1")
///     .with_debug(true)
///     .build()?;
/// # Ok::<(), mem0_client::remote::MemoryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub http_client: Option<Client>,
    pub timeout: Duration,
    pub debug: bool,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub project_id: Option<String>,
    pub headers: HeaderToggles,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: None,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            user_id: None,
            organization_id: None,
            project_id: None,
            headers: HeaderToggles::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a caller-owned transport; `timeout` is then ignored
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Log request payloads and raw response bodies
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_organization_id(mut self, org_id: impl Into<String>) -> Self {
        self.organization_id = Some(org_id.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_header_toggles(mut self, headers: HeaderToggles) -> Self {
        self.headers = headers;
        self
    }

    pub fn build(self) -> Result<RemoteMemoryClient> {
        RemoteMemoryClient::new(self)
    }
}

/// HTTP client for the memory API
///
/// Holds only immutable configuration and a pooled transport, so one instance
/// can be cloned and used from many tasks at once.
#[derive(Debug, Clone)]
pub struct RemoteMemoryClient {
    http: Client,
    base_url: Url,
    authorization: String,
    identity: Vec<(&'static str, String)>,
    debug: bool,
}

impl RemoteMemoryClient {
    /// Create a client; fails when the API key is empty or the URL is invalid
    pub fn new(config: ClientConfig) -> Result<Self> {
        let key = config.api_key.trim();
        if key.is_empty() {
            return Err(MemoryError::Config("API key is required".to_string()));
        }

        let authorization = if key.starts_with(AUTH_SCHEME) {
            key.to_string()
        } else {
            format!("{}{}", AUTH_SCHEME, key)
        };

        let base_url = parse_base_url(&config.base_url)?;

        let http = match config.http_client {
            Some(client) => client,
            None => Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|e| MemoryError::Config(format!("failed to create HTTP client: {}", e)))?,
        };

        let toggles = config.headers;
        let identity = [
            (HEADER_ORGANIZATION_ID, toggles.organization_id, config.organization_id),
            (HEADER_PROJECT_ID, toggles.project_id, config.project_id),
            (HEADER_USER_ID, toggles.user_id, config.user_id),
        ]
        .into_iter()
        .filter(|(_, enabled, _)| *enabled)
        .filter_map(|(name, _, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| (name, v))
        })
        .collect();

        Ok(Self {
            http,
            base_url,
            authorization,
            identity,
            debug: config.debug,
        })
    }

    /// API root every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MemoryError::Config(format!("invalid endpoint path {}: {}", path, e)))
    }

    fn memory_url(&self, memory_id: &str) -> Result<Url> {
        let mut url = self.endpoint("memories/")?;
        url.path_segments_mut()
            .map_err(|_| MemoryError::Config("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(memory_id)
            .push("");
        Ok(url)
    }

    /// Attach auth and identity headers
    fn prepare_request(&self, builder: RequestBuilder) -> RequestBuilder {
        self.identity
            .iter()
            .fold(builder.header(AUTHORIZATION, &self.authorization), |b, (name, value)| {
                b.header(*name, value)
            })
    }

    fn json_body<T: Serialize>(&self, builder: RequestBuilder, label: &str, payload: &T) -> Result<RequestBuilder> {
        let body = serde_json::to_string(payload)?;
        self.log_wire(label, &body);
        Ok(builder.header(CONTENT_TYPE, "application/json").body(body))
    }

    fn log_wire(&self, label: &str, body: &str) {
        if self.debug {
            debug!(target: "mem0_client::wire", "{}: {}", label, body);
        }
    }

    /// Send the request under `ctx` and return the success body
    async fn execute(&self, ctx: &CallContext, builder: RequestBuilder) -> Result<String> {
        let (status, body) = ctx
            .guard(async {
                let response = self.prepare_request(builder).send().await?;
                let status = response.status();
                let body = response.text().await?;
                Ok::<_, MemoryError>((status, body))
            })
            .await?;

        self.log_wire("response body", &body);
        check_status(status, body)
    }

    // ============== Memories ==============

    /// Store a memory built from conversation messages
    pub async fn store(&self, ctx: &CallContext, request: StoreRequest) -> Result<Memory> {
        request.validate()?;
        let request = request.with_owner_metadata();

        let url = self.endpoint("memories/")?;
        debug!(%url, messages = request.messages.len(), "storing memory");

        let builder = self.json_body(self.http.post(url), "store request", &request)?;
        let body = self.execute(ctx, builder).await?;
        let memory: Memory = decode::decode_one(&body)?;

        debug!(memory_id = %memory.id, "stored memory");
        Ok(memory)
    }

    /// List memories matching the filters
    pub async fn list(&self, ctx: &CallContext, options: &GetOptions) -> Result<Vec<MemoryEntry>> {
        let url = self.endpoint("memories/")?;
        let query = options.query_pairs()?;
        debug!(%url, filters = query.len(), "listing memories");

        let builder = self.http.get(url).query(&query);
        let body = self.execute(ctx, builder).await?;
        let entries = decode::decode_entries(&body)?;

        debug!(count = entries.len(), "listed memories");
        Ok(entries)
    }

    /// Semantic search over stored memories
    pub async fn search(&self, ctx: &CallContext, request: &SearchRequest) -> Result<Vec<MemoryEntry>> {
        request.validate()?;

        let url = self.endpoint("memories/search/")?;
        debug!(%url, top_k = ?request.top_k, "searching memories");

        let builder = self.json_body(self.http.post(url), "search request", request)?;
        let body = self.execute(ctx, builder).await?;
        let entries: Vec<MemoryEntry> = decode::decode_one(&body)?;

        debug!(count = entries.len(), "search finished");
        Ok(entries)
    }

    /// Shorthand for a search with only a query and a result limit
    pub async fn query(&self, ctx: &CallContext, query: &str, limit: u32) -> Result<Vec<MemoryEntry>> {
        let request = SearchRequest {
            top_k: Some(limit),
            ..SearchRequest::new(query)
        };
        self.search(ctx, &request).await
    }

    /// Replace the text of an existing memory
    pub async fn update(&self, ctx: &CallContext, memory_id: &str, request: &UpdateRequest) -> Result<Memory> {
        if memory_id.trim().is_empty() {
            return Err(MemoryError::validation("memory id must not be empty"));
        }
        request.validate()?;

        let url = self.memory_url(memory_id)?;
        debug!(%url, "updating memory");

        let builder = self.json_body(self.http.put(url), "update request", request)?;
        let body = self.execute(ctx, builder).await?;
        let memory: Memory = decode::decode_one(&body)?;

        debug!(memory_id = %memory.id, "updated memory");
        Ok(memory)
    }
}

/// Only 200 OK carries a memory body; every other status is an error
fn check_status(status: StatusCode, body: String) -> Result<String> {
    if status == StatusCode::OK {
        Ok(body)
    } else {
        Err(decode::error_from_body(status, &body))
    }
}

/// Parse the API root, making sure relative endpoint joins keep its path
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| MemoryError::Config(format!("invalid base URL '{}': {}", raw, e)))?;

    if url.cannot_be_a_base() {
        return Err(MemoryError::Config(format!("base URL '{}' cannot have endpoints", raw)));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
