// ABOUTME: Configuration for the video-listing client: Options, Query, FetchPolicy, and ClientBuilder.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://holodex.net/api/v2";

/// Header carrying the static API credential.
pub const API_KEY_HEADER: &str = "X-APIKEY";

/// Connection settings for the client.
#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("holofeed/{}", env!("CARGO_PKG_VERSION")),
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

/// Query sent to `/videos`. One request is issued per entry in `topics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    #[serde(rename = "type")]
    pub kind: String,
    pub topics: Vec<String>,
    pub org: String,
    pub limit: u32,
    pub max_upcoming_hours: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            kind: "stream".to_string(),
            topics: vec!["singing".to_string()],
            org: "Hololive".to_string(),
            limit: 50,
            max_upcoming_hours: 18,
        }
    }
}

impl Query {
    /// Query-string pairs for a single request.
    pub fn params(&self, topic: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![("type", self.kind.clone())];
        if let Some(topic) = topic {
            params.push(("topic", topic.to_string()));
        }
        params.push(("org", self.org.clone()));
        params.push(("limit", self.limit.to_string()));
        params.push(("max_upcoming_hours", self.max_upcoming_hours.to_string()));
        params
    }
}

/// Pacing and repair budget for the fetch loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchPolicy {
    /// Pause between consecutive topic requests.
    pub topic_delay_ms: u64,
    /// Pause before re-fetching a batch that came back corrupted.
    pub retry_delay_ms: u64,
    /// Re-fetches allowed per batch; values above 1 are clamped to 1.
    pub max_retries: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            topic_delay_ms: 1_000,
            retry_delay_ms: 3_000,
            max_retries: 1,
        }
    }
}

impl FetchPolicy {
    pub const RETRY_LIMIT: u32 = 1;

    pub fn topic_delay(&self) -> Duration {
        Duration::from_millis(self.topic_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn retries(&self) -> u32 {
        self.max_retries.min(Self::RETRY_LIMIT)
    }

    /// No delays; handy for tests.
    pub fn immediate() -> Self {
        Self {
            topic_delay_ms: 0,
            retry_delay_ms: 0,
            ..Default::default()
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the API base URL (without the `/videos` suffix).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = base_url.into();
        self
    }

    /// Set the credential sent in the `X-APIKEY` header.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.opts.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Result<Client, FetchError> {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
