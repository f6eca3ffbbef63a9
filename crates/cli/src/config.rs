// ABOUTME: Run configuration: API, query, pacing, filter, render, and output settings.
// ABOUTME: Every field has a default; a TOML file may override any subset. The API key comes from the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use holofeed_feed::{FilterConfig, RenderOptions, SortKey};
use holofeed_fetch::{FetchPolicy, Query, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "HOLODEX_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub feed_path: PathBuf,
    /// Raw JSON snapshot of the fetched batch; `None` disables it.
    pub raw_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            feed_path: PathBuf::from("feeds/holodex.atom"),
            raw_path: Some(PathBuf::from("feeds/holodex.json")),
        }
    }
}

/// Everything one run needs apart from the credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timestamp driving feed order.
    pub sort: SortKey,
    pub api: ApiConfig,
    pub query: Query,
    pub fetch: FetchPolicy,
    pub filter: FilterConfig,
    pub render: RenderOptions,
    pub output: OutputConfig,
}

impl Config {
    /// Loads `path` as TOML, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Reads the API key from the environment; empty values count as missing.
pub fn api_key_from_env() -> Result<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("{} is not set", API_KEY_ENV))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.sort, SortKey::Published);
        assert_eq!(config.api.base_url, "https://holodex.net/api/v2");
        assert_eq!(config.query.topics, vec!["singing"]);
        assert_eq!(config.query.limit, 50);
        assert_eq!(config.query.max_upcoming_hours, 18);
        assert_eq!(config.render.utc_offset_minutes, 420);
        assert_eq!(config.output.feed_path, PathBuf::from("feeds/holodex.atom"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
sort = "available"

[query]
topics = ["singing", "Birthday", "3D_Stream"]

[fetch]
topic_delay_ms = 250

[render]
utc_offset_minutes = 540
offset_label = "JST"

[output]
feed_path = "out/feed.atom"
"#,
        )
        .unwrap();

        assert_eq!(config.sort, SortKey::Available);
        assert_eq!(config.query.topics.len(), 3);
        assert_eq!(config.query.org, "Hololive");
        assert_eq!(config.fetch.topic_delay_ms, 250);
        assert_eq!(config.fetch.max_retries, 1);
        assert_eq!(config.render.offset_label, "JST");
        assert_eq!(config.render.feed_title, "Hololive Karaoke Stream");
        assert_eq!(config.output.feed_path, PathBuf::from("out/feed.atom"));
        assert_eq!(config.output.raw_path, Some(PathBuf::from("feeds/holodex.json")));
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        assert!(Config::from_toml("sort = \"random\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Some(Path::new("/nonexistent/holofeed.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/holofeed.toml"));
    }
}
