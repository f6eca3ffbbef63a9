// ABOUTME: The Client struct that queries the video-listing API and decodes its JSON.
// ABOUTME: Also defines the VideoSource seam used by the rate-limited collection loop.

use std::future::Future;

use holofeed_feed::VideoRecord;
use tracing::debug;

use crate::error::FetchError;
use crate::options::{ClientBuilder, Options, Query, API_KEY_HEADER};
use crate::resource::{fetch, FetchOptions};

/// Anything that can return one batch of videos for a topic.
pub trait VideoSource {
    fn fetch_batch(
        &self,
        query: &Query,
        topic: Option<&str>,
    ) -> impl Future<Output = Result<Vec<VideoRecord>, FetchError>> + Send;
}

/// HTTP client for the `/videos` endpoint.
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Result<Self, FetchError> {
        url::Url::parse(&opts.base_url).map_err(|e| {
            FetchError::invalid_url(
                &opts.base_url,
                "Client",
                Some(anyhow::anyhow!("malformed base URL: {}", e)),
            )
        })?;

        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    FetchError::network(&opts.base_url, "Client", Some(anyhow::Error::new(e)))
                })?,
        };

        Ok(Self { opts, http_client })
    }

    /// Full URL of the listing endpoint.
    pub fn videos_url(&self) -> String {
        format!("{}/videos", self.opts.base_url.trim_end_matches('/'))
    }

    /// Fetches one page of videos, optionally restricted to `topic`.
    pub async fn fetch_topic(
        &self,
        query: &Query,
        topic: Option<&str>,
    ) -> Result<Vec<VideoRecord>, FetchError> {
        let url = self.videos_url();
        let mut headers = self.opts.headers.clone();
        if let Some(key) = &self.opts.api_key {
            headers.insert(API_KEY_HEADER.to_string(), key.clone());
        }
        let fetch_opts = FetchOptions {
            headers,
            query: query.params(topic),
        };

        let result = fetch(&self.http_client, &url, &fetch_opts).await?;
        let videos: Vec<VideoRecord> = serde_json::from_str(&result.text()).map_err(|e| {
            FetchError::parse(
                &url,
                "FetchTopic",
                Some(anyhow::anyhow!("expected a JSON array of videos: {}", e)),
            )
        })?;

        debug!(topic = topic.unwrap_or("-"), count = videos.len(), "fetched videos");
        Ok(videos)
    }
}

impl VideoSource for Client {
    async fn fetch_batch(
        &self,
        query: &Query,
        topic: Option<&str>,
    ) -> Result<Vec<VideoRecord>, FetchError> {
        self.fetch_topic(query, topic).await
    }
}
