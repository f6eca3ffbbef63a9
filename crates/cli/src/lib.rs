// ABOUTME: One feed-generation run: fetch, repair, filter, sort, render, verify, and write.
// ABOUTME: Shared by the holofeed binary and its tests.

pub mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use holofeed_feed::{build_feed, write_atomic, write_json_snapshot, FilterChain, VideoRecord};
use holofeed_fetch::{collect_videos, Client};
use tracing::info;

pub use crate::config::{api_key_from_env, Config, API_KEY_ENV};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub fetched: usize,
    pub entries: usize,
    pub feed_path: PathBuf,
    pub raw_path: Option<PathBuf>,
}

/// Fetches from the API and regenerates the outputs. Any error leaves the
/// existing output files as they were.
pub async fn run(config: &Config, api_key: &str, now: DateTime<Utc>) -> Result<RunReport> {
    let client = Client::builder()
        .base_url(&config.api.base_url)
        .api_key(api_key)
        .timeout(config.api.timeout())
        .build()?;

    let videos = collect_videos(&client, &config.query, &config.fetch)
        .await
        .context("fetching videos")?;

    write_outputs(config, videos, now)
}

/// Builds the feed from an already fetched batch and writes it, then the raw snapshot.
pub fn write_outputs(
    config: &Config,
    videos: Vec<VideoRecord>,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let filters = FilterChain::from_config(&config.filter)?;
    let fetched = videos.len();
    let snapshot = config.output.raw_path.as_ref().map(|_| videos.clone());

    let (doc, bytes) = build_feed(videos, &filters, config.sort, &config.render, now)
        .context("building feed")?;
    info!(fetched, entries = doc.entries.len(), "rendered feed");

    write_atomic(&config.output.feed_path, &bytes).context("writing feed")?;

    if let (Some(path), Some(snapshot)) = (&config.output.raw_path, &snapshot) {
        write_json_snapshot(path, snapshot).context("writing raw snapshot")?;
    }

    Ok(RunReport {
        fetched,
        entries: doc.entries.len(),
        feed_path: config.output.feed_path.clone(),
        raw_path: config.output.raw_path.clone(),
    })
}
