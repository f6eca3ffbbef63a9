// ABOUTME: Rate-limited, sequential collection of videos across topics.
// ABOUTME: Repairs corrupted batches with at most one re-fetch and skips topics that fail in transit.

use std::collections::HashSet;
use std::time::Duration;

use holofeed_feed::sanitize::{corrupted_count, repair, strip_batch};
use holofeed_feed::VideoRecord;
use tracing::{debug, info, warn};

use crate::client::VideoSource;
use crate::error::FetchError;
use crate::options::{FetchPolicy, Query};

/// Fetches every configured topic in order, pausing `topic_delay` between
/// requests, and concatenates the results.
///
/// A topic failing with a network, timeout or upstream error is logged and
/// skipped; a malformed response aborts the run. If every topic fails the last
/// error is returned. Without topics a single request is made and its failure
/// is returned as-is.
///
/// The re-fetch budget is shared by the whole run: once one corrupted batch
/// has been re-fetched, later corrupted batches are stripped without a retry.
pub async fn collect_videos<S: VideoSource>(
    source: &S,
    query: &Query,
    policy: &FetchPolicy,
) -> Result<Vec<VideoRecord>, FetchError> {
    let mut retries_left = policy.retries();

    if query.topics.is_empty() {
        let videos =
            fetch_with_repair(source, query, None, &mut retries_left, policy.retry_delay()).await?;
        info!(count = videos.len(), "fetched videos");
        return Ok(videos);
    }

    let mut videos = Vec::new();
    let mut succeeded = 0usize;
    let mut last_err = None;

    for (idx, topic) in query.topics.iter().enumerate() {
        if idx > 0 {
            pause(policy.topic_delay()).await;
        }

        let fetched = fetch_with_repair(
            source,
            query,
            Some(topic.as_str()),
            &mut retries_left,
            policy.retry_delay(),
        )
        .await;

        match fetched {
            Ok(batch) => {
                info!(topic = %topic, count = batch.len(), "fetched topic");
                succeeded += 1;
                videos.extend(batch);
            }
            Err(err) if err.is_recoverable() => {
                warn!(topic = %topic, error = %err, "skipping topic");
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    if succeeded == 0 {
        if let Some(err) = last_err {
            return Err(err);
        }
    }

    Ok(dedup_by_id(videos))
}

/// Fetches one batch; if it carries corruption markers and `retries_left` allows,
/// waits `retry_delay`, fetches again and keeps the cleaner copy of each field.
/// A re-fetch consumes one unit of `retries_left`, whether or not it succeeds.
pub async fn fetch_with_repair<S: VideoSource>(
    source: &S,
    query: &Query,
    topic: Option<&str>,
    retries_left: &mut u32,
    retry_delay: Duration,
) -> Result<Vec<VideoRecord>, FetchError> {
    let batch = source.fetch_batch(query, topic).await?;

    let corrupted = corrupted_count(&batch);
    if corrupted == 0 {
        return Ok(batch);
    }

    if *retries_left == 0 {
        warn!(topic = topic.unwrap_or("-"), corrupted, "corrupted text and no retry left, stripping");
        return Ok(strip_batch(batch));
    }

    warn!(topic = topic.unwrap_or("-"), corrupted, "corrupted text in response, re-fetching once");
    *retries_left -= 1;
    pause(retry_delay).await;

    match source.fetch_batch(query, topic).await {
        Ok(retried) => {
            let repaired = repair(batch, &retried);
            debug!(topic = topic.unwrap_or("-"), "merged retried batch");
            Ok(repaired)
        }
        Err(err) => {
            warn!(topic = topic.unwrap_or("-"), error = %err, "re-fetch failed, stripping original");
            Ok(strip_batch(batch))
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Keeps the first occurrence of each video id.
fn dedup_by_id(videos: Vec<VideoRecord>) -> Vec<VideoRecord> {
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|video| {
            let fresh = seen.insert(video.id.clone());
            if !fresh {
                debug!(id = %video.id, "duplicate video across topics");
            }
            fresh
        })
        .collect()
}
