// ABOUTME: Deterministic ordering of videos for the feed.
// ABOUTME: Newest first by the chosen timestamp, ties broken by id ascending.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::VideoRecord;

/// Which timestamp drives the feed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// `published_at`, falling back to `available_at` for videos not yet published.
    #[default]
    Published,
    /// `available_at` (scheduled start for upcoming streams).
    Available,
}

impl SortKey {
    pub fn timestamp(self, video: &VideoRecord) -> Option<DateTime<Utc>> {
        match self {
            SortKey::Published => video.published().or_else(|| video.available()),
            SortKey::Available => video.available(),
        }
    }
}

/// Sorts newest first, then by id ascending. Records without a parseable
/// timestamp go last. Stable, so re-sorting sorted input is a no-op.
pub fn sort_videos(videos: &mut [VideoRecord], key: SortKey) {
    videos.sort_by_cached_key(|video| (Reverse(key.timestamp(video)), video.id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn video(id: &str, published: Option<&str>, available: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            published_at: published.map(str::to_string),
            available_at: available.to_string(),
            ..Default::default()
        }
    }

    fn ids(videos: &[VideoRecord]) -> Vec<&str> {
        videos.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn newest_first() {
        let mut videos = vec![
            video("old", Some("2024-03-01T10:00:00Z"), "2024-03-01T10:00:00Z"),
            video("new", Some("2024-03-02T10:00:00Z"), "2024-03-02T10:00:00Z"),
            video("mid", Some("2024-03-01T18:00:00Z"), "2024-03-01T18:00:00Z"),
        ];
        sort_videos(&mut videos, SortKey::Published);
        assert_eq!(ids(&videos), vec!["new", "mid", "old"]);
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let ts = "2024-03-01T10:00:00Z";
        let mut videos = vec![video("b", Some(ts), ts), video("a", Some(ts), ts)];
        sort_videos(&mut videos, SortKey::Published);
        assert_eq!(ids(&videos), vec!["a", "b"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut videos = vec![
            video("c", Some("2024-03-01T10:00:00Z"), "2024-03-01T10:00:00Z"),
            video("a", Some("2024-03-02T10:00:00Z"), "2024-03-02T10:00:00Z"),
            video("b", Some("2024-03-02T10:00:00Z"), "2024-03-02T10:00:00Z"),
        ];
        sort_videos(&mut videos, SortKey::Published);
        let once = videos.clone();
        sort_videos(&mut videos, SortKey::Published);
        assert_eq!(videos, once);
    }

    #[test]
    fn published_key_falls_back_to_available() {
        let mut videos = vec![
            video("live", Some("2024-03-01T10:00:00Z"), "2024-03-01T10:00:00Z"),
            video("upcoming", None, "2024-03-03T10:00:00Z"),
        ];
        sort_videos(&mut videos, SortKey::Published);
        assert_eq!(ids(&videos), vec!["upcoming", "live"]);
    }

    #[test]
    fn available_key_ignores_published() {
        let mut videos = vec![
            video("a", Some("2024-03-05T10:00:00Z"), "2024-03-01T10:00:00Z"),
            video("b", Some("2024-03-01T10:00:00Z"), "2024-03-02T10:00:00Z"),
        ];
        sort_videos(&mut videos, SortKey::Available);
        assert_eq!(ids(&videos), vec!["b", "a"]);
    }

    #[test]
    fn unparseable_timestamps_go_last() {
        let mut videos = vec![
            video("broken", None, "not a date"),
            video("ok", None, "2020-01-01T00:00:00Z"),
        ];
        sort_videos(&mut videos, SortKey::Published);
        assert_eq!(ids(&videos), vec!["ok", "broken"]);
    }
}
