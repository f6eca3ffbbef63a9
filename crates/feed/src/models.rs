// ABOUTME: Models for upstream video records and the Atom feed rendered from them.
// ABOUTME: VideoRecord mirrors the video API payload; FeedEntry and FeedDocument are the output side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time_parse::parse_flexible_time;

/// Channel that published a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub suborg: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    /// Fields the API sends that we do not model, kept for the raw snapshot.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One video as listed by the upstream API.
///
/// Timestamps stay as received so that corruption markers inside them can be
/// detected and repaired like any other text field; use [`VideoRecord::published`]
/// and [`VideoRecord::available`] for parsed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub available_at: String,
    #[serde(default)]
    pub start_scheduled: Option<String>,
    #[serde(default)]
    pub songcount: Option<u32>,
    pub channel: Channel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoRecord {
    /// Parsed publication time, if present and well-formed.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_flexible_time)
    }

    /// Parsed availability time (scheduled start for upcoming streams).
    pub fn available(&self) -> Option<DateTime<Utc>> {
        parse_flexible_time(&self.available_at)
    }

    /// Canonical watch URL; entry ids are derived from this.
    pub fn canonical_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    pub fn short_url(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }

    pub fn channel_url(&self) -> String {
        format!("https://www.youtube.com/channel/{}", self.channel.id)
    }

    pub fn thumbnail_url(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id)
    }
}

/// Represents an author with name and URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub uri: String,
}

/// Represents a single entry within the generated feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub short_link: String,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub author: Author,
    pub summary: String,
    pub thumbnail_url: Option<String>,
}

/// Represents the generated feed with its metadata and ordered entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub self_link: String,
    pub updated: DateTime<Utc>,
    pub generator: Option<String>,
    pub entries: Vec<FeedEntry>,
}
