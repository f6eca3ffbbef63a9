// ABOUTME: Inclusion rules applied to fetched videos before rendering.
// ABOUTME: Each rule is an independent predicate; FilterChain runs them in order and logs drops.

use std::fmt;

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeedError;
use crate::models::VideoRecord;

/// A single inclusion predicate over a video record.
pub trait Rule: Send + Sync {
    /// Short name used in logs when the rule drops a record.
    fn name(&self) -> &str;

    /// Returns true if the record may appear in the feed.
    fn admits(&self, video: &VideoRecord) -> bool;
}

/// Settings for the built-in rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Statuses that mark a placeholder or unavailable video.
    pub excluded_statuses: Vec<String>,
    /// Topics that are only kept when the video is unarchived or has several songs.
    pub gated_topics: Vec<String>,
    /// Title fragments signalling an unarchived recording (ASCII case-insensitive).
    pub unarchived_markers: Vec<String>,
    /// Gated videos with at least this many songs are kept.
    pub min_songs: u32,
    /// Channel name or suborg fragments outside the target roster.
    pub excluded_channel_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_statuses: vec!["missing".to_string()],
            gated_topics: vec![
                "Birthday".to_string(),
                "Anniversary".to_string(),
                "3D_Stream".to_string(),
            ],
            unarchived_markers: vec![
                "unarchive".to_string(),
                "no archive".to_string(),
                "アーカイブなし".to_string(),
                "アーカイブ無し".to_string(),
                "noarchive".to_string(),
                "no-archive".to_string(),
                "アーカイブ残りません".to_string(),
                "アーカイブ残らない".to_string(),
            ],
            min_songs: 2,
            excluded_channel_markers: vec!["HOLOSTARS".to_string()],
        }
    }
}

fn build_matcher(patterns: &[String]) -> Result<Option<AhoCorasick>, FeedError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(patterns)
        .map(Some)
        .map_err(|e| FeedError::invalid(format!("bad filter pattern: {}", e)))
}

/// Drops records whose status is in the configured list.
#[derive(Debug, Clone)]
pub struct ExcludeStatus {
    statuses: Vec<String>,
}

impl ExcludeStatus {
    pub fn new(statuses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            statuses: statuses.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for ExcludeStatus {
    fn name(&self) -> &str {
        "exclude-status"
    }

    fn admits(&self, video: &VideoRecord) -> bool {
        !self
            .statuses
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&video.status))
    }
}

/// Keeps announcement-style topics only when they are worth listening to:
/// the title says the recording is unarchived, or the stream has several songs.
#[derive(Debug, Clone)]
pub struct GatedTopics {
    topics: Vec<String>,
    unarchived: Option<AhoCorasick>,
    min_songs: u32,
}

impl GatedTopics {
    pub fn new(
        topics: &[String],
        unarchived_markers: &[String],
        min_songs: u32,
    ) -> Result<Self, FeedError> {
        Ok(Self {
            topics: topics.to_vec(),
            unarchived: build_matcher(unarchived_markers)?,
            min_songs,
        })
    }

    fn is_gated(&self, video: &VideoRecord) -> bool {
        match video.topic_id.as_deref() {
            Some(topic) => self.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)),
            None => false,
        }
    }
}

impl Rule for GatedTopics {
    fn name(&self) -> &str {
        "gated-topic"
    }

    fn admits(&self, video: &VideoRecord) -> bool {
        if !self.is_gated(video) {
            return true;
        }
        let unarchived = self
            .unarchived
            .as_ref()
            .is_some_and(|m| m.is_match(&video.title));
        let songs = video.songcount.unwrap_or(0);
        unarchived || songs >= self.min_songs
    }
}

/// Drops records from channels outside the target roster.
#[derive(Debug, Clone)]
pub struct ExcludeChannels {
    markers: Option<AhoCorasick>,
}

impl ExcludeChannels {
    pub fn new(markers: &[String]) -> Result<Self, FeedError> {
        Ok(Self {
            markers: build_matcher(markers)?,
        })
    }
}

impl Rule for ExcludeChannels {
    fn name(&self) -> &str {
        "exclude-channel"
    }

    fn admits(&self, video: &VideoRecord) -> bool {
        let Some(markers) = &self.markers else {
            return true;
        };
        let channel = &video.channel;
        let hit = markers.is_match(&channel.name)
            || channel
                .english_name
                .as_deref()
                .is_some_and(|n| markers.is_match(n))
            || channel
                .suborg
                .as_deref()
                .is_some_and(|s| markers.is_match(s));
        !hit
    }
}

/// Ordered list of rules; a record is kept only if every rule admits it.
#[derive(Default)]
pub struct FilterChain {
    rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the built-in rules from config. Empty lists produce no rule.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FeedError> {
        let mut chain = Self::new();
        if !config.excluded_statuses.is_empty() {
            chain.push(ExcludeStatus::new(config.excluded_statuses.iter().cloned()));
        }
        if !config.gated_topics.is_empty() {
            chain.push(GatedTopics::new(
                &config.gated_topics,
                &config.unarchived_markers,
                config.min_songs,
            )?);
        }
        if !config.excluded_channel_markers.is_empty() {
            chain.push(ExcludeChannels::new(&config.excluded_channel_markers)?);
        }
        Ok(chain)
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Name of the first rule rejecting the record, if any.
    pub fn rejected_by(&self, video: &VideoRecord) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| !rule.admits(video))
            .map(|rule| rule.name())
    }

    pub fn admits(&self, video: &VideoRecord) -> bool {
        self.rejected_by(video).is_none()
    }

    /// Keeps admitted records, preserving input order.
    pub fn apply(&self, videos: Vec<VideoRecord>) -> Vec<VideoRecord> {
        videos
            .into_iter()
            .filter(|video| match self.rejected_by(video) {
                Some(rule) => {
                    debug!(id = %video.id, title = %video.title, rule, "dropping video");
                    false
                }
                None => true,
            })
            .collect()
    }
}
