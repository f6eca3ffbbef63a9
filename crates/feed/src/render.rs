// ABOUTME: Maps video records to feed entries and assembles the feed document.
// ABOUTME: Entry and feed ids are UUIDv5 of canonical URLs so they stay stable across runs.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::FeedError;
use crate::models::{Author, FeedDocument, FeedEntry, VideoRecord};

/// Presentation settings for the generated feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub feed_title: String,
    pub feed_subtitle: Option<String>,
    /// Public URL the feed is served from; also the seed of the feed id.
    pub self_link: String,
    /// Offset used for the human-readable time in summaries, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// Suffix printed after the readable time, e.g. `GMT+7`.
    pub offset_label: String,
    /// Append a `<t:UNIX:F>` token that chat clients render in the reader's timezone.
    pub live_token: bool,
    /// Use the channel's English name as author when available.
    pub english_author: bool,
    pub thumbnails: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            feed_title: "Hololive Karaoke Stream".to_string(),
            feed_subtitle: Some("Hololive Karaoke Stream Atom Feed".to_string()),
            self_link:
                "https://raw.githubusercontent.com/braboobssiere/holedex-song-list/main/feeds/holodex.atom"
                    .to_string(),
            utc_offset_minutes: 7 * 60,
            offset_label: "GMT+7".to_string(),
            live_token: false,
            english_author: false,
            thumbnails: true,
        }
    }
}

impl RenderOptions {
    fn offset(&self) -> Result<FixedOffset, FeedError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                FeedError::invalid(format!(
                    "utc offset out of range: {} minutes",
                    self.utc_offset_minutes
                ))
            })
    }
}

/// Drops characters XML 1.0 does not allow: C0 controls other than tab,
/// newline and carriage return, plus U+FFFE and U+FFFF.
pub fn xml_safe(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        c => c >= ' ',
    }
}

/// `urn:uuid:` form of the UUIDv5 of `url` in the URL namespace.
pub fn stable_id(url: &str) -> String {
    format!(
        "urn:uuid:{}",
        Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes())
    )
}

/// Time in the target offset, e.g. `March 1, 19:00 GMT+7`.
pub fn readable_time(dt: &DateTime<Utc>, offset: FixedOffset, label: &str) -> String {
    let local = dt.with_timezone(&offset).format("%B %-d, %H:%M");
    if label.is_empty() {
        local.to_string()
    } else {
        format!("{} {}", local, label)
    }
}

/// Chat-client timestamp token (`<t:1709294400:F>`).
pub fn live_token(dt: &DateTime<Utc>) -> String {
    format!("<t:{}:F>", dt.timestamp())
}

/// Renders a single record. Fails if the record has no parseable availability time.
pub fn render_entry(video: &VideoRecord, opts: &RenderOptions) -> Result<FeedEntry, FeedError> {
    let available = video.available().ok_or_else(|| {
        FeedError::render(
            &video.id,
            format!("unparseable available_at {:?}", video.available_at),
        )
    })?;
    let published = video.published().unwrap_or(available);

    let link = video.canonical_url();
    let readable = readable_time(&available, opts.offset()?, &xml_safe(&opts.offset_label));
    let token = if opts.live_token {
        format!(" {}", live_token(&available))
    } else {
        String::new()
    };
    let summary = format!("【LIVE at {}】{} Watch on YouTube: {}", readable, token, link);

    let author_name = match (&video.channel.english_name, opts.english_author) {
        (Some(english), true) if !english.is_empty() => xml_safe(english),
        _ => xml_safe(&video.channel.name),
    };

    Ok(FeedEntry {
        id: stable_id(&link),
        title: xml_safe(&video.title),
        short_link: video.short_url(),
        published,
        updated: available,
        author: Author {
            name: author_name,
            uri: video.channel_url(),
        },
        summary,
        thumbnail_url: opts.thumbnails.then(|| video.thumbnail_url()),
        link,
    })
}

/// Renders every record, in the given order, into a feed document stamped `now`.
pub fn render_document(
    videos: &[VideoRecord],
    opts: &RenderOptions,
    now: DateTime<Utc>,
) -> Result<FeedDocument, FeedError> {
    Url::parse(&opts.self_link)
        .map_err(|e| FeedError::invalid(format!("self link {:?}: {}", opts.self_link, e)))?;
    opts.offset()?;

    let entries = videos
        .iter()
        .map(|video| render_entry(video, opts))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedDocument {
        id: stable_id(&opts.self_link),
        title: xml_safe(&opts.feed_title),
        subtitle: opts.feed_subtitle.as_deref().map(xml_safe),
        self_link: opts.self_link.clone(),
        updated: now,
        generator: Some(format!("holofeed {}", env!("CARGO_PKG_VERSION"))),
        entries,
    })
}
