// ABOUTME: Core library for turning video-listing records into an Atom feed.
// ABOUTME: Provides sanitizing, filtering, sorting, rendering, serialization, and atomic output.

pub mod atom;
pub mod error;
pub mod filter;
pub mod models;
pub mod output;
pub mod render;
pub mod sanitize;
pub mod sort;
pub mod time_parse;
pub mod verify;

pub use atom::write_atom;
pub use error::FeedError;
pub use filter::{ExcludeChannels, ExcludeStatus, FilterChain, FilterConfig, GatedTopics, Rule};
pub use models::{Author, Channel, FeedDocument, FeedEntry, VideoRecord};
pub use output::{write_atomic, write_json_snapshot};
pub use render::{render_document, render_entry, stable_id, xml_safe, RenderOptions};
pub use sanitize::{corrupted_count, is_corrupted, repair, strip_batch, CORRUPTION_MARKER};
pub use sort::{sort_videos, SortKey};
pub use time_parse::parse_flexible_time;
pub use verify::{verify_feed, ParsedEntry, ParsedFeed};

use chrono::{DateTime, Utc};

/// Filters, sorts and renders `videos`, returning the serialized Atom bytes
/// after they have been re-parsed and checked.
pub fn build_feed(
    videos: Vec<VideoRecord>,
    filters: &FilterChain,
    sort_key: SortKey,
    opts: &RenderOptions,
    now: DateTime<Utc>,
) -> Result<(FeedDocument, Vec<u8>), FeedError> {
    let mut kept = filters.apply(videos);
    sort_videos(&mut kept, sort_key);

    let doc = render_document(&kept, opts, now)?;
    let bytes = write_atom(&doc)?;

    let parsed = verify_feed(&bytes)?;
    if parsed.entries.len() != doc.entries.len() {
        return Err(FeedError::invalid(format!(
            "serialized {} entries but parsed back {}",
            doc.entries.len(),
            parsed.entries.len()
        )));
    }
    Ok((doc, bytes))
}
