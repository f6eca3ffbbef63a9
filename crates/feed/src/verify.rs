// ABOUTME: Validation of generated feed bytes by re-parsing them with feed-rs.
// ABOUTME: Ensures the required Atom elements survive serialization before anything is written.

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};

use crate::error::FeedError;

/// What a standard parser recovers from a generated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    pub id: String,
    pub title: String,
    pub self_link: String,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
}

/// Parses `data` with feed-rs and checks feed id, title and self link, and
/// per-entry id, title, link and published date.
pub fn verify_feed(data: &[u8]) -> Result<ParsedFeed, FeedError> {
    let parsed = feed_rs::parser::parse(data).map_err(|e| FeedError::invalid(e.to_string()))?;

    if parsed.id.is_empty() {
        return Err(FeedError::invalid("feed has no id"));
    }
    let title = parsed
        .title
        .map(|t| t.content)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FeedError::invalid("feed has no title"))?;
    let self_link = parsed
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("self"))
        .map(|l| l.href.clone())
        .ok_or_else(|| FeedError::invalid("feed has no self link"))?;

    let entries = parsed
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| verify_entry(idx, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedFeed {
        id: parsed.id,
        title,
        self_link,
        entries,
    })
}

fn verify_entry(idx: usize, entry: &Entry) -> Result<ParsedEntry, FeedError> {
    let missing = |what: &str| FeedError::invalid(format!("entry {} has no {}", idx, what));

    if entry.id.is_empty() {
        return Err(missing("id"));
    }
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .ok_or_else(|| missing("title"))?;
    let link = alternate_link(&entry.links).ok_or_else(|| missing("link"))?;
    let published = entry.published.ok_or_else(|| missing("published date"))?;

    Ok(ParsedEntry {
        id: entry.id.clone(),
        title,
        link,
        published,
    })
}

/// Prefers rel="alternate" (or no rel), otherwise the first link.
fn alternate_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}
