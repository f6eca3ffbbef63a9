// ABOUTME: Atom 1.0 serialization of a FeedDocument using quick-xml.
// ABOUTME: Titles are escaped text; summaries are CDATA html; thumbnails use Media RSS.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::FeedError;
use crate::models::{FeedDocument, FeedEntry};
use crate::time_parse::format_rfc3339;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

type XmlWriter = Writer<Vec<u8>>;

/// Serializes the document as an indented Atom 1.0 XML byte vector.
pub fn write_atom(doc: &FeedDocument) -> Result<Vec<u8>, FeedError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ATOM_NS));
    root.push_attribute(("xmlns:media", MEDIA_NS));
    emit(&mut w, Event::Start(root))?;

    text_element(&mut w, "id", &doc.id)?;
    text_element(&mut w, "title", &doc.title)?;
    if let Some(subtitle) = &doc.subtitle {
        text_element(&mut w, "subtitle", subtitle)?;
    }
    link(&mut w, &doc.self_link, "self", "application/atom+xml")?;
    text_element(&mut w, "updated", &format_rfc3339(&doc.updated))?;
    if let Some(generator) = &doc.generator {
        text_element(&mut w, "generator", generator)?;
    }

    for entry in &doc.entries {
        write_entry(&mut w, entry)?;
    }

    emit(&mut w, Event::End(BytesEnd::new("feed")))?;

    let mut bytes = w.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_entry(w: &mut XmlWriter, entry: &FeedEntry) -> Result<(), FeedError> {
    emit(w, Event::Start(BytesStart::new("entry")))?;

    text_element(w, "id", &entry.id)?;
    text_element(w, "title", &entry.title)?;
    link(w, &entry.link, "alternate", "text/html")?;
    link(w, &entry.short_link, "related", "text/html")?;
    text_element(w, "published", &format_rfc3339(&entry.published))?;
    text_element(w, "updated", &format_rfc3339(&entry.updated))?;

    emit(w, Event::Start(BytesStart::new("author")))?;
    text_element(w, "name", &entry.author.name)?;
    text_element(w, "uri", &entry.author.uri)?;
    emit(w, Event::End(BytesEnd::new("author")))?;

    let mut summary = BytesStart::new("summary");
    summary.push_attribute(("type", "html"));
    emit(w, Event::Start(summary))?;
    cdata(w, &entry.summary)?;
    emit(w, Event::End(BytesEnd::new("summary")))?;

    if let Some(url) = &entry.thumbnail_url {
        let mut thumb = BytesStart::new("media:thumbnail");
        thumb.push_attribute(("url", url.as_str()));
        emit(w, Event::Empty(thumb))?;
    }

    emit(w, Event::End(BytesEnd::new("entry")))
}

fn emit(w: &mut XmlWriter, event: Event<'_>) -> Result<(), FeedError> {
    w.write_event(event).map_err(FeedError::serialize)
}

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> Result<(), FeedError> {
    emit(w, Event::Start(BytesStart::new(name)))?;
    emit(w, Event::Text(BytesText::new(text)))?;
    emit(w, Event::End(BytesEnd::new(name)))
}

fn link(w: &mut XmlWriter, href: &str, rel: &str, mime: &str) -> Result<(), FeedError> {
    let mut el = BytesStart::new("link");
    el.push_attribute(("href", href));
    el.push_attribute(("rel", rel));
    el.push_attribute(("type", mime));
    emit(w, Event::Empty(el))
}

/// Writes `text` as CDATA, splitting any `]]>` across adjacent sections.
fn cdata(w: &mut XmlWriter, text: &str) -> Result<(), FeedError> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    for (idx, part) in parts.iter().enumerate() {
        let mut section = String::with_capacity(part.len() + 3);
        if idx > 0 {
            section.push('>');
        }
        section.push_str(part);
        if idx < last {
            section.push_str("]]");
        }
        emit(w, Event::CData(BytesCData::new(section)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;
    use chrono::{TimeZone, Utc};

    fn doc(entries: Vec<FeedEntry>) -> FeedDocument {
        FeedDocument {
            id: "urn:uuid:feed".to_string(),
            title: "Karaoke".to_string(),
            subtitle: None,
            self_link: "https://example.com/feed.atom".to_string(),
            updated: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            generator: None,
            entries,
        }
    }

    fn entry(title: &str, summary: &str) -> FeedEntry {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        FeedEntry {
            id: "urn:uuid:entry".to_string(),
            title: title.to_string(),
            link: "https://www.youtube.com/watch?v=abc".to_string(),
            short_link: "https://youtu.be/abc".to_string(),
            published: ts,
            updated: ts,
            author: Author {
                name: "Talent".to_string(),
                uri: "https://www.youtube.com/channel/UC1".to_string(),
            },
            summary: summary.to_string(),
            thumbnail_url: Some("https://i.ytimg.com/vi/abc/hqdefault.jpg".to_string()),
        }
    }

    fn render(doc: &FeedDocument) -> String {
        String::from_utf8(write_atom(doc).unwrap()).unwrap()
    }

    #[test]
    fn feed_header() {
        let xml = render(&doc(vec![]));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<feed xmlns=\"http://www.w3.org/2005/Atom\""));
        assert!(xml.contains("<id>urn:uuid:feed</id>"));
        assert!(xml.contains(
            "<link href=\"https://example.com/feed.atom\" rel=\"self\" type=\"application/atom+xml\"/>"
        ));
        assert!(xml.contains("<updated>2024-03-01T00:00:00Z</updated>"));
        assert!(xml.trim_end().ends_with("</feed>"));
    }

    #[test]
    fn title_is_escaped() {
        let xml = render(&doc(vec![entry("Rock & <Roll>", "s")]));
        assert!(xml.contains("<title>Rock &amp; &lt;Roll&gt;</title>"));
    }

    #[test]
    fn summary_is_cdata() {
        let xml = render(&doc(vec![entry("t", "【LIVE】 <b>now</b>")]));
        assert!(xml.contains("<summary type=\"html\"><![CDATA[【LIVE】 <b>now</b>]]></summary>"));
    }

    #[test]
    fn cdata_terminator_is_split() {
        let xml = render(&doc(vec![entry("t", "a]]>b")]));
        assert!(xml.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
    }

    #[test]
    fn entry_elements() {
        let xml = render(&doc(vec![entry("t", "s")]));
        assert!(xml.contains("<published>2024-03-01T12:00:00Z</published>"));
        assert!(xml.contains("rel=\"alternate\""));
        assert!(xml.contains("<link href=\"https://youtu.be/abc\" rel=\"related\" type=\"text/html\"/>"));
        assert!(xml.contains("<name>Talent</name>"));
        assert!(xml.contains("<media:thumbnail url=\"https://i.ytimg.com/vi/abc/hqdefault.jpg\"/>"));
    }
}
