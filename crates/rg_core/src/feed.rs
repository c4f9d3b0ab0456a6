//! RSS 2.0 rendering of a [`CanonicalFeed`].

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::types::{CanonicalFeed, CanonicalRecord};
use crate::{Error, Result};

pub const RSS_VERSION: &str = "2.0";
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const GENERATOR: &str = concat!("rss-generator ", env!("CARGO_PKG_VERSION"));

/// Canonical timestamp form used for every date in a serialized feed.
pub fn render_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc2822()
}

impl CanonicalFeed {
    /// Serializes the feed into an RSS 2.0 document, XML declaration included.
    pub fn to_rss(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_feed(&mut writer, self)?;

        let xml = String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        debug!(title = %self.title, items = self.items.len(), bytes = xml.len(), "Rendered feed");
        Ok(xml)
    }
}

fn write_feed(w: &mut Writer<Vec<u8>>, feed: &CanonicalFeed) -> Result<()> {
    emit(w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", RSS_VERSION));
    emit(w, Event::Start(rss))?;
    emit(w, Event::Start(BytesStart::new("channel")))?;

    let generated = render_timestamp(&feed.generated_at);
    write_text_element(w, "title", &feed.title)?;
    write_text_element(w, "link", &feed.link)?;
    write_text_element(w, "description", &feed.description)?;
    write_text_element(w, "pubDate", &generated)?;
    write_text_element(w, "lastBuildDate", &generated)?;
    write_text_element(w, "generator", GENERATOR)?;

    for item in &feed.items {
        write_item(w, item)?;
    }

    emit(w, Event::End(BytesEnd::new("channel")))?;
    emit(w, Event::End(BytesEnd::new("rss")))?;
    Ok(())
}

fn is_permalink(identifier: &str) -> bool {
    identifier.starts_with("http://") || identifier.starts_with("https://")
}

fn write_item(w: &mut Writer<Vec<u8>>, item: &CanonicalRecord) -> Result<()> {
    emit(w, Event::Start(BytesStart::new("item")))?;
    write_text_element(w, "title", &item.title)?;
    write_text_element(w, "link", &item.link)?;
    write_text_element(w, "description", &item.description)?;
    write_text_element(w, "pubDate", &item.published)?;

    let mut guid = BytesStart::new("guid");
    if !is_permalink(&item.identifier) {
        guid.push_attribute(("isPermaLink", "false"));
    }
    emit(w, Event::Start(guid))?;
    emit(w, Event::Text(BytesText::new(&sanitize_text(&item.identifier))))?;
    emit(w, Event::End(BytesEnd::new("guid")))?;

    if let Some(author) = &item.author {
        write_text_element(w, "author", author)?;
    }
    if let Some(category) = &item.category {
        write_text_element(w, "category", category)?;
    }
    emit(w, Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    emit(w, Event::Start(BytesStart::new(name)))?;
    emit(w, Event::Text(BytesText::new(&sanitize_text(text))))?;
    emit(w, Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    w.write_event(event)
        .map_err(|e| Error::Serialization(e.to_string()))
}

// Scraped text regularly carries control characters that XML 1.0 forbids.
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
