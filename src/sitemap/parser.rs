//! Sitemap XML parsing
//!
//! Extracts `<url><loc>` values from documents in the sitemap 0.9 namespace.
//! Elements outside that namespace are ignored, including look-alike `url`
//! and `loc` elements from other vocabularies.

use crate::sitemap::SitemapError;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

/// The only sitemap namespace recognized
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// A sitemap `<url>` element; `true` once its first `<loc>` was seen
    Url(bool),
    /// The first `<loc>` directly inside a sitemap `<url>`
    Loc,
    Other,
}

/// Parses a sitemap document and returns its page URLs in document order
///
/// Each `<url>` contributes the trimmed text of its first direct `<loc>`
/// child. Entries whose `<loc>` is missing or blank are skipped.
///
/// # Arguments
///
/// * `xml` - Raw document bytes
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Extracted URLs (possibly empty)
/// * `Err(SitemapError::Parse)` - The document is not well-formed XML
///
/// # Example
///
/// ```
/// use sitemap_reader::sitemap::parse_sitemap;
///
/// let xml = br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc> https://example.com/a </loc></url>
/// </urlset>"#;
/// assert_eq!(parse_sitemap(xml).unwrap(), vec!["https://example.com/a"]);
/// ```
pub fn parse_sitemap(xml: &[u8]) -> Result<Vec<String>, SitemapError> {
    let namespace = Namespace(SITEMAP_NAMESPACE.as_bytes());
    let mut reader = NsReader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut loc_text = String::new();
    let mut saw_root = false;
    let mut urls = Vec::new();

    loop {
        let event = match reader.read_resolved_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return Err(SitemapError::Parse(format!("malformed XML: {}", e))),
        };

        match event {
            (resolved, Event::Start(e)) => {
                saw_root = true;
                let in_sitemap_ns = matches!(resolved, ResolveResult::Bound(ns) if ns == namespace);
                let local = e.local_name();

                let frame = if in_sitemap_ns && local.as_ref() == b"url" {
                    Frame::Url(false)
                } else if in_sitemap_ns
                    && local.as_ref() == b"loc"
                    && stack.last() == Some(&Frame::Url(false))
                {
                    if let Some(parent) = stack.last_mut() {
                        *parent = Frame::Url(true);
                    }
                    loc_text.clear();
                    Frame::Loc
                } else {
                    Frame::Other
                };
                stack.push(frame);
            }
            (resolved, Event::Empty(e)) => {
                saw_root = true;
                let in_sitemap_ns = matches!(resolved, ResolveResult::Bound(ns) if ns == namespace);
                // `<loc/>` counts as the url's (blank) first loc
                if in_sitemap_ns && e.local_name().as_ref() == b"loc" {
                    if let Some(parent) = stack.last_mut() {
                        if *parent == Frame::Url(false) {
                            *parent = Frame::Url(true);
                        }
                    }
                }
            }
            (_, Event::Text(t)) => {
                if stack.last() == Some(&Frame::Loc) {
                    let text = t.unescape().map_err(|e| {
                        SitemapError::Parse(format!("invalid text in <loc>: {}", e))
                    })?;
                    loc_text.push_str(&text);
                }
            }
            (_, Event::CData(c)) => {
                if stack.last() == Some(&Frame::Loc) {
                    loc_text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            (_, Event::End(_)) => {
                if stack.pop() == Some(Frame::Loc) {
                    let loc = loc_text.trim();
                    if !loc.is_empty() {
                        urls.push(loc.to_string());
                    }
                    loc_text.clear();
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SitemapError::Parse("document has no root element".to_string()));
    }
    if !stack.is_empty() {
        return Err(SitemapError::Parse(format!(
            "unexpected end of document with {} unclosed element(s)",
            stack.len()
        )));
    }

    Ok(urls)
}
