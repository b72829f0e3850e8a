//! Frontmatter rendering and parsing
//!
//! Output files start with a `---` delimited block of `key: value` lines.
//! String values are double-quoted with `\`, `"` and line breaks escaped, so
//! every field stays on one line. `crawl_date` is written as a bare integer.

use crate::crawler::PageRecord;
use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A parsed output file: frontmatter fields plus the body after them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub fields: BTreeMap<String, String>,
    pub body: String,
}

impl Document {
    /// Returns a field value, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the title, treating a blank title as absent
    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.trim().is_empty())
    }
}

/// Renders a record as a complete output file
///
/// # Arguments
///
/// * `record` - The fetched page
/// * `domain` - Domain derived from the record's resolved URL
///
/// # Returns
///
/// The file contents: frontmatter, a blank line, then the markdown body
pub fn render_document(record: &PageRecord, domain: &str) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape(record.title())));
    out.push_str(&format!("source_url: \"{}\"\n", escape(record.source_url())));
    out.push_str(&format!("domain: \"{}\"\n", escape(domain)));
    out.push_str(&format!("crawl_date: {}\n", record.fetched_at()));
    out.push_str(&format!("description: \"{}\"\n", escape(record.description())));
    if !record.language().is_empty() {
        out.push_str(&format!("language: \"{}\"\n", escape(record.language())));
    }
    out.push_str("---\n\n");
    out.push_str(record.markdown_body());
    out
}

/// Parses an output file back into fields and body
///
/// Text without a leading frontmatter block is returned whole as the body.
/// Lines inside the block that are not `key: value` pairs are ignored.
pub fn parse_document(text: &str) -> Document {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(rest) = strip_delimiter_line(text) else {
        return Document {
            fields: BTreeMap::new(),
            body: text.to_string(),
        };
    };

    let mut fields = BTreeMap::new();
    let mut offset = 0;

    for raw_line in rest.split_inclusive('\n') {
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(|c| c == '\n' || c == '\r');

        if line.trim_end() == DELIMITER {
            let next = &rest[offset..];
            let body = next
                .strip_prefix("\r\n")
                .or_else(|| next.strip_prefix('\n'))
                .unwrap_or(next);
            return Document {
                fields,
                body: body.to_string(),
            };
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                fields.insert(key.to_string(), parse_value(value.trim()));
            }
        }
    }

    // Unterminated block: treat the whole file as body
    Document {
        fields: BTreeMap::new(),
        body: text.to_string(),
    }
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn parse_value(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        unescape(&raw[1..raw.len() - 1])
    } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
