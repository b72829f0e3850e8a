use crate::url::extract_domain;
use crate::{UrlError, UrlResult};
use url::Url;

/// Derives the output file stem for a page URL
///
/// The stem is `<domain>_<path>` where the domain has its leading `www.`
/// removed and the path has surrounding slashes trimmed and inner slashes
/// replaced by underscores. An empty path becomes `index`. Query strings and
/// fragments are ignored, and a non-default port is appended to the domain.
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_`.
///
/// This is a pure function: the same URL always yields the same stem.
///
/// # Examples
///
/// ```
/// use sitemap_reader::url::derive_file_stem;
///
/// assert_eq!(
///     derive_file_stem("https://www.example.com/docs/intro/").unwrap(),
///     "example.com_docs_intro"
/// );
/// assert_eq!(derive_file_stem("https://example.com").unwrap(), "example.com_index");
/// ```
pub fn derive_file_stem(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
    let mut domain = extract_domain(&parsed).ok_or(UrlError::MissingDomain)?;

    if let Some(port) = parsed.port() {
        domain.push_str(&format!("_{}", port));
    }

    let path = parsed.path().trim_matches('/').replace('/', "_");
    let path = if path.is_empty() {
        "index".to_string()
    } else {
        path
    };

    Ok(sanitize(&format!("{}_{}", domain, path)))
}

/// Derives the output file name (stem plus `.md`) for a page URL
pub fn derive_file_name(url: &str) -> UrlResult<String> {
    Ok(format!("{}.md", derive_file_stem(url)?))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
