//! Small shared helpers

use std::path::Path;
use url::Url;

use crate::error::Result;

/// Load a site list from a text file, one base URL per line.
///
/// Blank lines and lines starting with `#` are skipped; surrounding
/// whitespace is trimmed.
pub async fn load_sites(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_site_list(&content))
}

/// Parse the site-list format from an in-memory string
#[must_use]
pub fn parse_site_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Host name of a URL, used as the `source_site` identifier
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
