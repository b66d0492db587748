//! Per-domain extraction strategies
//!
//! Every Avature portal serves one of a small set of markup families. A
//! strategy implements the field-level extractors for one family; the
//! [`ExtractionStrategy::parse`] protocol (shared by all strategies) turns a
//! detail page into a [`Job`] or nothing:
//!
//! 1. extract title and description
//! 2. reject error pages (title contains "error" AND description is empty —
//!    the conjunction avoids false positives on legitimate postings whose
//!    title happens to contain "error")
//! 3. extract labeled metadata fields
//! 4. resolve the location (metadata key first, then strategy fallbacks)
//!
//! Strategies are stateless; [`registry::StrategyRegistry`] selects one by
//! host name and falls back to [`standard::StandardStrategy`].

mod baufest;
mod gps;
mod nva;
pub mod registry;
mod standard;

pub use baufest::BaufestStrategy;
pub use gps::GpsHospitalityStrategy;
pub use nva::NvaStrategy;
pub use registry::StrategyRegistry;
pub use standard::StandardStrategy;

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

use crate::types::Job;

/// A site-family-specific extraction strategy.
///
/// Implementors provide the four field extractors; `parse` and the
/// error-page classification are shared.
pub trait ExtractionStrategy: Send + Sync {
    /// Extract the job title
    fn extract_title(&self, doc: &Html) -> String;

    /// Extract the description as an HTML fragment (content blocks
    /// concatenated in document order)
    fn extract_description(&self, doc: &Html) -> String;

    /// Extract labeled metadata fields, keyed by normalized name
    fn extract_metadata(&self, doc: &Html) -> BTreeMap<String, String>;

    /// Resolve the location. May consume metadata keys (e.g. city/state)
    /// that would otherwise duplicate the location.
    fn extract_location(
        &self,
        doc: &Html,
        metadata: &mut BTreeMap<String, String>,
    ) -> Option<String>;

    /// Whether the extracted title/description identify an error page.
    ///
    /// Both conditions must hold; a real posting with "error" in its title
    /// still has content.
    fn is_error_page(&self, title: &str, description: &str) -> bool {
        title.to_lowercase().contains("error") && description.trim().is_empty()
    }

    /// Parse a detail page into a [`Job`]; `None` for error pages.
    fn parse(
        &self,
        html: &str,
        url: &str,
        posted_at: Option<String>,
        source_site: &str,
    ) -> Option<Job> {
        let doc = Html::parse_document(html);

        let title = self.extract_title(&doc);
        let description = self.extract_description(&doc);

        if self.is_error_page(&title, &description) {
            return None;
        }

        let mut metadata = self.extract_metadata(&doc);
        let location = self.extract_location(&doc, &mut metadata);
        metadata.remove("location");
        let posted_at = posted_at.or_else(|| metadata.remove("posted_at"));

        Some(Job {
            title,
            description,
            apply_url: url.to_string(),
            location,
            posted_at,
            metadata,
            source_site: source_site.to_string(),
        })
    }
}

/// Parse a selector literal.
///
/// Only used with string literals validated at development time.
pub(crate) fn selector(src: &str) -> Selector {
    #[allow(clippy::expect_used)]
    Selector::parse(src).expect("selector literal must be valid")
}

/// Whitespace-normalized visible text of an element
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a field label: lower-cased, trailing colons stripped, trimmed.
///
/// Deliberately matches the order the label tables were built against;
/// labels whose colon is followed by whitespace keep the colon, which is why
/// the standard table carries entries both with and without one.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Title from the `<title>` tag, keeping the first segment before a
/// `" - "` or `" | "` separator
pub(crate) fn title_from_tag(doc: &Html) -> String {
    let sel = selector("title");
    let Some(title_el) = doc.select(&sel).next() else {
        return String::new();
    };
    let text = element_text(title_el);
    if let Some((first, _)) = text.split_once(" - ") {
        return first.trim().to_string();
    }
    if let Some((first, _)) = text.split_once(" | ") {
        return first.trim().to_string();
    }
    text
}

/// Content of a `<meta property="...">` tag
pub(crate) fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let sel = selector(&format!(r#"meta[property="{property}"]"#));
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}
