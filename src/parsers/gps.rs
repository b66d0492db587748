//! GPS Hospitality portal strategy (custom TPT template)
//!
//! The template flattens restaurant metadata into the article prose as
//! `Label: value` runs, so metadata is scavenged from the concatenated text
//! by prefix scanning rather than from structured label elements.

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{ExtractionStrategy, element_text, meta_property, selector, title_from_tag};

static CONTENT: LazyLock<Selector> = LazyLock::new(|| selector(".article__content"));

/// `Label:` prefix → metadata key pairs embedded in the article text
const TEXT_FIELDS: &[(&str, &str)] = &[
    ("Restaurant Number:", "restaurant_number"),
    ("City:", "city"),
    ("State:", "state"),
    ("Post Reference:", "ref_id"),
];

/// Strategy for the GPS Hospitality portal markup
#[derive(Debug, Default, Clone, Copy)]
pub struct GpsHospitalityStrategy;

impl ExtractionStrategy for GpsHospitalityStrategy {
    fn extract_title(&self, doc: &Html) -> String {
        meta_property(doc, "og:title").unwrap_or_else(|| title_from_tag(doc))
    }

    fn extract_description(&self, doc: &Html) -> String {
        doc.select(&CONTENT)
            .next()
            .map(|el| el.html())
            .unwrap_or_default()
    }

    fn extract_metadata(&self, doc: &Html) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        let Some(content) = doc.select(&CONTENT).next() else {
            return metadata;
        };
        let text = element_text(content);

        for (prefix, key) in TEXT_FIELDS {
            let Some(start) = text.find(prefix) else {
                continue;
            };
            let value_start = start + prefix.len();

            // The value runs until the next known prefix (document order is
            // not guaranteed, so scan all of them).
            let mut value_end = text.len();
            for (other, _) in TEXT_FIELDS {
                if other == prefix {
                    continue;
                }
                if let Some(other_start) = text.find(other) {
                    if other_start > start && other_start < value_end {
                        value_end = other_start;
                    }
                }
            }

            let value = text[value_start..value_end].trim();
            if !value.is_empty() {
                let value = value.split('#').next().unwrap_or_default().trim();
                metadata.insert((*key).to_string(), value.to_string());
            }
        }

        metadata
    }

    fn extract_location(
        &self,
        _doc: &Html,
        metadata: &mut BTreeMap<String, String>,
    ) -> Option<String> {
        let parts: Vec<String> = ["city", "state"]
            .iter()
            .filter_map(|key| metadata.remove(*key))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
      <head>
        <title>Assistant Manager | GPS Hospitality</title>
        <meta property="og:title" content="Assistant Manager - Burger King"/>
      </head>
      <body>
        <div class="article__content">
          <p>Lead the shift and keep guests happy.</p>
          <p>Restaurant Number: 4412 City: Atlanta State: GA Post Reference: GPS-881 #hourly</p>
        </div>
      </body>
    </html>"#;

    #[test]
    fn test_title_prefers_og_title() {
        let doc = Html::parse_document(PAGE);
        assert_eq!(
            GpsHospitalityStrategy.extract_title(&doc),
            "Assistant Manager - Burger King"
        );
    }

    #[test]
    fn test_metadata_prefix_scan() {
        let doc = Html::parse_document(PAGE);
        let metadata = GpsHospitalityStrategy.extract_metadata(&doc);
        assert_eq!(
            metadata.get("restaurant_number").map(String::as_str),
            Some("4412")
        );
        assert_eq!(metadata.get("city").map(String::as_str), Some("Atlanta"));
        assert_eq!(metadata.get("state").map(String::as_str), Some("GA"));
        assert_eq!(metadata.get("ref_id").map(String::as_str), Some("GPS-881"));
    }

    #[test]
    fn test_parse_composes_location_and_consumes_geo_fields() {
        let job = GpsHospitalityStrategy
            .parse(
                PAGE,
                "https://gpshospitality.avature.net/careers/JobDetail/AM/44",
                None,
                "gpshospitality.avature.net",
            )
            .expect("page must parse");

        assert_eq!(job.location.as_deref(), Some("Atlanta, GA"));
        assert!(!job.metadata.contains_key("city"));
        assert!(!job.metadata.contains_key("state"));
        assert_eq!(
            job.metadata.get("restaurant_number").map(String::as_str),
            Some("4412")
        );
    }

    #[test]
    fn test_missing_content_block() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(GpsHospitalityStrategy.extract_metadata(&doc).is_empty());
        assert!(GpsHospitalityStrategy.extract_description(&doc).is_empty());
    }
}
