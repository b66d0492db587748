//! Standard Avature portal strategy
//!
//! Covers the vast majority of portals: content lives in
//! `.article__content__view__field` blocks, each with an optional label
//! element and a value element. The label-mapping table below was collected
//! empirically across deployments; label text is inconsistent per site
//! (with and without trailing colons, singular/plural), so the table is
//! kept verbatim rather than normalized further.

use scraper::{Html, Selector};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use super::{ExtractionStrategy, element_text, normalize_label, selector, title_from_tag};

static FIELD: LazyLock<Selector> =
    LazyLock::new(|| selector(".article__content__view__field"));
static LABEL: LazyLock<Selector> =
    LazyLock::new(|| selector(".article__content__view__field__label"));
static VALUE: LazyLock<Selector> =
    LazyLock::new(|| selector(".article__content__view__field__value"));
static TITLE_VALUE: LazyLock<Selector> = LazyLock::new(|| {
    selector(".article__content__view__field__value--font .article__content__view__field__value")
});
static STRONG: LazyLock<Selector> = LazyLock::new(|| selector("strong"));

/// Normalized label → metadata key, collected across known deployments
static FIELD_MAPPINGS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // Location variants
        ("location", "location"),
        ("location:", "location"),
        ("locations", "location"),
        ("workplace location", "location"),
        ("city", "city"),
        ("state", "state"),
        ("country", "country"),
        ("region", "region"),
        // Business area variants
        ("business area", "business_area"),
        ("business function", "business_area"),
        ("business unit", "business_area"),
        ("job family", "business_area"),
        ("job family:", "business_area"),
        ("department", "department"),
        ("career field", "career_field"),
        ("entity", "entity"),
        // Reference ID variants
        ("ref #", "ref_id"),
        ("ref#", "ref_id"),
        ("job #", "ref_id"),
        ("job id", "ref_id"),
        ("job id:", "ref_id"),
        ("requisition #", "ref_id"),
        // Experience/seniority variants
        ("experience level", "experience_level"),
        ("experience", "experience_level"),
        ("seniority", "experience_level"),
        ("career level", "experience_level"),
        ("career level:", "experience_level"),
        ("position level", "position_level"),
        // Contract/employment type variants
        ("type of contract", "contract_type"),
        ("worker type reference", "contract_type"),
        ("worker type reference:", "contract_type"),
        ("employment type", "employment_type"),
        ("post type", "post_type"),
        // Work pattern variants
        ("working pattern", "work_pattern"),
        ("onsite or remote", "work_pattern"),
        ("remote type", "remote_type"),
        // Compensation variants
        ("salary", "salary"),
        ("pay rate type", "pay_type"),
        ("pay rate type:", "pay_type"),
        // Date variants
        ("date", "posted_at"),
        ("posted date", "posted_at"),
        ("posting date", "posted_at"),
        ("date published", "posted_at"),
        ("closing date", "closing_date"),
        // Other fields
        ("domain", "domain"),
        ("duration", "duration"),
        ("civil service grade", "grade"),
        ("additional location", "additional_location"),
        ("additional location:", "additional_location"),
        ("number of jobs available", "positions"),
        ("security clearance required", "clearance"),
        ("name", "job_name"),
        ("posting title", "posting_title"),
    ])
});

/// Labels whose blocks are prose, not metadata; included in the description
/// with the label as a heading
static DESCRIPTION_LABELS: &[&str] = &[
    "about the role",
    "what is in it for you",
    "you will be responsible for",
    "you will need",
    "about us",
    "responsibilities",
    "qualifications",
    "requirements",
    "description",
    "job description",
    "what you'll do",
    "what we offer",
    "who you are",
    "your role",
    "the role",
    "the opportunity",
    "overview",
    "summary",
];

/// Unlabeled blocks with visible text longer than this are treated as prose
/// rather than short label/value pairs
const PROSE_THRESHOLD: usize = 50;

/// Strategy for the standard Avature portal structure (most sites)
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardStrategy;

impl ExtractionStrategy for StandardStrategy {
    fn extract_title(&self, doc: &Html) -> String {
        if let Some(el) = doc.select(&TITLE_VALUE).next() {
            return element_text(el);
        }

        // Some deployments label the title as an ordinary field.
        for field in doc.select(&FIELD) {
            let Some(label_el) = field.select(&LABEL).next() else {
                continue;
            };
            let label = normalize_label(&element_text(label_el));
            if label == "job name" || label == "job title" {
                if let Some(value_el) = field.select(&VALUE).next() {
                    return element_text(value_el);
                }
            }
        }

        title_from_tag(doc)
    }

    fn extract_description(&self, doc: &Html) -> String {
        let mut parts = Vec::new();

        for field in doc.select(&FIELD) {
            let label_el = field.select(&LABEL).next();
            let Some(value_el) = field.select(&VALUE).next() else {
                continue;
            };

            if let Some(label_el) = label_el {
                let label = normalize_label(&element_text(label_el));
                if FIELD_MAPPINGS.contains_key(label.as_str()) {
                    continue;
                }
                if DESCRIPTION_LABELS.contains(&label.as_str()) {
                    parts.push(format!(
                        "<h4>{}</h4>\n{}",
                        element_text(label_el),
                        value_el.html()
                    ));
                    continue;
                }
            }

            let rich_text = field
                .value()
                .classes()
                .any(|c| c == "field--rich-text" || c == "tf_replaceFieldVideoTokens");
            if rich_text {
                parts.push(value_el.html());
            } else if label_el.is_none() {
                let text = element_text(value_el);
                if text.len() > PROSE_THRESHOLD {
                    parts.push(value_el.html());
                }
            }
        }

        parts.join("\n")
    }

    fn extract_metadata(&self, doc: &Html) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();

        for field in doc.select(&FIELD) {
            let Some(label_el) = field.select(&LABEL).next() else {
                continue;
            };
            let label = normalize_label(&element_text(label_el));
            let Some(key) = FIELD_MAPPINGS.get(label.as_str()) else {
                continue;
            };
            if let Some(value_el) = field.select(&VALUE).next() {
                metadata.insert((*key).to_string(), element_text(value_el));
            }
        }

        metadata
    }

    fn extract_location(
        &self,
        doc: &Html,
        metadata: &mut BTreeMap<String, String>,
    ) -> Option<String> {
        if let Some(location) = metadata.get("location") {
            return Some(location.clone());
        }

        // UCLA Health style: a bold "Work Location:" run inside the prose.
        for strong in doc.select(&STRONG) {
            let text = element_text(strong);
            if let Some(rest) = text.strip_prefix("Work Location:") {
                return Some(rest.trim().to_string());
            }
        }

        // Compose from granular geo fields, consuming them so the location
        // is not duplicated in metadata.
        let parts: Vec<String> = ["city", "state", "country", "region"]
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

    fn field(label: Option<&str>, value: &str, extra_class: &str) -> String {
        let label_html = label
            .map(|l| format!(r#"<div class="article__content__view__field__label">{l}</div>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="article__content__view__field {extra_class}">
                 {label_html}
                 <div class="article__content__view__field__value">{value}</div>
               </div>"#
        )
    }

    fn page(body: &str) -> String {
        format!("<html><head><title>Fallback - Acme</title></head><body>{body}</body></html>")
    }

    #[test]
    fn test_title_primary_selector() {
        let html = page(&format!(
            r#"<div class="article__content__view__field__value--font">
                 <div class="article__content__view__field__value">Senior Backend Engineer</div>
               </div>{}"#,
            field(None, "something", "")
        ));
        let doc = Html::parse_document(&html);
        assert_eq!(
            StandardStrategy.extract_title(&doc),
            "Senior Backend Engineer"
        );
    }

    #[test]
    fn test_title_from_labeled_job_name_field() {
        let html = page(&field(Some("Job Name"), "Data Analyst", ""));
        let doc = Html::parse_document(&html);
        assert_eq!(StandardStrategy.extract_title(&doc), "Data Analyst");
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let html = page("");
        let doc = Html::parse_document(&html);
        assert_eq!(StandardStrategy.extract_title(&doc), "Fallback");
    }

    #[test]
    fn test_description_includes_rich_text_blocks() {
        let html = page(&field(None, "<p>Short</p>", "field--rich-text"));
        let doc = Html::parse_document(&html);
        let desc = StandardStrategy.extract_description(&doc);
        assert!(desc.contains("<p>Short</p>"), "got: {desc}");
    }

    #[test]
    fn test_description_includes_long_unlabeled_blocks() {
        let long = "We are looking for an engineer to build and operate our hiring platform.";
        let html = page(&field(None, long, ""));
        let doc = Html::parse_document(&html);
        assert!(StandardStrategy.extract_description(&doc).contains(long));
    }

    #[test]
    fn test_description_excludes_short_unlabeled_blocks() {
        let html = page(&field(None, "Full time", ""));
        let doc = Html::parse_document(&html);
        assert!(StandardStrategy.extract_description(&doc).is_empty());
    }

    #[test]
    fn test_description_excludes_metadata_fields() {
        let html = page(&field(Some("Business Area"), "Engineering", ""));
        let doc = Html::parse_document(&html);
        assert!(StandardStrategy.extract_description(&doc).is_empty());
    }

    #[test]
    fn test_description_label_gets_heading_prefix() {
        let html = page(&field(Some("Responsibilities"), "<ul><li>Ship</li></ul>", ""));
        let doc = Html::parse_document(&html);
        let desc = StandardStrategy.extract_description(&doc);
        assert!(desc.starts_with("<h4>Responsibilities</h4>"), "got: {desc}");
        assert!(desc.contains("<li>Ship</li>"));
    }

    #[test]
    fn test_metadata_label_mapping() {
        let html = page(&format!(
            "{}{}{}",
            field(Some("Ref #:"), "R-1234", ""),
            field(Some("Experience Level"), "Senior", ""),
            field(Some("Unmapped Label"), "ignored", "")
        ));
        let doc = Html::parse_document(&html);
        let metadata = StandardStrategy.extract_metadata(&doc);
        assert_eq!(metadata.get("ref_id").map(String::as_str), Some("R-1234"));
        assert_eq!(
            metadata.get("experience_level").map(String::as_str),
            Some("Senior")
        );
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn test_location_prefers_metadata_key() {
        let doc = Html::parse_document(&page(""));
        let mut metadata =
            BTreeMap::from([("location".to_string(), "Madrid, Spain".to_string())]);
        let location = StandardStrategy.extract_location(&doc, &mut metadata);
        assert_eq!(location.as_deref(), Some("Madrid, Spain"));
    }

    #[test]
    fn test_location_work_location_fallback() {
        let html = page("<p><strong>Work Location: Los Angeles, CA</strong></p>");
        let doc = Html::parse_document(&html);
        let mut metadata = BTreeMap::new();
        let location = StandardStrategy.extract_location(&doc, &mut metadata);
        assert_eq!(location.as_deref(), Some("Los Angeles, CA"));
    }

    #[test]
    fn test_location_composed_from_geo_fields_consumes_them() {
        let doc = Html::parse_document(&page(""));
        let mut metadata = BTreeMap::from([
            ("city".to_string(), "Atlanta".to_string()),
            ("state".to_string(), "GA".to_string()),
            ("country".to_string(), "USA".to_string()),
        ]);
        let location = StandardStrategy.extract_location(&doc, &mut metadata);
        assert_eq!(location.as_deref(), Some("Atlanta, GA, USA"));
        assert!(
            metadata.is_empty(),
            "geo fields must be consumed to avoid duplication"
        );
    }

    #[test]
    fn test_parse_full_page_moves_location_out_of_metadata() {
        let html = page(&format!(
            "{}{}{}",
            field(Some("Location"), "Berlin, Germany", ""),
            field(Some("Ref #:"), "R-77", ""),
            field(
                None,
                "We build hiring infrastructure used by enterprises worldwide.",
                "field--rich-text"
            )
        ));

        let job = StandardStrategy
            .parse(
                &html,
                "https://acme.avature.net/careers/JobDetail/X/1",
                None,
                "acme.avature.net",
            )
            .expect("valid page must parse");

        assert_eq!(job.location.as_deref(), Some("Berlin, Germany"));
        assert!(
            !job.metadata.contains_key("location"),
            "location must be removed from metadata"
        );
        assert_eq!(job.metadata.get("ref_id").map(String::as_str), Some("R-77"));
        assert_eq!(job.apply_url, "https://acme.avature.net/careers/JobDetail/X/1");
        assert_eq!(job.source_site, "acme.avature.net");
    }

    #[test]
    fn test_parse_posted_at_taken_from_metadata() {
        let html = page(&format!(
            "{}{}",
            field(Some("Posted Date"), "2025-06-01", ""),
            field(None, "A description long enough to pass the prose threshold easily.", "")
        ));
        let job = StandardStrategy
            .parse(&html, "https://a.avature.net/x/JobDetail/Y/2", None, "a.avature.net")
            .unwrap();
        assert_eq!(job.posted_at.as_deref(), Some("2025-06-01"));
        assert!(!job.metadata.contains_key("posted_at"));
    }

    #[test]
    fn test_parse_error_page_returns_none() {
        let html =
            "<html><head><title>Error - Not Found</title></head><body><div></div></body></html>";
        assert!(
            StandardStrategy
                .parse(html, "https://a.avature.net/x/JobDetail/Z/3", None, "a.avature.net")
                .is_none()
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let html = page(&format!(
            "{}{}",
            field(Some("Location"), "Łódź, Poland", ""),
            field(Some("Description"), "<p>Responsibilities – many.</p>", "")
        ));
        let url = "https://a.avature.net/x/JobDetail/W/4";
        let first = StandardStrategy.parse(&html, url, None, "a.avature.net").unwrap();
        let second = StandardStrategy.parse(&html, url, None, "a.avature.net").unwrap();
        assert_eq!(first, second);
    }
}
