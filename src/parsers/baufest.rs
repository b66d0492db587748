//! Baufest portal strategy (custom template)

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{ExtractionStrategy, element_text, selector, title_from_tag};

static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(".jobDescription"));
static INFO_LABEL: LazyLock<Selector> = LazyLock::new(|| selector(".jobInfoLabel"));
static INFO_LOCATION: LazyLock<Selector> = LazyLock::new(|| selector(".jobInfoLocation"));

/// Strategy for the Baufest portal markup
#[derive(Debug, Default, Clone, Copy)]
pub struct BaufestStrategy;

impl ExtractionStrategy for BaufestStrategy {
    fn extract_title(&self, doc: &Html) -> String {
        title_from_tag(doc)
    }

    fn extract_description(&self, doc: &Html) -> String {
        doc.select(&DESCRIPTION)
            .next()
            .map(|el| el.html())
            .unwrap_or_default()
    }

    fn extract_metadata(&self, doc: &Html) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();

        for label_el in doc.select(&INFO_LABEL) {
            let text = element_text(label_el);
            for prefix in ["Ref#:", "Ref #:"] {
                if let Some(rest) = text.strip_prefix(prefix) {
                    metadata.insert("ref_id".to_string(), rest.trim().to_string());
                }
            }
        }

        metadata
    }

    fn extract_location(
        &self,
        doc: &Html,
        _metadata: &mut BTreeMap<String, String>,
    ) -> Option<String> {
        doc.select(&INFO_LOCATION).next().map(element_text)
    }
}
