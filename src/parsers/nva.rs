//! NVA Jobs portal strategy (custom detail template)

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{ExtractionStrategy, element_text, meta_property, selector, title_from_tag};

static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(".detailDescription"));
static FIELD_SET: LazyLock<Selector> = LazyLock::new(|| selector(".detailData .fieldSet"));
static FIELD_SET_LABEL: LazyLock<Selector> = LazyLock::new(|| selector(".fieldSetLabel"));
static FIELD_SET_VALUE: LazyLock<Selector> = LazyLock::new(|| selector(".fieldSetValue"));

/// Strategy for the NVA Jobs portal markup
#[derive(Debug, Default, Clone, Copy)]
pub struct NvaStrategy;

impl ExtractionStrategy for NvaStrategy {
    fn extract_title(&self, doc: &Html) -> String {
        meta_property(doc, "og:title").unwrap_or_else(|| title_from_tag(doc))
    }

    fn extract_description(&self, doc: &Html) -> String {
        if let Some(el) = doc.select(&DESCRIPTION).next() {
            return el.html();
        }
        meta_property(doc, "og:description").unwrap_or_default()
    }

    fn extract_metadata(&self, _doc: &Html) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn extract_location(
        &self,
        doc: &Html,
        _metadata: &mut BTreeMap<String, String>,
    ) -> Option<String> {
        for field_set in doc.select(&FIELD_SET) {
            let label = field_set.select(&FIELD_SET_LABEL).next();
            let value = field_set.select(&FIELD_SET_VALUE).next();
            if let (Some(label), Some(value)) = (label, value) {
                if element_text(label).to_lowercase().contains("location") {
                    return Some(element_text(value));
                }
            }
        }
        None
    }
}
