//! Sitemap resolution
//!
//! Avature exposes a per-locale sitemap with one canonical
//! (`hreflang="x-default"`) link per job, so a single `sitemap.xml` fetch is
//! a complete, duplicate-free job index for a site.
//!
//! Resolution never fails: any downstream error is logged and yields an
//! empty URL list, and the run continues with the next site.

use scraper::{Html, Selector};

use crate::http::HttpClient;

/// Literal path segment identifying a job detail page
const JOB_DETAIL_SEGMENT: &str = "/JobDetail/";

/// Resolves a base site URL to the job-detail URLs listed in its sitemap
#[derive(Clone)]
pub struct SitemapResolver {
    client: HttpClient,
}

impl SitemapResolver {
    /// Create a resolver over the shared HTTP client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Fetch all job-detail URLs for a site, in sitemap document order.
    ///
    /// Follows redirects on the base URL first to obtain the canonical final
    /// URL (trailing slash stripped), then fetches `{final_url}/sitemap.xml`.
    /// Duplicates, if the site ever produced any, are passed through.
    pub async fn resolve_job_urls(&self, base_url: &str) -> Vec<String> {
        let base = base_url.trim_end_matches('/');

        let final_url = match self.client.fetch(base, true).await {
            Ok(page) => page.final_url.trim_end_matches('/').to_string(),
            Err(e) => {
                tracing::warn!(base_url = base, error = %e, "site URL validation failed");
                return Vec::new();
            }
        };

        let sitemap_url = format!("{final_url}/sitemap.xml");
        let body = match self.client.fetch(&sitemap_url, true).await {
            Ok(page) => page.body,
            Err(e) => {
                tracing::warn!(sitemap_url, error = %e, "sitemap fetch failed");
                return Vec::new();
            }
        };

        let urls = parse_sitemap(&body);
        tracing::debug!(base_url = base, count = urls.len(), "sitemap resolved");
        urls
    }
}

/// Extract job-detail URLs from a sitemap document.
///
/// Keeps the `href` of every `link` element whose `hreflang` is `x-default`
/// and whose href contains `/JobDetail/` followed by a non-empty identifier.
/// Order equals document order; no deduplication.
pub fn parse_sitemap(document: &str) -> Vec<String> {
    // The selector literal is valid; parse cannot fail.
    let Ok(selector) = Selector::parse(r#"link[hreflang="x-default"]"#) else {
        return Vec::new();
    };

    let html = Html::parse_document(document);
    html.select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| {
            href.split_once(JOB_DETAIL_SEGMENT)
                .is_some_and(|(_, rest)| !rest.is_empty())
        })
        .map(str::to_string)
        .collect()
}
