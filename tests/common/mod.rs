//! Common test utilities for avature-scraper integration tests

use std::time::Duration;

use avature_scraper::{Config, RateLimitConfig, RetryConfig, ScrapeConfig};

/// Config with millisecond-scale delays so the real cooldown and retry
/// protocols run at test speed
#[allow(dead_code)]
pub fn fast_config(workers: usize) -> Config {
    Config {
        scrape: ScrapeConfig {
            workers,
            request_delay: Duration::from_millis(1),
        },
        retry: RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        rate_limit: RateLimitConfig {
            cooldown: Duration::from_millis(20),
            max_retries: 2,
        },
        ..Default::default()
    }
}

/// Sitemap document with one `x-default` entry per URL
#[allow(dead_code)]
pub fn sitemap(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|url| {
            format!(
                r#"  <url>
    <loc>{url}</loc>
    <link rel="alternate" hreflang="x-default" href="{url}"/>
  </url>
"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:xhtml="http://www.w3.org/1999/xhtml">
{entries}</urlset>"#
    )
}

/// Detail page in the standard Avature template
#[allow(dead_code)]
pub fn job_page(title: &str, location: &str) -> String {
    format!(
        r#"<html>
<head><title>{title} - Careers</title></head>
<body>
  <div class="article__content__view__field__value--font">
    <div class="article__content__view__field__value">{title}</div>
  </div>
  <div class="article__content__view__field">
    <div class="article__content__view__field__label">Location</div>
    <div class="article__content__view__field__value">{location}</div>
  </div>
  <div class="article__content__view__field">
    <div class="article__content__view__field__label">Ref #:</div>
    <div class="article__content__view__field__value">R-100</div>
  </div>
  <div class="article__content__view__field field--rich-text">
    <div class="article__content__view__field__value">
      <p>Join the team building our hiring platform.</p>
    </div>
  </div>
</body>
</html>"#
    )
}

/// Error page served by Avature for removed postings (HTTP 200, no content)
#[allow(dead_code)]
pub fn error_page() -> String {
    "<html><head><title>Error - Page Not Found</title></head><body></body></html>".to_string()
}
