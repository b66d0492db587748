//! HTTP fetch layer
//!
//! Wraps `reqwest` with the shared cooldown gate and the Avature rate-limit
//! protocol: a 406 or 429 response means the whole IP is throttled, so the
//! worker triggers a global cooldown, sleeps through it, and retries the
//! same request a bounded number of times. Ordinary 4xx/5xx statuses are
//! surfaced to the caller, whose exponential-backoff retry handles them.
//!
//! Redirect policy is per-client in reqwest, so two clients are built: one
//! that follows redirects (sitemap resolution) and one that does not (detail
//! pages, where an unexpected redirect usually means a stale sitemap entry).

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;

use crate::config::{HttpConfig, RateLimitConfig};
use crate::error::{Error, Result};
use crate::rate_limit::RateLimitGate;

/// Statuses Avature uses for its IP-wide throttle
fn is_rate_limit_status(status: u16) -> bool {
    matches!(status, 406 | 429)
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after any redirects were resolved
    pub final_url: String,
    /// HTTP status code (2xx, or 3xx when redirects were not followed)
    pub status: u16,
    /// Response body
    pub body: String,
}

/// HTTP client shared by every worker of a scraper instance
///
/// Cloneable; clones share the underlying connection pools and the cooldown
/// gate.
#[derive(Clone)]
pub struct HttpClient {
    redirecting: reqwest::Client,
    direct: reqwest::Client,
    gate: RateLimitGate,
    rate_limit: RateLimitConfig,
}

impl HttpClient {
    /// Build the client pair from configuration.
    ///
    /// Fails if a configured header value is not a valid HTTP header.
    pub fn new(http: &HttpConfig, rate_limit: RateLimitConfig, gate: RateLimitGate) -> Result<Self> {
        let headers = build_headers(http)?;

        let redirecting = reqwest::Client::builder()
            .default_headers(headers.clone())
            .timeout(http.timeout)
            .build()?;
        let direct = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(http.timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            redirecting,
            direct,
            gate,
            rate_limit,
        })
    }

    /// The cooldown gate shared with this client
    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    /// Fetch a URL, honoring the shared cooldown and the rate-limit protocol.
    ///
    /// - Waits out any active cooldown before sending.
    /// - On 406/429: triggers a global cooldown, sleeps through it, retries
    ///   the same request up to the configured budget. A different error
    ///   during a retry propagates immediately. If every attempt stays
    ///   rate-limited the result is [`Error::RateLimitExhausted`].
    /// - On other 4xx/5xx: [`Error::HttpStatus`], no retry at this layer.
    /// - A 3xx with `follow_redirects = false` is returned as-is; the caller
    ///   decides what a redirect means for it.
    pub async fn fetch(&self, url: &str, follow_redirects: bool) -> Result<FetchedPage> {
        self.gate.wait_if_cooling_down().await;

        match self.request(url, follow_redirects).await {
            Err(Error::HttpStatus { status, .. }) if is_rate_limit_status(status) => {
                self.cooldown_and_retry(url, follow_redirects, status).await
            }
            other => other,
        }
    }

    /// Single request execution with status classification
    async fn request(&self, url: &str, follow_redirects: bool) -> Result<FetchedPage> {
        let client = if follow_redirects {
            &self.redirecting
        } else {
            &self.direct
        };

        let response = client.get(url).send().await?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        if status.is_redirection() {
            // Detail URLs are expected canonical; a redirect usually means
            // the sitemap entry went stale.
            tracing::debug!(url, status = status.as_u16(), "unexpected redirect not followed");
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }

    /// Bounded cooldown-retry loop for 406/429 responses
    async fn cooldown_and_retry(
        &self,
        url: &str,
        follow_redirects: bool,
        mut status: u16,
    ) -> Result<FetchedPage> {
        let cooldown = self.rate_limit.cooldown;
        let max_retries = self.rate_limit.max_retries;

        for attempt in 1..=max_retries {
            self.gate.trigger_cooldown(cooldown);
            tracing::warn!(
                url,
                status,
                attempt,
                max_retries,
                cooldown_secs = cooldown.as_secs(),
                "rate limited, all workers cooling down"
            );
            tokio::time::sleep(cooldown).await;

            match self.request(url, follow_redirects).await {
                Ok(page) => {
                    tracing::info!(url, attempts = attempt, "rate limit recovered");
                    return Ok(page);
                }
                Err(Error::HttpStatus { status: s, .. }) if is_rate_limit_status(s) => {
                    status = s;
                }
                // A different failure mode is not a throttle; let the
                // caller's transient-retry logic deal with it.
                Err(e) => return Err(e),
            }
        }

        Err(Error::RateLimitExhausted {
            attempts: max_retries,
            url: url.to_string(),
        })
    }
}

fn build_headers(http: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, parse_header(&http.user_agent, "http.user_agent")?);
    headers.insert(ACCEPT, parse_header(&http.accept, "http.accept")?);
    headers.insert(
        ACCEPT_LANGUAGE,
        parse_header(&http.accept_language, "http.accept_language")?,
    );
    Ok(headers)
}

fn parse_header(value: &str, key: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Config {
        message: format!("invalid header value: {e}"),
        key: Some(key.to_string()),
    })
}
