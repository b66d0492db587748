//! Core types for avature-scraper

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized job posting extracted from a detail page.
///
/// A `Job` is only ever constructed by a successful parse; pages classified
/// as error pages never produce one. Records are serialized to the output
/// sink as soon as they are available and not retained in memory.
///
/// Serialized key order matches the declaration order below, and `metadata`
/// is a sorted map, so identical pages always produce identical output lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job title
    pub title: String,

    /// Description as an HTML fragment: the recognized content blocks of the
    /// page concatenated in document order (may be empty)
    pub description: String,

    /// The source detail-page URL, exactly as fetched (no normalization)
    pub apply_url: String,

    /// Location, if the page exposed one
    pub location: Option<String>,

    /// Free-form posting date text, if the page exposed one
    pub posted_at: Option<String>,

    /// Site-specific labeled fields (business area, reference id, ...)
    /// keyed by normalized name
    pub metadata: BTreeMap<String, String>,

    /// Host name of the site the job was scraped from
    pub source_site: String,
}

/// Why a single detail URL failed to produce a job.
///
/// Failures are recorded and counted; they never abort the site or the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Non-2xx HTTP status that survived the transient-retry budget
    HttpStatus(u16),
    /// Request timed out on every attempt
    Timeout,
    /// Connection-level failure on every attempt
    ConnectionError,
    /// Page fetched but the strategy extracted no job (error page or
    /// unrecognized markup)
    ParseError,
    /// Rate limit persisted through the whole cooldown budget
    RateLimitExhausted,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::HttpStatus(status) => write!(f, "HTTP {status}"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::ConnectionError => write!(f, "connection error"),
            FailureReason::ParseError => write!(f, "parse error"),
            FailureReason::RateLimitExhausted => write!(f, "rate limit exhausted"),
        }
    }
}

/// Progress events broadcast by the scraper
///
/// Subscribe via [`AvatureScraper::subscribe`](crate::AvatureScraper::subscribe).
/// Events are best-effort: if no subscriber is listening they are dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Started processing a site
    SiteStarted {
        /// Base URL of the site
        base_url: String,
    },

    /// Sitemap resolved; fetching begins
    SitemapResolved {
        /// Base URL of the site
        base_url: String,
        /// Number of detail URLs found in the sitemap
        job_count: usize,
    },

    /// A job was extracted and written to the sink
    JobScraped {
        /// Detail-page URL
        url: String,
        /// Extracted job title
        title: String,
    },

    /// A detail URL failed and was skipped
    JobFailed {
        /// Detail-page URL
        url: String,
        /// Why it failed
        reason: FailureReason,
    },

    /// Finished a site
    SiteFinished {
        /// Base URL of the site
        base_url: String,
        /// Jobs written for this site
        written: u64,
        /// URLs skipped for this site
        failed: u64,
    },

    /// Finished the whole run
    RunFinished {
        /// Jobs written across all sites
        total_written: u64,
        /// URLs skipped across all sites
        total_failed: u64,
    },
}

/// Per-site outcome returned by a scrape run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteSummary {
    /// Base URL of the site
    pub base_url: String,
    /// Detail URLs found in the sitemap
    pub discovered: usize,
    /// Jobs written to the sink
    pub written: u64,
    /// URLs that failed and were skipped
    pub failed: u64,
}
