//! # avature-scraper
//!
//! Backend library for scraping job postings from Avature-hosted career
//! portals.
//!
//! ## Design Philosophy
//!
//! avature-scraper is designed to be:
//! - **Sitemap-driven** - Job URLs come from each portal's sitemap, never
//!   from crawling pagination
//! - **Rate-limit aware** - One throttled response pauses every worker;
//!   Avature throttles per IP, not per connection
//! - **Pluggable** - Non-conforming portals get their own extraction
//!   strategy; everything else uses the standard Avature template parser
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use avature_scraper::{AvatureScraper, Config, JsonlSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = AvatureScraper::new(Config::default())?;
//!
//!     // Subscribe to progress events
//!     let mut events = scraper.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let sites = vec!["https://acme.avature.net/careers".to_string()];
//!     let sink = Arc::new(JsonlSink::create("jobs.jsonl").await?);
//!     let written = scraper.scrape_all(&sites, sink).await?;
//!     println!("wrote {written} jobs");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// HTTP fetch layer with the shared cooldown protocol
pub mod http;
/// Per-domain extraction strategies
pub mod parsers;
/// Shared rate-limit cooldown gate
pub mod rate_limit;
/// Retry logic with exponential backoff
pub mod retry;
/// Scrape orchestrator
pub mod scraper;
/// JSONL segment splitting
pub mod segments;
/// Output sinks
pub mod sink;
/// Sitemap resolution and parsing
pub mod sitemap;
/// Core data types and progress events
pub mod types;
/// Small shared helpers
pub mod utils;

pub use config::{Config, HttpConfig, RateLimitConfig, RetryConfig, ScrapeConfig};
pub use error::{Error, Result};
pub use http::{FetchedPage, HttpClient};
pub use parsers::{
    BaufestStrategy, ExtractionStrategy, GpsHospitalityStrategy, NvaStrategy, StandardStrategy,
    StrategyRegistry,
};
pub use rate_limit::RateLimitGate;
pub use retry::{IsRetryable, retry_with_backoff};
pub use scraper::AvatureScraper;
pub use segments::{DEFAULT_SEGMENT_BYTES, merge_jsonl, split_jsonl};
pub use sink::{JobSink, JsonlSink, MemorySink};
pub use sitemap::{SitemapResolver, parse_sitemap};
pub use types::{Event, FailureReason, Job, SiteSummary};
pub use utils::{host_of, load_sites, parse_site_list};
