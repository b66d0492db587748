//! Error types for avature-scraper
//!
//! This module provides the crate-wide error taxonomy:
//! - Transport errors (timeout, connection, non-2xx status)
//! - Rate-limit exhaustion after the shared-cooldown protocol gave up
//! - Content errors (a page that yields no job)
//! - Setup errors (configuration, output sink creation)
//!
//! Per-URL failures are converted to [`crate::types::FailureReason`] at the
//! orchestrator boundary and never abort a run; only setup errors do.

use thiserror::Error;

/// Result type alias for avature-scraper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for avature-scraper
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "scrape.workers")
        key: Option<String>,
    },

    /// Network error (timeout, connection refused/reset, TLS, DNS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx HTTP status after redirects were resolved
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// The status code returned by the server
        status: u16,
        /// The URL that produced the status
        url: String,
    },

    /// Rate limit (406/429) persisted through every cooldown retry
    #[error("rate limit not recovered after {attempts} cooldowns for {url}")]
    RateLimitExhausted {
        /// Number of cooldown cycles that were attempted
        attempts: u32,
        /// The URL that stayed rate-limited
        url: String,
    },

    /// Page fetched successfully but no job could be extracted
    /// (error page, or markup the selected strategy does not recognize)
    #[error("no job could be extracted from {url}")]
    Parse {
        /// The detail-page URL that failed to parse
        url: String,
    },

    /// URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Status code of this error, if it carries one.
    ///
    /// Covers both explicit [`Error::HttpStatus`] and `reqwest` errors that
    /// originate from `error_for_status`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
