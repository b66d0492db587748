//! Configuration types for avature-scraper

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration for [`AvatureScraper`](crate::AvatureScraper)
///
/// Every field has a sensible default; `Config::default()` works out of the
/// box against real Avature portals. Nested sub-configs group settings by
/// concern.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings (headers, timeout)
    #[serde(default)]
    pub http: HttpConfig,

    /// Scrape orchestration settings (workers, inter-request delay)
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Retry settings for transient per-URL failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Shared rate-limit cooldown settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Check the configuration for values that cannot work at runtime.
    ///
    /// Called by [`AvatureScraper::new`](crate::AvatureScraper::new); exposed
    /// for consumers that build configs from untrusted input.
    pub fn validate(&self) -> Result<()> {
        if self.scrape.workers == 0 {
            return Err(Error::Config {
                message: "workers must be at least 1".to_string(),
                key: Some("scrape.workers".to_string()),
            });
        }
        if self.http.timeout.is_zero() {
            return Err(Error::Config {
                message: "request timeout must be non-zero".to_string(),
                key: Some("http.timeout".to_string()),
            });
        }
        if self.rate_limit.max_retries == 0 {
            return Err(Error::Config {
                message: "rate-limit retries must be at least 1".to_string(),
                key: Some("rate_limit.max_retries".to_string()),
            });
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(Error::Config {
                message: "backoff multiplier must be >= 1.0".to_string(),
                key: Some("retry.backoff_multiplier".to_string()),
            });
        }
        Ok(())
    }
}

/// HTTP client configuration
///
/// The default headers mimic a desktop browser; Avature serves 406 to
/// clients it does not recognize.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header sent with every request
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Accept-Language header sent with every request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
        }
    }
}

/// Scrape orchestration configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Number of parallel fetch workers per site (default: 1 = sequential)
    ///
    /// With one worker, detail pages are fetched strictly in sitemap order
    /// with `request_delay` between completions. With more than one worker
    /// there is no artificial delay; the shared cooldown gate is the only
    /// throttle.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Delay between requests in sequential mode (default: 500 ms)
    #[serde(default = "default_request_delay", with = "duration_ms_serde")]
    pub request_delay: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_delay: default_request_delay(),
        }
    }
}

/// Retry configuration for transient per-URL failures
///
/// Applies to timeouts, connection errors, and non-rate-limit HTTP statuses.
/// Rate-limited responses are handled by the cooldown protocol instead
/// (see [`RateLimitConfig`]), and parse failures are never retried.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per URL (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Shared rate-limit cooldown configuration
///
/// A 406/429 response from Avature indicates an IP-wide throttle. The
/// defaults (180 second cooldown, 3 retries) come from empirical testing
/// against production portals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// How long all workers pause after a rate-limit response (default: 180 s)
    #[serde(default = "default_cooldown", with = "duration_serde")]
    pub cooldown: Duration,

    /// How many cooldown cycles to attempt before giving up on a URL (default: 3)
    #[serde(default = "default_rate_limit_retries")]
    pub max_retries: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown: default_cooldown(),
            max_retries: default_rate_limit_retries(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_workers() -> usize {
    1
}

fn default_request_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_cooldown() -> Duration {
    Duration::from_secs(180)
}

fn default_rate_limit_retries() -> u32 {
    3
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds, for sub-second delays)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
