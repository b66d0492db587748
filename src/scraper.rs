//! Scrape orchestrator
//!
//! Sites are processed strictly one at a time in input order; within a site,
//! detail URLs are dispatched in sitemap order to a bounded worker pool and
//! results are written in completion order. One URL's unrecoverable failure
//! never aborts a sibling: every per-URL failure is converted to a
//! [`FailureReason`], counted, and logged. Only resource failures (the
//! output sink) abort a run.

use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::parsers::StrategyRegistry;
use crate::rate_limit::RateLimitGate;
use crate::retry::retry_with_backoff;
use crate::sink::JobSink;
use crate::sitemap::SitemapResolver;
use crate::types::{Event, FailureReason, Job, SiteSummary};
use crate::utils::host_of;

/// Main scraper instance (cloneable - all fields are shared handles)
#[derive(Clone)]
pub struct AvatureScraper {
    config: Arc<Config>,
    http: HttpClient,
    sitemap: SitemapResolver,
    registry: Arc<StrategyRegistry>,
    event_tx: broadcast::Sender<Event>,
}

impl AvatureScraper {
    /// Create a scraper from configuration.
    ///
    /// Builds the shared cooldown gate, the HTTP client pair, and the
    /// strategy registry preloaded with the known portal overrides.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let gate = RateLimitGate::new();
        let http = HttpClient::new(&config.http, config.rate_limit.clone(), gate)?;
        let sitemap = SitemapResolver::new(http.clone());
        let (event_tx, _) = broadcast::channel(256);

        Ok(Self {
            config: Arc::new(config),
            http,
            sitemap,
            registry: Arc::new(StrategyRegistry::new()),
            event_tx,
        })
    }

    /// Subscribe to progress events.
    ///
    /// Events are broadcast best-effort; a slow subscriber may observe
    /// lagged gaps, and running without subscribers is normal.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The strategy registry, for registering custom per-domain strategies
    /// before a run
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Resolve every site's sitemap and report job counts without fetching
    /// any detail page.
    pub async fn discover_all(&self, base_urls: &[String]) -> Vec<(String, usize)> {
        let mut results = Vec::with_capacity(base_urls.len());
        let mut total = 0;

        for base_url in base_urls {
            let base = base_url.trim_end_matches('/');
            let count = self.sitemap.resolve_job_urls(base).await.len();
            tracing::info!(site = base, jobs = count, "discovered");
            total += count;
            results.push((base.to_string(), count));
        }

        tracing::info!(sites = base_urls.len(), total_jobs = total, "discovery finished");
        results
    }

    /// Scrape every site in order, streaming jobs into the sink.
    ///
    /// Returns the cumulative count of successfully written jobs. A site
    /// with zero extractable jobs is not an error; per-URL failures are
    /// skipped and counted. Sink write failures abort the run.
    pub async fn scrape_all(&self, base_urls: &[String], sink: Arc<dyn JobSink>) -> Result<u64> {
        let mut total_written = 0;
        let mut total_failed = 0;

        for base_url in base_urls {
            let summary = self.scrape_site(base_url, Arc::clone(&sink)).await?;
            total_written += summary.written;
            total_failed += summary.failed;
        }

        tracing::info!(
            sites = base_urls.len(),
            jobs_written = total_written,
            failures_skipped = total_failed,
            "scrape run finished"
        );
        self.emit(Event::RunFinished {
            total_written,
            total_failed,
        });

        Ok(total_written)
    }

    /// Scrape a single site: resolve its sitemap, then fetch and extract
    /// every detail URL through the worker pool.
    pub async fn scrape_site(&self, base_url: &str, sink: Arc<dyn JobSink>) -> Result<SiteSummary> {
        let base = base_url.trim_end_matches('/');
        let source_site = host_of(base).unwrap_or_else(|| base.to_string());

        tracing::info!(site = base, "scraping site");
        self.emit(Event::SiteStarted {
            base_url: base.to_string(),
        });

        let job_urls = self.sitemap.resolve_job_urls(base).await;
        let total = job_urls.len();
        tracing::info!(site = base, jobs = total, "found jobs in sitemap");
        self.emit(Event::SitemapResolved {
            base_url: base.to_string(),
            job_count: total,
        });

        let (written, failed) = if self.config.scrape.workers <= 1 {
            self.scrape_sequential(&job_urls, &source_site, &sink).await?
        } else {
            self.scrape_concurrent(job_urls, &source_site, &sink).await?
        };

        if failed > 0 {
            tracing::info!(site = base, skipped = failed, "skipped failed requests");
        }
        self.emit(Event::SiteFinished {
            base_url: base.to_string(),
            written,
            failed,
        });

        Ok(SiteSummary {
            base_url: base.to_string(),
            discovered: total,
            written,
            failed,
        })
    }

    /// One worker: fetch in sitemap order with a fixed delay between
    /// completions.
    async fn scrape_sequential(
        &self,
        job_urls: &[String],
        source_site: &str,
        sink: &Arc<dyn JobSink>,
    ) -> Result<(u64, u64)> {
        let total = job_urls.len();
        let mut written = 0;
        let mut failed = 0;

        for (index, url) in job_urls.iter().enumerate() {
            let result = self.fetch_job(url, source_site).await;
            self.record(url, result, index + 1, total, sink, &mut written, &mut failed)
                .await?;

            if index + 1 < total {
                tokio::time::sleep(self.config.scrape.request_delay).await;
            }
        }

        Ok((written, failed))
    }

    /// Worker pool: dispatch in sitemap order, drain in completion order.
    /// No artificial delay; the shared cooldown gate is the only throttle.
    async fn scrape_concurrent(
        &self,
        job_urls: Vec<String>,
        source_site: &str,
        sink: &Arc<dyn JobSink>,
    ) -> Result<(u64, u64)> {
        let total = job_urls.len();
        let semaphore = Arc::new(Semaphore::new(self.config.scrape.workers));
        let mut tasks: JoinSet<(String, std::result::Result<Job, FailureReason>)> = JoinSet::new();

        for url in job_urls {
            let scraper = self.clone();
            let source_site = source_site.to_string();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed while tasks run.
                    Err(_) => return (url, Err(FailureReason::ConnectionError)),
                };
                let result = scraper.fetch_job(&url, &source_site).await;
                drop(permit);
                (url, result)
            });
        }

        let mut written = 0;
        let mut failed = 0;
        let mut completed = 0;

        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            match joined {
                Ok((url, result)) => {
                    self.record(&url, result, completed, total, sink, &mut written, &mut failed)
                        .await?;
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(error = %e, "scrape task panicked");
                }
            }
        }

        Ok((written, failed))
    }

    /// Write a successful job to the sink (or count the failure) and report
    /// progress.
    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        url: &str,
        result: std::result::Result<Job, FailureReason>,
        completed: usize,
        total: usize,
        sink: &Arc<dyn JobSink>,
        written: &mut u64,
        failed: &mut u64,
    ) -> Result<()> {
        match result {
            Ok(job) => {
                sink.write(&job).await?;
                *written += 1;
                tracing::info!(progress = %format_args!("{completed}/{total}"), title = %job.title, "job scraped");
                self.emit(Event::JobScraped {
                    url: url.to_string(),
                    title: job.title,
                });
            }
            Err(reason) => {
                *failed += 1;
                tracing::warn!(progress = %format_args!("{completed}/{total}"), url, reason = %reason, "job skipped");
                self.emit(Event::JobFailed {
                    url: url.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Fetch and extract one detail page.
    ///
    /// Transient transport failures are retried with exponential backoff.
    /// Rate-limit exhaustion is not retried here (the fetch layer already
    /// spent its cooldown budget), and parse failures are content, not
    /// transport.
    async fn fetch_job(&self, url: &str, source_site: &str) -> std::result::Result<Job, FailureReason> {
        let page = retry_with_backoff(&self.config.retry, || self.http.fetch(url, false))
            .await
            .map_err(classify_failure)?;

        let strategy = self.registry.get(url);
        strategy
            .parse(&page.body, url, None, source_site)
            .ok_or(FailureReason::ParseError)
    }

    fn emit(&self, event: Event) {
        // No subscriber is a normal state.
        let _ = self.event_tx.send(event);
    }
}

/// Collapse a fetch error into the reason recorded for a skipped URL
fn classify_failure(error: Error) -> FailureReason {
    match error {
        Error::RateLimitExhausted { .. } => FailureReason::RateLimitExhausted,
        Error::HttpStatus { status, .. } => FailureReason::HttpStatus(status),
        Error::Network(e) if e.is_timeout() => FailureReason::Timeout,
        Error::Network(_) => FailureReason::ConnectionError,
        _ => FailureReason::ConnectionError,
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure() {
        let reason = classify_failure(Error::RateLimitExhausted {
            attempts: 3,
            url: "https://x.avature.net".to_string(),
        });
        assert_eq!(reason, FailureReason::RateLimitExhausted);

        let reason = classify_failure(Error::HttpStatus {
            status: 502,
            url: "https://x.avature.net".to_string(),
        });
        assert_eq!(reason, FailureReason::HttpStatus(502));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = Config {
            scrape: crate::config::ScrapeConfig {
                workers: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(AvatureScraper::new(config).is_err());
    }

    #[tokio::test]
    async fn test_subscribe_receives_emitted_events() {
        let scraper = AvatureScraper::new(Config::default()).unwrap();
        let mut events = scraper.subscribe();

        scraper.emit(Event::SiteStarted {
            base_url: "https://acme.avature.net".to_string(),
        });

        match events.recv().await.unwrap() {
            Event::SiteStarted { base_url } => {
                assert_eq!(base_url, "https://acme.avature.net");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
