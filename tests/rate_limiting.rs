//! Rate-limit protocol tests against a mock throttling portal
//!
//! Verifies the pipeline-level behavior: a throttled response pauses the
//! run, a recovered URL completes normally, and a URL that stays throttled
//! through its whole cooldown budget is skipped without dragging down its
//! siblings.

mod common;

use std::sync::Arc;

use avature_scraper::{AvatureScraper, Event, FailureReason, JobSink, MemorySink};
use common::{fast_config, job_page, sitemap};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_portal(server: &MockServer, detail_urls: &[String]) {
    Mock::given(method("GET"))
        .and(path("/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/careers/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(detail_urls)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_throttled_url_recovers_after_cooldown() {
    let server = MockServer::start().await;
    let detail_urls = vec![format!("{}/careers/JobDetail/Hot/1", server.uri())];
    mount_portal(&server, &detail_urls).await;

    // First response throttles, the post-cooldown retry succeeds.
    Mock::given(method("GET"))
        .and(path("/careers/JobDetail/Hot/1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/careers/JobDetail/Hot/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_page("Hot Job", "Austin, TX")))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let scraper = AvatureScraper::new(fast_config(1)).unwrap();
    let summary = scraper
        .scrape_site(
            &format!("{}/careers", server.uri()),
            Arc::clone(&sink) as Arc<dyn JobSink>,
        )
        .await
        .unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(sink.jobs().await[0].title, "Hot Job");
}

#[tokio::test]
async fn test_exhausted_url_skipped_while_siblings_complete() {
    let server = MockServer::start().await;
    let detail_urls: Vec<String> = ["Good/1", "Throttled/2", "Good/3"]
        .iter()
        .map(|tail| format!("{}/careers/JobDetail/{tail}", server.uri()))
        .collect();
    mount_portal(&server, &detail_urls).await;

    Mock::given(method("GET"))
        .and(path("/careers/JobDetail/Good/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_page("Good One", "Lyon")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/careers/JobDetail/Good/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_page("Good Three", "Nice")))
        .mount(&server)
        .await;
    // Never recovers: initial attempt plus every cooldown retry stays 429.
    Mock::given(method("GET"))
        .and(path("/careers/JobDetail/Throttled/2"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let scraper = AvatureScraper::new(fast_config(2)).unwrap();
    let mut events = scraper.subscribe();
    let summary = scraper
        .scrape_site(
            &format!("{}/careers", server.uri()),
            Arc::clone(&sink) as Arc<dyn JobSink>,
        )
        .await
        .unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed, 1);

    let mut titles: Vec<String> = sink.jobs().await.into_iter().map(|j| j.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["Good One", "Good Three"]);

    loop {
        match events.recv().await.unwrap() {
            Event::JobFailed { url, reason } => {
                assert!(url.contains("Throttled/2"));
                assert_eq!(reason, FailureReason::RateLimitExhausted);
                break;
            }
            Event::SiteFinished { .. } => panic!("expected a JobFailed event"),
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_cooldown_pauses_other_workers() {
    let server = MockServer::start().await;
    let detail_urls: Vec<String> = (0..4)
        .map(|n| format!("{}/careers/JobDetail/Role/{n}", server.uri()))
        .collect();
    mount_portal(&server, &detail_urls).await;

    // One URL throttles once; the others always succeed. With the shared
    // gate, every worker waits out the cooldown and the run still finishes
    // with all four jobs.
    Mock::given(method("GET"))
        .and(path("/careers/JobDetail/Role/0"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    for n in 0..4 {
        Mock::given(method("GET"))
            .and(path(format!("/careers/JobDetail/Role/{n}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(job_page(&format!("Role {n}"), "Quito")),
            )
            .mount(&server)
            .await;
    }

    let sink = Arc::new(MemorySink::new());
    let scraper = AvatureScraper::new(fast_config(3)).unwrap();
    let summary = scraper
        .scrape_site(
            &format!("{}/careers", server.uri()),
            Arc::clone(&sink) as Arc<dyn JobSink>,
        )
        .await
        .unwrap();

    assert_eq!(summary.written, 4);
    assert_eq!(summary.failed, 0);
}
