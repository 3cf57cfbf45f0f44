//! Bounded, cancellable batch scraping.
//!
//! A batch of URLs is fetched on a semaphore-bounded pool of tasks. Each
//! page is fetched, parsed once, and reduced to its paragraph text plus
//! (for seed pages) its same-origin links. Outcomes come back in input
//! order regardless of completion order.

use std::sync::Arc;

use scraper::Html;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use askweb_shared::{AskWebError, CrawlConfig, ExtractedContent, FetchOutcome, Result};

use crate::extract::paragraph_text;
use crate::fetcher::PageFetcher;
use crate::links::same_origin_links;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Crawl depth of a page. Only seed pages are expanded for links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Returned directly by the search.
    Seed,
    /// Discovered on a seed page.
    Second,
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    /// Paragraph text (may be empty).
    pub content: ExtractedContent,
    /// Same-origin links; always empty for [`Tier::Second`].
    pub links: Vec<String>,
}

/// Per-URL result of a batch.
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Scraped(ScrapedPage),
    Failed { url: String, reason: String },
}

impl ScrapeOutcome {
    fn failed(url: &str, reason: impl Into<String>) -> Self {
        Self::Failed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// The URL this outcome belongs to.
    pub fn url(&self) -> &str {
        match self {
            Self::Scraped(page) => &page.content.source_url,
            Self::Failed { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    max_paragraphs: usize,
    max_links: usize,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Concurrent page scraper bounded by `CrawlConfig::concurrency`.
#[derive(Debug, Clone)]
pub struct Crawler {
    config: CrawlConfig,
    fetcher: PageFetcher,
}

impl Crawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    fn limits(&self) -> Limits {
        Limits {
            max_paragraphs: self.config.max_paragraphs,
            max_links: self.config.max_links_per_page,
        }
    }

    /// Scrape every URL in `urls`, at most `concurrency` at a time.
    ///
    /// `on_page` sees each outcome in input order as soon as it and all
    /// earlier ones are available. Page failures are returned as
    /// [`ScrapeOutcome::Failed`]; the only error is [`AskWebError::Cancelled`].
    #[instrument(skip_all, fields(tier = ?tier, urls = urls.len()))]
    pub async fn scrape_all<F>(
        &self,
        urls: &[String],
        tier: Tier,
        cancel: &CancellationToken,
        mut on_page: F,
    ) -> Result<Vec<ScrapeOutcome>>
    where
        F: FnMut(usize, &ScrapeOutcome),
    {
        if cancel.is_cancelled() {
            return Err(AskWebError::Cancelled);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let limits = self.limits();
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let fetcher = self.fetcher.clone();
            let sem = semaphore.clone();
            let cancel = cancel.clone();
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => ScrapeOutcome::failed(&url, "cancelled"),
                    outcome = async {
                        let Ok(_permit) = sem.acquire().await else {
                            return ScrapeOutcome::failed(&url, "worker pool closed");
                        };
                        let fetched = fetcher.fetch(&url).await;
                        process(&url, fetched, tier, limits)
                    } => outcome,
                }
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (index, (url, handle)) in urls.iter().zip(handles).enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => ScrapeOutcome::failed(url, format!("fetch task failed: {e}")),
            };

            if cancel.is_cancelled() {
                continue;
            }

            match &outcome {
                ScrapeOutcome::Scraped(page) => debug!(
                    %url,
                    chars = page.content.text.len(),
                    links = page.links.len(),
                    "page scraped"
                ),
                ScrapeOutcome::Failed { reason, .. } => {
                    warn!(%url, %reason, "page fetch failed, skipping")
                }
            }

            on_page(index, &outcome);
            outcomes.push(outcome);
        }

        if cancel.is_cancelled() {
            return Err(AskWebError::Cancelled);
        }

        Ok(outcomes)
    }
}

/// Reduce a fetch outcome to extracted text and links.
fn process(url: &str, fetched: FetchOutcome, tier: Tier, limits: Limits) -> ScrapeOutcome {
    let html = match fetched {
        FetchOutcome::Success { html } => html,
        FetchOutcome::Failure { reason } => return ScrapeOutcome::failed(url, reason),
    };

    let doc = Html::parse_document(&html);
    let text = paragraph_text(&doc, limits.max_paragraphs);

    let links = match tier {
        Tier::Seed => Url::parse(url)
            .map(|base| same_origin_links(&doc, &base, limits.max_links))
            .unwrap_or_default(),
        Tier::Second => Vec::new(),
    };

    ScrapeOutcome::Scraped(ScrapedPage {
        content: ExtractedContent {
            text,
            source_url: url.to_string(),
        },
        links,
    })
}

#[cfg(test)]
mod crawler_tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn test_config(concurrency: usize) -> CrawlConfig {
        CrawlConfig {
            concurrency,
            page_timeout_secs: 5,
            ..CrawlConfig::default()
        }
    }

    async fn mount_page(server: &wiremock::MockServer, path: &str, body: &str, delay_ms: u64) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(body)
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn process_seed_expands_links() {
        let html = r#"<p>Hello.</p><a href="/a">a</a><a href="https://elsewhere.org/">b</a>"#;
        let outcome = process(
            "https://site.example.com/",
            FetchOutcome::Success { html: html.into() },
            Tier::Seed,
            Limits {
                max_paragraphs: 10,
                max_links: 20,
            },
        );

        match outcome {
            ScrapeOutcome::Scraped(page) => {
                assert_eq!(page.content.text, "Hello.");
                assert_eq!(page.links, vec!["https://site.example.com/a".to_string()]);
            }
            other => panic!("expected scraped page, got {other:?}"),
        }
    }

    #[test]
    fn process_second_tier_skips_links() {
        let outcome = process(
            "https://site.example.com/",
            FetchOutcome::Success {
                html: r#"<p>x</p><a href="/a">a</a>"#.into(),
            },
            Tier::Second,
            Limits {
                max_paragraphs: 10,
                max_links: 20,
            },
        );

        match outcome {
            ScrapeOutcome::Scraped(page) => assert!(page.links.is_empty()),
            other => panic!("expected scraped page, got {other:?}"),
        }
    }

    #[test]
    fn process_failure_passes_through() {
        let outcome = process(
            "https://site.example.com/",
            FetchOutcome::Failure {
                reason: "HTTP 500".into(),
            },
            Tier::Seed,
            Limits {
                max_paragraphs: 10,
                max_links: 20,
            },
        );
        assert!(matches!(outcome, ScrapeOutcome::Failed { ref reason, .. } if reason == "HTTP 500"));
        assert_eq!(outcome.url(), "https://site.example.com/");
    }

    #[tokio::test]
    async fn scrape_all_preserves_input_order() {
        let server = wiremock::MockServer::start().await;
        mount_page(&server, "/slow", "<p>slow</p>", 300).await;
        mount_page(&server, "/fast", "<p>fast</p>", 0).await;

        let urls = vec![format!("{}/slow", server.uri()), format!("{}/fast", server.uri())];
        let crawler = Crawler::new(test_config(4)).unwrap();

        let mut seen = Vec::new();
        let outcomes = crawler
            .scrape_all(&urls, Tier::Second, &CancellationToken::new(), |i, o| {
                seen.push((i, o.url().to_string()))
            })
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].url(), urls[0]);
        assert_eq!(outcomes[1].url(), urls[1]);
        assert_eq!(seen, vec![(0, urls[0].clone()), (1, urls[1].clone())]);
    }

    #[tokio::test]
    async fn scrape_all_isolates_failures() {
        let server = wiremock::MockServer::start().await;
        mount_page(&server, "/ok1", "<p>one</p>", 0).await;
        mount_page(&server, "/ok2", "<p>two</p>", 0).await;
        wiremock::Mock::given(wiremock::matchers::path("/broken"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let urls: Vec<String> = ["/ok1", "/broken", "/ok2"]
            .iter()
            .map(|p| format!("{}{p}", server.uri()))
            .collect();
        let crawler = Crawler::new(test_config(2)).unwrap();
        let outcomes = crawler
            .scrape_all(&urls, Tier::Seed, &CancellationToken::new(), |_, _| {})
            .await
            .unwrap();

        assert!(matches!(outcomes[0], ScrapeOutcome::Scraped(_)));
        assert!(matches!(outcomes[1], ScrapeOutcome::Failed { .. }));
        assert!(matches!(outcomes[2], ScrapeOutcome::Scraped(_)));
    }

    #[tokio::test]
    async fn sequential_mode_fetches_one_at_a_time() {
        let server = wiremock::MockServer::start().await;
        for i in 0..3 {
            mount_page(&server, &format!("/p{i}"), "<p>x</p>", 200).await;
        }

        let urls: Vec<String> = (0..3).map(|i| format!("{}/p{i}", server.uri())).collect();
        let crawler = Crawler::new(test_config(1)).unwrap();

        let start = Instant::now();
        crawler
            .scrape_all(&urls, Tier::Second, &CancellationToken::new(), |_, _| {})
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn cancellation_aborts_batch() {
        let server = wiremock::MockServer::start().await;
        mount_page(&server, "/stall", "<p>late</p>", 4_000).await;

        let urls = vec![format!("{}/stall", server.uri())];
        let crawler = Crawler::new(test_config(2)).unwrap();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = crawler
            .scrape_all(&urls, Tier::Seed, &cancel, |_, _| {})
            .await;

        assert!(matches!(result, Err(AskWebError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn already_cancelled_does_nothing() {
        let crawler = Crawler::new(test_config(2)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = crawler
            .scrape_all(&["https://example.com/".to_string()], Tier::Seed, &cancel, |_, _| {})
            .await;
        assert!(matches!(result, Err(AskWebError::Cancelled)));
    }
}
