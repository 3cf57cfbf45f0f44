//! End-to-end crawl: search, seed pages, internal-link frontier, second-tier pages, corpus.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use url::Url;

use askweb_crawler::{Crawler, LinkFrontier, ScrapeOutcome, Tier};
use askweb_search::SearchClient;
use askweb_shared::{AskWebError, Corpus, CrawlConfig, Result, SearchResult};

/// Diagnostics for one completed crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// The query that was searched.
    pub query: String,
    /// Seed results in engine order.
    pub results: Vec<SearchResult>,
    /// Seed pages fetched successfully.
    pub seeds_fetched: usize,
    /// Unique internal links gathered from seed pages.
    pub frontier_size: usize,
    /// Second-tier URLs selected from the frontier.
    pub second_tier_attempted: usize,
    /// Second-tier pages fetched successfully.
    pub second_tier_fetched: usize,
    /// Pages that contributed text to the corpus.
    pub pages_with_content: usize,
    /// Failed pages (URL, reason).
    pub failures: Vec<(String, String)>,
    /// Total duration of the crawl.
    pub elapsed: Duration,
}

/// Progress callback for reporting crawl status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once with the seed results, before any page is fetched.
    fn search_results(&self, results: &[SearchResult]);
    /// Called as each page outcome is collected.
    fn page_fetched(&self, url: &str, current: usize, total: usize);
    /// Called with the number of second-tier pages about to be fetched.
    fn frontier_selected(&self, count: usize);
    /// Called when the crawl completes.
    fn done(&self, report: &CrawlReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn search_results(&self, _results: &[SearchResult]) {}
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn frontier_selected(&self, _count: usize) {}
    fn done(&self, _report: &CrawlReport) {}
}

/// Search client and crawler sharing one configuration.
pub struct Pipeline {
    search: SearchClient,
    crawler: Crawler,
}

impl Pipeline {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        Ok(Self {
            search: SearchClient::new(&config)?,
            crawler: Crawler::new(config)?,
        })
    }

    /// Run the full crawl for `query`.
    ///
    /// 1. Search (no results → [`AskWebError::NoResults`], nothing fetched)
    /// 2. Fetch seeds, extract text, collect same-origin links
    /// 3. Take the first `max_frontier` links in discovery order
    /// 4. Fetch those without further expansion
    /// 5. Empty corpus → [`AskWebError::EmptyCorpus`]
    ///
    /// Individual page failures are recorded in the report and skipped.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn crawl(
        &self,
        query: &str,
        cancel: &CancellationToken,
        progress: &dyn ProgressReporter,
    ) -> Result<(Corpus, CrawlReport)> {
        let start = Instant::now();
        let config = self.crawler.config();
        let mut report = CrawlReport {
            query: query.to_string(),
            ..Default::default()
        };

        // --- Phase 1: Search ---
        progress.phase("Searching");
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AskWebError::Cancelled),
            results = self.search.search(query) => results?,
        };

        if results.is_empty() {
            return Err(AskWebError::NoResults {
                query: query.to_string(),
            });
        }
        progress.search_results(&results);

        // --- Phase 2: Seed pages ---
        progress.phase("Fetching search results");
        let seed_urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
        let seed_total = seed_urls.len();
        let seed_outcomes = self
            .crawler
            .scrape_all(&seed_urls, Tier::Seed, cancel, |i, outcome| {
                progress.page_fetched(outcome.url(), i + 1, seed_total)
            })
            .await?;

        let mut corpus = Corpus::new();
        let mut frontier = LinkFrontier::new();
        let seeds: HashSet<String> = seed_urls.iter().map(|url| normalize_seed(url)).collect();

        for outcome in seed_outcomes {
            match outcome {
                ScrapeOutcome::Scraped(page) => {
                    report.seeds_fetched += 1;
                    corpus.append(&page.content);
                    frontier.extend(
                        page.links
                            .into_iter()
                            .filter(|link| !seeds.contains(link.as_str())),
                    );
                }
                ScrapeOutcome::Failed { url, reason } => report.failures.push((url, reason)),
            }
        }

        // --- Phase 3: Frontier selection ---
        report.frontier_size = frontier.len();
        let second_tier = frontier.take(config.max_frontier);
        report.second_tier_attempted = second_tier.len();
        progress.frontier_selected(second_tier.len());

        info!(
            seeds = seed_total,
            seeds_fetched = report.seeds_fetched,
            frontier = report.frontier_size,
            selected = second_tier.len(),
            "seed pass complete"
        );

        // --- Phase 4: Second-tier pages ---
        progress.phase("Fetching internal pages");
        let second_total = second_tier.len();
        let second_outcomes = self
            .crawler
            .scrape_all(&second_tier, Tier::Second, cancel, |i, outcome| {
                progress.page_fetched(outcome.url(), i + 1, second_total)
            })
            .await?;

        for outcome in second_outcomes {
            match outcome {
                ScrapeOutcome::Scraped(page) => {
                    report.second_tier_fetched += 1;
                    corpus.append(&page.content);
                }
                ScrapeOutcome::Failed { url, reason } => report.failures.push((url, reason)),
            }
        }

        // --- Phase 5: Result ---
        report.results = results;
        report.pages_with_content = corpus.page_count();
        report.elapsed = start.elapsed();
        progress.done(&report);

        if corpus.is_empty() {
            return Err(AskWebError::EmptyCorpus);
        }

        info!(
            pages_with_content = report.pages_with_content,
            corpus_bytes = corpus.len(),
            failures = report.failures.len(),
            duration_ms = report.elapsed.as_millis(),
            "crawl completed"
        );

        Ok((corpus, report))
    }
}

/// Serialize a seed URL the way expanded links are, so a page's link back
/// to itself compares equal. Unparseable seeds are kept verbatim.
fn normalize_seed(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            String::from(url)
        }
        Err(_) => raw.to_string(),
    }
}
