//! Web search over DuckDuckGo's HTML interface.
//!
//! A query yields the engine's top results as (title, URL) pairs, with the
//! engine's redirect wrapper already stripped by [`resolve`]. These results
//! seed the crawl.

mod resolver;

use std::time::Duration;

use askweb_shared::{AskWebError, CrawlConfig, Result, SearchResult};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

pub use resolver::resolve;

/// CSS selector for organic result anchors.
const RESULT_ANCHOR: &str = "a.result__a[href]";

/// Maximum number of redirects to follow for the search request.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// SearchClient
// ---------------------------------------------------------------------------

/// HTTP client bound to one search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: Url,
    max_results: usize,
}

impl SearchClient {
    /// Build a search client from the runtime crawl configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.search_endpoint).map_err(|e| {
            AskWebError::config(format!(
                "invalid search endpoint '{}': {e}",
                config.search_endpoint
            ))
        })?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.search_timeout_secs))
            .build()
            .map_err(|e| AskWebError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            max_results: config.max_results,
        })
    }

    /// Run `query` and return at most `max_results` results in engine order.
    ///
    /// Transport failures and non-2xx statuses are returned as
    /// [`AskWebError::Network`]; an empty page is an empty `Vec`, not an error.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);

        debug!(%url, "sending search request");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| AskWebError::Network(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskWebError::Network(format!("search returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AskWebError::Network(format!("failed to read search response: {e}")))?;

        let results = parse_results(&body, self.max_results);
        info!(count = results.len(), "search completed");

        Ok(results)
    }
}

/// Pull result anchors out of a search page, in document order.
///
/// Stops as soon as `max_results` usable results are collected.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let anchor_sel = Selector::parse(RESULT_ANCHOR).expect("result anchor selector");

    doc.select(&anchor_sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let url = resolve(href);
            if url.is_empty() {
                return None;
            }
            let title = el.text().collect::<String>().trim().to_string();
            Some(SearchResult { title, url })
        })
        .take(max_results)
        .collect()
}
