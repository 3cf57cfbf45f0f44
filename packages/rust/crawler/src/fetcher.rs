//! Single-page HTTP fetching.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use askweb_shared::{AskWebError, CrawlConfig, FetchOutcome, Result};

/// Maximum number of redirects followed per page.
const MAX_REDIRECTS: usize = 5;

/// Issues one GET per page with a browser identity and a fixed timeout.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher from the runtime crawl configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.page_timeout_secs))
            .build()
            .map_err(|e| AskWebError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url`, classifying the result instead of returning an error.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        debug!(url, "fetching page");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("timed out: {e}")
                } else {
                    e.to_string()
                };
                return FetchOutcome::Failure { reason };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failure {
                reason: format!("HTTP {status}"),
            };
        }

        match response.text().await {
            Ok(html) => FetchOutcome::Success { html },
            Err(e) => FetchOutcome::Failure {
                reason: format!("body read failed: {e}"),
            },
        }
    }
}
