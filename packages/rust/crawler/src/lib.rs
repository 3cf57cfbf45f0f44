//! Page fetching, content extraction, and link expansion.
//!
//! This crate provides:
//! - [`fetcher`]: single-page GET classified into [`FetchOutcome`](askweb_shared::FetchOutcome)
//! - [`extract`]: paragraph text excerpts
//! - [`links`]: same-origin link expansion and the [`LinkFrontier`]
//! - [`engine`]: bounded, cancellable batch scraping ([`Crawler`])

pub mod engine;
pub mod extract;
pub mod fetcher;
pub mod links;

pub use engine::{Crawler, ScrapeOutcome, ScrapedPage, Tier};
pub use extract::{extract, paragraph_text};
pub use fetcher::PageFetcher;
pub use links::{LinkFrontier, expand, same_origin_links};

// Re-exported so callers can cancel a crawl without a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
