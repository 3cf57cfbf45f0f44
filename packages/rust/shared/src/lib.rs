//! Shared types, error model, and configuration for askweb.
//!
//! This crate is the foundation depended on by all other askweb crates.
//! It provides:
//! - [`AskWebError`]: the unified error type
//! - Domain types ([`SearchResult`], [`FetchOutcome`], [`Corpus`], [`Turn`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BROWSER_USER_AGENT, CrawlConfig, CrawlSettings, LlmConfig, MAX_CONCURRENCY,
    SearchConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key, validate_config,
};
pub use error::{AskWebError, Result};
pub use types::{Corpus, ExtractedContent, FetchOutcome, Role, SearchResult, SessionId, Turn};
