//! Core orchestration for askweb.
//!
//! Ties search and crawling into one corpus-building [`Pipeline`], then
//! answers questions over that corpus in a [`QaSession`].

pub mod llm;
pub mod pipeline;
pub mod session;

pub use llm::{LlmClient, TRUNCATION_MARKER, build_messages, truncate_corpus};
pub use pipeline::{CrawlReport, Pipeline, ProgressReporter, SilentProgress};
pub use session::{ConversationHistory, QaSession};

pub use askweb_crawler::CancellationToken;
