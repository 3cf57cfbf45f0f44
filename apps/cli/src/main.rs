//! askweb CLI: ask questions about what the web says.
//!
//! Searches for a query, reads the top results and their internal pages,
//! then answers follow-up questions from that text with an LLM.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
