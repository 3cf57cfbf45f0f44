//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use askweb_core::{CancellationToken, CrawlReport, Pipeline, ProgressReporter, QaSession};
use askweb_shared::{
    AppConfig, AskWebError, CrawlConfig, SearchResult, init_config, load_config, load_config_from,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// askweb: search the web, read the results, answer questions about them.
#[derive(Parser)]
#[command(
    name = "askweb",
    version,
    about = "Search the web, crawl the top results, and ask an LLM questions about what was found.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.askweb/askweb.toml.
    #[arg(long, global = true, env = "ASKWEB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search, crawl, then answer questions interactively (the default).
    Ask {
        /// Search query; prompted for when omitted.
        query: Option<String>,
    },

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "askweb=warn",
        1 => "askweb=info",
        2 => "askweb=debug",
        _ => "askweb=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        None => cmd_ask(config_path, None).await,
        Some(Command::Ask { query }) => cmd_ask(config_path, query).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn load(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

async fn cmd_ask(config_path: Option<&Path>, query: Option<String>) -> Result<()> {
    let config = load(config_path)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let query = match query {
        Some(q) => q,
        None => prompt(&mut input, "What would you like to search? ")
            .await?
            .unwrap_or_default(),
    };
    let query = query.trim();
    if query.is_empty() {
        return Err(eyre!("no search query given"));
    }

    info!(query, "starting crawl");

    let pipeline = Pipeline::new(CrawlConfig::from(&config))?;
    let cancel = CancellationToken::new();
    let reporter = CliProgress::new();

    let crawl = pipeline.crawl(query, &cancel, &reporter);
    tokio::pin!(crawl);
    let outcome = tokio::select! {
        outcome = &mut crawl => outcome,
        _ = tokio::signal::ctrl_c() => {
            reporter.spinner.set_message("Cancelling...");
            cancel.cancel();
            crawl.await
        }
    };
    reporter.finish();

    let corpus = match outcome {
        Ok((corpus, _report)) => corpus,
        Err(AskWebError::Cancelled) => {
            println!("Crawl cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut session = QaSession::from_config(corpus, &config)?;
    if !session.is_configured() {
        println!(
            "Warning: no LLM API key found. Set {} to get answers.",
            session.api_key_env()
        );
    }

    qa_loop(&mut session, &mut input).await
}

async fn qa_loop(session: &mut QaSession, input: &mut Lines<BufReader<Stdin>>) -> Result<()> {
    loop {
        let line = tokio::select! {
            line = prompt(input, "\nAsk a question about the content (or type 'exit' to quit): ") => line?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else {
            println!();
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }
        if question.is_empty() {
            continue;
        }

        let answer = tokio::select! {
            answer = session.ask(question) => answer,
            _ = tokio::signal::ctrl_c() => {
                println!("\nRequest cancelled.");
                continue;
            }
        };

        match answer {
            Ok(answer) => println!("\nAI Response:\n{answer}"),
            Err(e) if !e.is_fatal() => {
                warn!(error = %e, "question not answered");
                println!("Error: {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Print `message` and read one line; `None` on end of input.
async fn prompt(input: &mut Lines<BufReader<Stdin>>, message: &str) -> Result<Option<String>> {
    print!("{message}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(format!("{name}..."));
    }

    fn search_results(&self, results: &[SearchResult]) {
        self.spinner.suspend(|| {
            println!("\nTop search results:");
            for (rank, result) in results.iter().enumerate() {
                println!("{}. {} - {}", rank + 1, result.title, result.url);
            }
            println!();
        });
    }

    fn page_fetched(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {url}"));
    }

    fn frontier_selected(&self, count: usize) {
        self.spinner.suspend(|| println!("Found {count} internal pages to scrape..."));
    }

    fn done(&self, report: &CrawlReport) {
        self.spinner.finish_and_clear();
        println!(
            "Read {} pages ({} failed) in {:.1}s.",
            report.pages_with_content,
            report.failures.len(),
            report.elapsed.as_secs_f64()
        );
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
