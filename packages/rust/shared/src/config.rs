//! Application configuration for askweb.
//!
//! User config lives at `~/.askweb/askweb.toml`.
//! Missing keys fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AskWebError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "askweb.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".askweb";

/// Upper bound on in-flight page fetches, whatever the config says.
pub const MAX_CONCURRENCY: usize = 8;

/// Desktop browser identity sent with every search and page request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching askweb.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search engine settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Crawl limits.
    #[serde(default)]
    pub crawl: CrawlSettings,

    /// Language-model settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// HTML search endpoint; the query is sent as `?q=`.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Maximum number of seed results kept.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_max_results() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Same-origin links kept per seed page.
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    /// Frontier URLs fetched in the second pass.
    #[serde(default = "default_max_frontier")]
    pub max_frontier: usize,

    /// Paragraphs kept per page.
    #[serde(default = "default_max_paragraphs")]
    pub max_paragraphs: usize,

    /// Concurrent page fetches (clamped to `1..=8`).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-page request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for page requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_links_per_page: default_max_links_per_page(),
            max_frontier: default_max_frontier(),
            max_paragraphs: default_max_paragraphs(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_links_per_page() -> usize {
    20
}
fn default_max_frontier() -> usize {
    100
}
fn default_max_paragraphs() -> usize {
    10
}
fn default_concurrency() -> usize {
    4
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent in each request.
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible chat-completions endpoint.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Corpus characters sent before truncation.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Conversation turns kept in the sliding window.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// System prompt for every request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            endpoint: default_llm_endpoint(),
            max_context_chars: default_max_context_chars(),
            history_turns: default_history_turns(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_llm_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_max_context_chars() -> usize {
    4000
}
fn default_history_turns() -> usize {
    10
}
fn default_system_prompt() -> String {
    "You are an intelligent assistant answering user questions based on web-scraped content."
        .into()
}
fn default_llm_timeout_secs() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Search endpoint URL.
    pub search_endpoint: String,
    /// Seed results kept from the search.
    pub max_results: usize,
    /// Search request timeout in seconds.
    pub search_timeout_secs: u64,
    /// Same-origin links kept per seed page.
    pub max_links_per_page: usize,
    /// Frontier URLs fetched in the second pass.
    pub max_frontier: usize,
    /// Paragraphs kept per page.
    pub max_paragraphs: usize,
    /// Concurrent page fetches, already clamped to `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,
    /// Page request timeout in seconds.
    pub page_timeout_secs: u64,
    /// User-Agent header for all outbound requests.
    pub user_agent: String,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            search_endpoint: config.search.endpoint.clone(),
            max_results: config.search.max_results,
            search_timeout_secs: config.search.timeout_secs,
            max_links_per_page: config.crawl.max_links_per_page,
            max_frontier: config.crawl.max_frontier,
            max_paragraphs: config.crawl.max_paragraphs,
            concurrency: config.crawl.concurrency.clamp(1, MAX_CONCURRENCY),
            page_timeout_secs: config.crawl.timeout_secs,
            user_agent: config.crawl.user_agent.clone(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.askweb/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| AskWebError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.askweb/askweb.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AskWebError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| AskWebError::config(format!("failed to parse {}: {e}", path.display())))?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AskWebError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AskWebError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AskWebError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings that would make a run meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    for (name, endpoint) in [
        ("search.endpoint", &config.search.endpoint),
        ("llm.endpoint", &config.llm.endpoint),
    ] {
        Url::parse(endpoint)
            .map_err(|e| AskWebError::config(format!("{name} '{endpoint}' is not a URL: {e}")))?;
    }
    if config.search.max_results == 0 {
        return Err(AskWebError::validation("search.max_results must be at least 1"));
    }
    if config.llm.history_turns == 0 {
        return Err(AskWebError::validation("llm.history_turns must be at least 1"));
    }
    Ok(())
}

/// Read the language-model API key from the configured env var.
///
/// Returns `None` when the variable is unset or blank.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    std::env::var(&config.llm.api_key_env)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_frontier"));
        assert!(toml_str.contains("GROQ_API_KEY"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[crawl]
concurrency = 2

[llm]
model = "mixtral-8x7b"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.concurrency, 2);
        assert_eq!(config.crawl.max_links_per_page, 20);
        assert_eq!(config.llm.model, "mixtral-8x7b");
        assert_eq!(config.llm.history_turns, 10);
        assert_eq!(config.search.max_results, 5);
    }

    #[test]
    fn crawl_config_from_app_config() {
        let app = AppConfig::default();
        let crawl = CrawlConfig::from(&app);
        assert_eq!(crawl.max_results, 5);
        assert_eq!(crawl.max_links_per_page, 20);
        assert_eq!(crawl.max_frontier, 100);
        assert_eq!(crawl.max_paragraphs, 10);
        assert_eq!(crawl.page_timeout_secs, 10);
    }

    #[test]
    fn concurrency_is_clamped() {
        let mut app = AppConfig::default();
        app.crawl.concurrency = 64;
        assert_eq!(CrawlConfig::from(&app).concurrency, MAX_CONCURRENCY);

        app.crawl.concurrency = 0;
        assert_eq!(CrawlConfig::from(&app).concurrency, 1);
    }

    #[test]
    fn invalid_endpoint_rejected() {
        let mut config = AppConfig::default();
        config.search.endpoint = "not a url".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("search.endpoint"));
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = AppConfig::default();
        config.search.max_results = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, AskWebError::Validation { ref message } if message.contains("max_results"))
        );

        let mut config = AppConfig::default();
        config.llm.history_turns = 0;
        assert!(matches!(validate_config(&config), Err(AskWebError::Validation { .. })));
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("askweb-config-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[search]\nmax_results = 3\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.search.max_results, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_api_key_resolves_to_none() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.llm.api_key_env = "ASKWEB_TEST_NONEXISTENT_KEY_12345".into();
        assert!(resolve_api_key(&config).is_none());
    }
}
