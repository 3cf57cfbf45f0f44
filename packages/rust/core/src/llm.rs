//! Chat-completions client and request assembly.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use askweb_shared::{AskWebError, LlmConfig, Result, Turn};

/// Appended to the corpus when it exceeds the context cap.
pub const TRUNCATION_MARKER: &str = "...\n[Content Truncated]";

/// Prefix of the user turn carrying the corpus.
const CONTEXT_PREFIX: &str = "Here is the summarized content:\n\n";

// ---------------------------------------------------------------------------
// Request assembly
// ---------------------------------------------------------------------------

/// Cut `corpus` to `max_chars` characters, marking the cut.
///
/// Text at or under the cap is returned unchanged.
pub fn truncate_corpus(corpus: &str, max_chars: usize) -> String {
    match corpus.char_indices().nth(max_chars) {
        Some((boundary, _)) => format!("{}{TRUNCATION_MARKER}", &corpus[..boundary]),
        None => corpus.to_string(),
    }
}

/// Build the message list for one request: system prompt, the (possibly
/// truncated) corpus as a user turn, then the conversation window, which
/// already ends with the current question.
pub fn build_messages<'a>(
    config: &LlmConfig,
    corpus: &str,
    history: impl IntoIterator<Item = &'a Turn>,
) -> Vec<Turn> {
    let context = truncate_corpus(corpus, config.max_context_chars);

    let mut messages = vec![
        Turn::system(config.system_prompt.clone()),
        Turn::user(format!("{CONTEXT_PREFIX}{context}")),
    ];
    messages.extend(history.into_iter().cloned());
    messages
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat-completions client with bearer auth.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskWebError::config(format!("failed to build LLM client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    /// Send `messages` and return the first choice's content.
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    pub async fn complete(&self, messages: &[Turn]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AskWebError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body, "chat completion rejected");
            return Err(AskWebError::Llm(format!("HTTP {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AskWebError::Llm(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AskWebError::Llm("response contained no choices".into()))
    }
}
