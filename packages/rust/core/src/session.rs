//! Interactive question answering over a finished corpus.

use std::collections::VecDeque;

use tracing::{info, instrument, warn};

use askweb_shared::{
    AppConfig, AskWebError, Corpus, LlmConfig, Result, SessionId, Turn, resolve_api_key,
};

use crate::llm::{LlmClient, build_messages};

// ---------------------------------------------------------------------------
// ConversationHistory
// ---------------------------------------------------------------------------

/// Sliding window over the most recent turns, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn, evicting the oldest once the window is full.
    pub fn push(&mut self, turn: Turn) {
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// QaSession
// ---------------------------------------------------------------------------

/// One question-answering session bound to an immutable corpus.
///
/// Without an API key the session still starts; every question then
/// fails with [`AskWebError::Unconfigured`] and the history is untouched.
#[derive(Debug)]
pub struct QaSession {
    id: SessionId,
    corpus: Corpus,
    history: ConversationHistory,
    config: LlmConfig,
    client: Option<LlmClient>,
}

impl QaSession {
    /// Build a session from application config, reading the API key from
    /// the environment variable named by `llm.api_key_env`.
    pub fn from_config(corpus: Corpus, config: &AppConfig) -> Result<Self> {
        let client = match resolve_api_key(config) {
            Some(key) => Some(LlmClient::new(&config.llm, key)?),
            None => {
                warn!(env = %config.llm.api_key_env, "no API key set, questions will be refused");
                None
            }
        };
        Ok(Self::new(corpus, config.llm.clone(), client))
    }

    pub fn new(corpus: Corpus, config: LlmConfig, client: Option<LlmClient>) -> Self {
        let id = SessionId::new();
        info!(
            session = %id,
            corpus_bytes = corpus.len(),
            configured = client.is_some(),
            "session started"
        );
        Self {
            id,
            corpus,
            history: ConversationHistory::new(config.history_turns),
            config,
            client,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Env var the API key is read from.
    pub fn api_key_env(&self) -> &str {
        &self.config.api_key_env
    }

    /// Answer `question` from the corpus and the recent conversation.
    ///
    /// The question is recorded before the request; the answer only on
    /// success. Errors are [`AskWebError::Unconfigured`] or
    /// [`AskWebError::Llm`] and leave the session usable.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let Some(client) = &self.client else {
            return Err(AskWebError::Unconfigured(format!(
                "set {} to enable answers",
                self.config.api_key_env
            )));
        };

        self.history.push(Turn::user(question));
        let messages =
            build_messages(&self.config, self.corpus.as_str(), self.history.turns());

        let answer = client.complete(&messages).await?;
        self.history.push(Turn::assistant(answer.clone()));

        info!(history = self.history.len(), chars = answer.len(), "question answered");
        Ok(answer)
    }
}
