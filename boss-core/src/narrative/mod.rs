//! In-character lines for bosses, generated by a language model.
//!
//! Narration is decoration. Every call is bounded by a timeout and any
//! failure is logged and replaced with a fixed fallback line, so nothing here
//! can change or hold up the outcome of a battle.

mod anthropic;

pub use anthropic::AnthropicGenerator;

use crate::boss::Boss;
use async_trait::async_trait;
use battle_macros::Tool;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Line used when the boss's retort cannot be generated.
pub const RETORT_FALLBACK: &str = "Hmph!";

/// Line used when the boss's last words cannot be generated.
pub const LAST_WORDS_FALLBACK: &str = "I... will return...";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum NarrativeError {
    /// The service could not be reached or refused the request.
    #[error("narrative service unreachable: {0}")]
    Unreachable(String),

    /// The service answered, but not with the expected field.
    #[error("malformed narrative response: {0}")]
    Malformed(String),

    #[error("narrative service timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<claude::Error> for NarrativeError {
    fn from(err: claude::Error) -> Self {
        if err.is_transport() {
            NarrativeError::Unreachable(err.to_string())
        } else {
            NarrativeError::Malformed(err.to_string())
        }
    }
}

/// A backend that answers a prompt by filling in a tool's single field.
///
/// Implementations return the tool input serialized as JSON text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, tool: claude::Tool) -> Result<String, NarrativeError>;
}

/// Backend used when no model is configured. Every call fails as unreachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str, _tool: claude::Tool) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unreachable("no language model configured".to_string()))
    }
}

/// The boss's reply to being hit
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "generate_boss_response")]
struct BattleRetort {
    /// What the boss says back, one short sentence
    response: String,
}

/// The boss's final words as it falls
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "generate_boss_last_words")]
struct LastWords {
    /// The boss's dying statement, one sentence
    last_words: String,
}

/// Produces boss dialogue, falling back to fixed lines on any failure.
#[derive(Clone)]
pub struct Narrator {
    backend: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Narrator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineGenerator))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The boss's reaction to taking `damage`. Never fails.
    pub async fn battle_retort(&self, boss: &Boss, damage: i32) -> String {
        match self.try_battle_retort(boss, damage).await {
            Ok(line) => line,
            Err(err) => {
                tracing::error!(boss = %boss.name, error = %err, "failed to generate battle retort");
                RETORT_FALLBACK.to_string()
            }
        }
    }

    /// The boss's dying words. Never fails.
    pub async fn last_words(&self, boss: &Boss) -> String {
        match self.try_last_words(boss).await {
            Ok(line) => line,
            Err(err) => {
                tracing::error!(boss = %boss.name, error = %err, "failed to generate last words");
                LAST_WORDS_FALLBACK.to_string()
            }
        }
    }

    pub async fn try_battle_retort(&self, boss: &Boss, damage: i32) -> Result<String, NarrativeError> {
        let raw = self.ask(&retort_prompt(boss, damage), BattleRetort::as_tool()).await?;
        let parsed: BattleRetort = parse_output(&raw)?;
        non_empty(parsed.response)
    }

    pub async fn try_last_words(&self, boss: &Boss) -> Result<String, NarrativeError> {
        let raw = self.ask(&last_words_prompt(boss), LastWords::as_tool()).await?;
        let parsed: LastWords = parse_output(&raw)?;
        non_empty(parsed.last_words)
    }

    async fn ask(&self, prompt: &str, tool: claude::Tool) -> Result<String, NarrativeError> {
        tokio::time::timeout(self.timeout, self.backend.generate(prompt, tool))
            .await
            .map_err(|_| NarrativeError::TimedOut(self.timeout))?
    }
}

fn retort_prompt(boss: &Boss, damage: i32) -> String {
    format!(
        "You are {name}. Your personality: {personality}. You just took {damage} damage and have {hp}/{max_hp} HP left. \
         Answer this attack with one short line that shows your personality.",
        name = boss.name,
        personality = boss.personality,
        hp = boss.hp,
        max_hp = boss.max_hp,
    )
}

fn last_words_prompt(boss: &Boss) -> String {
    format!(
        "You are {name} and you are about to die. Your personality: {personality}. \
         Say one sentence as your last words, showing your personality and what this battle taught you.",
        name = boss.name,
        personality = boss.personality,
    )
}

fn parse_output<T: DeserializeOwned>(raw: &str) -> Result<T, NarrativeError> {
    serde_json::from_str(raw).map_err(|e| NarrativeError::Malformed(e.to_string()))
}

fn non_empty(line: String) -> Result<String, NarrativeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Err(NarrativeError::Malformed("empty line".to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}
