//! Testing utilities for the boss battle game.
//!
//! This module provides:
//! - `ScriptedGenerator`, a narrative backend that replays canned answers
//! - `TestHarness`, a dispatcher with a fixed catalog and a controllable clock

use crate::catalog::{BossTemplate, Catalog};
use crate::config::GameConfig;
use crate::dispatch::{Dispatcher, GroupMessage};
use crate::narrative::{NarrativeError, Narrator, TextGenerator};
use crate::reply::Reply;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call the scripted backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub tool: String,
}

/// Narrative backend returning scripted answers in order.
///
/// Once the script runs out every call fails as unreachable.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, NarrativeError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw answer (JSON text, as a real backend would return).
    pub fn reply(self, raw: impl Into<String>) -> Self {
        self.push(Ok(raw.into()))
    }

    /// Queue a failure.
    pub fn fail(self, err: NarrativeError) -> Self {
        self.push(Err(err))
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(self, answer: Result<String, NarrativeError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(answer);
        }
        self
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, tool: claude::Tool) -> Result<String, NarrativeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                tool: tool.name,
            });
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Err(NarrativeError::Unreachable("script exhausted".to_string())))
    }
}

/// A dispatcher wired for deterministic tests.
///
/// Times are given in seconds from a fixed epoch.
pub struct TestHarness {
    pub dispatcher: Dispatcher,
    pub backend: Arc<ScriptedGenerator>,
    epoch: DateTime<Utc>,
}

impl TestHarness {
    /// A game whose only boss is `template` and whose backend always fails.
    pub fn new(template: BossTemplate) -> Self {
        Self::with_backend(template, ScriptedGenerator::new())
    }

    pub fn with_backend(template: BossTemplate, backend: ScriptedGenerator) -> Self {
        let config = GameConfig::default().with_catalog(Catalog::single(template, "stubborn"));
        Self::with_config(config, backend)
    }

    pub fn with_config(config: GameConfig, backend: ScriptedGenerator) -> Self {
        let backend = Arc::new(backend);
        let dispatcher = Dispatcher::new(config, Narrator::new(backend.clone()))
            .expect("test config should be valid")
            .with_seed(42);
        Self {
            dispatcher,
            backend,
            epoch: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn at(&self, secs: i64) -> DateTime<Utc> {
        self.epoch + chrono::Duration::seconds(secs)
    }

    /// Deliver a message at `secs`.
    pub async fn send(&self, group: &str, user: &str, content: &str, secs: i64) -> Option<Reply> {
        self.dispatcher
            .handle_at(&GroupMessage::new(group, user, content), self.at(secs))
            .await
    }

    pub async fn summon(&self, group: &str, user: &str) -> Option<Reply> {
        let command = self.dispatcher.config().summon_command.clone();
        self.send(group, user, &command, 0).await
    }

    pub async fn attack(&self, group: &str, user: &str, secs: i64) -> Option<Reply> {
        let command = self.dispatcher.config().attack_command.clone();
        self.send(group, user, &command, secs).await
    }

    /// Current boss hp in the group, if a boss is there.
    pub async fn boss_hp(&self, group: &str) -> Option<i32> {
        self.dispatcher.boss(&group.into()).await.map(|b| b.hp)
    }

    pub async fn player_hp(&self, user: &str) -> Option<i32> {
        self.dispatcher.player(&user.into()).await.map(|p| p.hp)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(BossTemplate::new("Training Golem", 50, 10, 0))
    }
}
