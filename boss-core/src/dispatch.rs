//! Turns incoming group messages into game actions and replies.

use crate::battle::{resolve_attack, AttackOutcome};
use crate::boss::{Boss, BossRegistry, Summon};
use crate::config::{ConfigError, GameConfig};
use crate::cooldown::CooldownTracker;
use crate::ids::{GroupId, UserId};
use crate::narrative::Narrator;
use crate::player::{Player, PlayerRegistry};
use crate::reply::Reply;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

/// A message posted in a group, as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMessage {
    pub content: String,
    pub group_id: GroupId,
    pub user_id: UserId,
}

impl GroupMessage {
    pub fn new(group_id: impl Into<GroupId>, user_id: impl Into<UserId>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            group_id: group_id.into(),
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Summon,
    Attack,
}

/// Everything the game remembers.
#[derive(Debug, Default)]
pub struct GameState {
    pub bosses: BossRegistry,
    pub players: PlayerRegistry,
    pub cooldowns: CooldownTracker,
}

struct Inner {
    state: GameState,
    rng: StdRng,
}

/// What an attack left behind once the state lock is released.
enum Resolved {
    Exchange {
        boss: Boss,
        player_damage: i32,
        boss_damage: i32,
    },
    Defeated {
        boss: Boss,
        player_damage: i32,
    },
}

/// Routes group messages to the game.
///
/// State changes for a command happen under one lock and are finished before
/// any narrative call is awaited; the narrator only ever sees a snapshot.
pub struct Dispatcher {
    config: GameConfig,
    narrator: Narrator,
    inner: Mutex<Inner>,
}

impl Dispatcher {
    pub fn new(config: GameConfig, narrator: Narrator) -> Result<Self, ConfigError> {
        config.validate()?;
        let narrator = narrator.with_timeout(config.narrative_timeout);
        Ok(Self {
            config,
            narrator,
            inner: Mutex::new(Inner {
                state: GameState::default(),
                rng: StdRng::from_entropy(),
            }),
        })
    }

    /// Make boss selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.inner.get_mut().rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Exact, case-sensitive match against the configured commands.
    pub fn parse(&self, content: &str) -> Option<Command> {
        if content == self.config.summon_command {
            Some(Command::Summon)
        } else if content == self.config.attack_command {
            Some(Command::Attack)
        } else {
            None
        }
    }

    pub async fn handle(&self, message: &GroupMessage) -> Option<Reply> {
        self.handle_at(message, Utc::now()).await
    }

    /// Handle a message as if it arrived at `now`.
    ///
    /// Returns `None` for anything that is not a command.
    pub async fn handle_at(&self, message: &GroupMessage, now: DateTime<Utc>) -> Option<Reply> {
        match self.parse(&message.content)? {
            Command::Summon => self.summon(&message.group_id).await,
            Command::Attack => Some(self.attack(&message.group_id, &message.user_id, now).await),
        }
    }

    async fn summon(&self, group: &GroupId) -> Option<Reply> {
        let mut guard = self.inner.lock().await;
        let Inner { state, rng } = &mut *guard;

        match state.bosses.summon(group, &self.config.catalog, rng) {
            Some(Summon::Created(boss)) => {
                tracing::info!(group = %group, boss = %boss.name, hp = boss.max_hp, "boss summoned");
                Some(Reply::Summoned {
                    boss,
                    attack_command: self.config.attack_command.clone(),
                })
            }
            Some(Summon::AlreadyActive(boss)) => Some(Reply::AlreadyActive { boss_name: boss.name }),
            None => {
                tracing::error!(group = %group, "cannot summon a boss from an empty catalog");
                None
            }
        }
    }

    async fn attack(&self, group: &GroupId, user: &UserId, now: DateTime<Utc>) -> Reply {
        let resolved = {
            let mut guard = self.inner.lock().await;
            let state = &mut guard.state;

            let Some(boss) = state.bosses.get_mut(group) else {
                return Reply::NoBoss {
                    summon_command: self.config.summon_command.clone(),
                };
            };

            if let Some(remaining) = state.cooldowns.remaining(user, now, self.config.cooldown) {
                tracing::debug!(user = %user, ?remaining, "attack rejected, still resting");
                return Reply::MustRest { remaining };
            }

            let player = state.players.get_or_create(user);
            let outcome = resolve_attack(player, boss);
            let snapshot = boss.clone();
            state.cooldowns.record(user, now);

            match outcome {
                AttackOutcome::Exchange {
                    player_damage,
                    boss_damage,
                } => {
                    tracing::debug!(
                        group = %group,
                        user = %user,
                        player_damage,
                        boss_damage,
                        boss_hp = snapshot.hp,
                        "attack resolved"
                    );
                    Resolved::Exchange {
                        boss: snapshot,
                        player_damage,
                        boss_damage,
                    }
                }
                AttackOutcome::Defeated { player_damage } => {
                    state.bosses.remove(group);
                    tracing::info!(group = %group, user = %user, boss = %snapshot.name, "boss defeated");
                    Resolved::Defeated {
                        boss: snapshot,
                        player_damage,
                    }
                }
            }
        };

        match resolved {
            Resolved::Exchange {
                boss,
                player_damage,
                boss_damage,
            } => {
                let retort = self.narrator.battle_retort(&boss, player_damage).await;
                Reply::Exchange {
                    boss,
                    player_damage,
                    boss_damage,
                    retort,
                }
            }
            Resolved::Defeated { mut boss, player_damage } => {
                boss.last_words = self.narrator.last_words(&boss).await;
                Reply::Defeated { boss, player_damage }
            }
        }
    }

    /// The group's current boss.
    pub async fn boss(&self, group: &GroupId) -> Option<Boss> {
        self.inner.lock().await.state.bosses.get(group).cloned()
    }

    /// The user's stats, without creating a record.
    pub async fn player(&self, user: &UserId) -> Option<Player> {
        self.inner.lock().await.state.players.get(user).cloned()
    }

    /// Read-only access to the whole game state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.inner.lock().await.state)
    }
}
