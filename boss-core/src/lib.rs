//! Group boss battle game with LLM-voiced bosses.
//!
//! This crate provides:
//! - One boss per chat group, summoned from a catalog and fought by everyone
//! - Per-user player stats and attack cooldowns
//! - Boss dialogue generated by Claude, with fixed fallback lines
//! - A [`Plugin`] surface for chat hosts
//!
//! # Quick Start
//!
//! ```ignore
//! use boss_core::{Dispatcher, GameConfig, GroupMessage, Narrator, Plugin};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(GameConfig::from_env()?, Narrator::offline())?;
//!     dispatcher.initialize().await;
//!
//!     let message = GroupMessage::new("group-1", "alice", "!summon boss");
//!     if let Some(reply) = dispatcher.on_group_message(&message).await {
//!         println!("{reply}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod battle;
pub mod boss;
pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod ids;
pub mod narrative;
pub mod player;
pub mod plugin;
pub mod reply;
pub mod testing;

pub use battle::{resolve_attack, AttackOutcome};
pub use boss::{Boss, BossRegistry, BossStatus, Summon};
pub use catalog::{BossTemplate, Catalog};
pub use config::{ConfigError, GameConfig, NarrativeConfig};
pub use cooldown::CooldownTracker;
pub use dispatch::{Command, Dispatcher, GameState, GroupMessage};
pub use ids::{GroupId, UserId};
pub use narrative::{AnthropicGenerator, NarrativeError, Narrator, OfflineGenerator, TextGenerator};
pub use player::{Player, PlayerRegistry};
pub use plugin::{Plugin, PluginInfo};
pub use reply::Reply;
pub use testing::{ScriptedGenerator, TestHarness};
