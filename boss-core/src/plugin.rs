//! The surface a chat host sees.

use crate::dispatch::{Dispatcher, GroupMessage};
use crate::reply::Reply;
use async_trait::async_trait;

/// Registration metadata shown by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub author: &'static str,
}

/// A group-chat plugin.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    /// Called once after the host loads the plugin.
    async fn initialize(&self) {}

    /// Called for every message posted in a group. `None` means stay silent.
    async fn on_group_message(&self, message: &GroupMessage) -> Option<Reply>;
}

#[async_trait]
impl Plugin for Dispatcher {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "Group Boss Battle",
            description: "Group members team up against an AI-voiced boss",
            version: env!("CARGO_PKG_VERSION"),
            author: "Boss Battle contributors",
        }
    }

    async fn initialize(&self) {
        let info = self.info();
        tracing::info!(
            plugin = info.name,
            version = info.version,
            summon = %self.config().summon_command,
            attack = %self.config().attack_command,
            "group boss battle plugin started"
        );
    }

    async fn on_group_message(&self, message: &GroupMessage) -> Option<Reply> {
        self.handle(message).await
    }
}
