//! Bosses and the per-group boss registry.

use crate::catalog::{BossTemplate, Catalog};
use crate::ids::GroupId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BossStatus {
    #[default]
    Alive,
    Defeated,
}

/// A live (or just-defeated) boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boss {
    pub name: String,
    /// Always in `0..=max_hp`.
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub status: BossStatus,
    /// Fixed at creation; sets the tone of everything the boss says.
    pub personality: String,
    /// Empty until the boss falls.
    #[serde(default)]
    pub last_words: String,
}

impl Boss {
    pub fn from_template(template: &BossTemplate, personality: impl Into<String>) -> Self {
        Self {
            name: template.name.clone(),
            hp: template.hp,
            max_hp: template.hp,
            attack: template.attack,
            defense: template.defense,
            status: BossStatus::Alive,
            personality: personality.into(),
            last_words: String::new(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.status == BossStatus::Defeated
    }

    /// Apply damage, clamping hp at zero. Marks the boss defeated when hp runs out.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.status = BossStatus::Defeated;
        }
    }
}

/// What happened when a group asked for a boss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summon {
    /// A new boss was created for the group.
    Created(Boss),
    /// The group already has a boss; nothing changed.
    AlreadyActive(Boss),
}

/// At most one boss per group.
#[derive(Debug, Default)]
pub struct BossRegistry {
    bosses: HashMap<GroupId, Boss>,
}

impl BossRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boss for the group unless one is already fighting there.
    ///
    /// Returns `None` only when the catalog is empty.
    pub fn summon<R: Rng + ?Sized>(&mut self, group: &GroupId, catalog: &Catalog, rng: &mut R) -> Option<Summon> {
        if let Some(existing) = self.bosses.get(group) {
            return Some(Summon::AlreadyActive(existing.clone()));
        }
        let (template, personality) = catalog.draw(rng)?;
        let boss = Boss::from_template(template, personality);
        self.bosses.insert(group.clone(), boss.clone());
        Some(Summon::Created(boss))
    }

    pub fn get(&self, group: &GroupId) -> Option<&Boss> {
        self.bosses.get(group)
    }

    pub fn get_mut(&mut self, group: &GroupId) -> Option<&mut Boss> {
        self.bosses.get_mut(group)
    }

    pub fn contains(&self, group: &GroupId) -> bool {
        self.bosses.contains_key(group)
    }

    /// Remove the group's boss, returning it.
    pub fn remove(&mut self, group: &GroupId) -> Option<Boss> {
        self.bosses.remove(group)
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }
}
