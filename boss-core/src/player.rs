//! Player stats, created on first use and kept for the life of the process.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// May drop below zero; nothing currently reacts to a player running out of hp.
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub exp: i32,
    pub level: i32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            hp: 100,
            attack: 20,
            defense: 10,
            exp: 0,
            level: 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<UserId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's record, creating it with default stats the first time.
    pub fn get_or_create(&mut self, user: &UserId) -> &mut Player {
        self.players.entry(user.clone()).or_default()
    }

    pub fn get(&self, user: &UserId) -> Option<&Player> {
        self.players.get(user)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mut players = PlayerRegistry::new();
        let player = players.get_or_create(&UserId::from("u1"));
        assert_eq!(
            *player,
            Player {
                hp: 100,
                attack: 20,
                defense: 10,
                exp: 0,
                level: 1
            }
        );
    }

    #[test]
    fn test_get_or_create_never_resets() {
        let mut players = PlayerRegistry::new();
        let user = UserId::from("u1");

        players.get_or_create(&user).hp = -15;
        assert_eq!(players.get_or_create(&user).hp, -15);
        assert_eq!(players.len(), 1);
    }

    #[test]
    fn test_get_does_not_create() {
        let players = PlayerRegistry::new();
        assert!(players.get(&UserId::from("ghost")).is_none());
        assert!(players.is_empty());
    }
}
