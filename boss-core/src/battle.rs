//! Damage exchange between a player and a boss.

use crate::boss::Boss;
use crate::player::Player;

/// Result of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The boss survived and hit back.
    Exchange { player_damage: i32, boss_damage: i32 },
    /// The hit brought the boss to 0 hp. There is no counter-attack.
    Defeated { player_damage: i32 },
}

impl AttackOutcome {
    pub fn player_damage(&self) -> i32 {
        match *self {
            AttackOutcome::Exchange { player_damage, .. } | AttackOutcome::Defeated { player_damage } => player_damage,
        }
    }

    pub fn boss_damage(&self) -> Option<i32> {
        match *self {
            AttackOutcome::Exchange { boss_damage, .. } => Some(boss_damage),
            AttackOutcome::Defeated { .. } => None,
        }
    }
}

/// Damage a player deals to a boss. Never less than 1.
pub fn player_damage(player_attack: i32, boss_defense: i32) -> i32 {
    (player_attack - boss_defense.div_euclid(2)).max(1)
}

/// Damage a boss deals back to a player. Never less than 1.
pub fn counter_damage(boss_attack: i32, player_defense: i32) -> i32 {
    (boss_attack - player_defense).max(1)
}

/// Resolve a player's attack, mutating both sides.
///
/// The boss's hp is clamped at zero and it is marked defeated when it gets
/// there; removing it from its group is the caller's job. Player hp has no floor.
pub fn resolve_attack(player: &mut Player, boss: &mut Boss) -> AttackOutcome {
    let dealt = player_damage(player.attack, boss.defense);
    boss.take_damage(dealt);

    if boss.is_defeated() {
        return AttackOutcome::Defeated { player_damage: dealt };
    }

    let taken = counter_damage(boss.attack, player.defense);
    player.hp -= taken;
    AttackOutcome::Exchange {
        player_damage: dealt,
        boss_damage: taken,
    }
}
