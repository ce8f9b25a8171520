//! Replies sent back into the group.

use crate::boss::Boss;
use std::fmt;
use std::time::Duration;

/// One reply per recognized command. `Display` renders the chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A boss was summoned.
    Summoned { boss: Boss, attack_command: String },
    /// The group is already fighting a boss.
    AlreadyActive { boss_name: String },
    /// Attack with no boss around.
    NoBoss { summon_command: String },
    /// The user attacked again too soon.
    MustRest { remaining: Duration },
    /// The boss survived and hit back.
    Exchange {
        boss: Boss,
        player_damage: i32,
        boss_damage: i32,
        retort: String,
    },
    /// The boss fell; `boss.last_words` is filled in.
    Defeated { boss: Boss, player_damage: i32 },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Summoned { boss, attack_command } => write!(
                f,
                "A {name} has appeared!\n[Level] ???\n[HP] {hp}/{max_hp}\n[Personality] {personality}\nUse {attack_command} to attack!",
                name = boss.name,
                hp = boss.hp,
                max_hp = boss.max_hp,
                personality = boss.personality,
            ),
            Reply::AlreadyActive { boss_name } => {
                write!(f, "{boss_name} is already in battle here!")
            }
            Reply::NoBoss { summon_command } => write!(
                f,
                "There is no boss to attack. Use {summon_command} to summon one!"
            ),
            Reply::MustRest { remaining } => write!(
                f,
                "You need to rest a while before fighting again! ({}s left)",
                whole_seconds(*remaining)
            ),
            Reply::Exchange {
                boss,
                player_damage,
                boss_damage,
                retort,
            } => write!(
                f,
                "You dealt {player_damage} damage to {name}!\nThe boss has {hp}/{max_hp} HP left\n{name} says: {retort}\n{name} dealt {boss_damage} damage to you!",
                name = boss.name,
                hp = boss.hp,
                max_hp = boss.max_hp,
            ),
            Reply::Defeated { boss, player_damage } => write!(
                f,
                "You dealt {player_damage} damage to {name}!\nUnder your final blow, {name} falls!\nThe boss's last words: {last_words}\nEvery warrior who joined the fight earns a rich reward!",
                name = boss.name,
                last_words = boss.last_words,
            ),
        }
    }
}

/// Seconds rounded up, so "0s left" is never shown.
fn whole_seconds(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
