//! Boss templates and personality traits used when a boss is summoned.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Base stats for one kind of boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossTemplate {
    pub name: String,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
}

impl BossTemplate {
    pub fn new(name: impl Into<String>, hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            hp,
            attack,
            defense,
        }
    }
}

/// The full set of templates and traits a boss can be drawn from.
///
/// Both lists are expected to be non-empty; [`crate::GameConfig::validate`]
/// rejects a catalog that is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub bosses: Vec<BossTemplate>,
    pub personalities: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            bosses: vec![
                BossTemplate::new("Chaos Dragon", 1000, 50, 30),
                BossTemplate::new("Abyssal Demon Lord", 800, 70, 20),
                BossTemplate::new("Ancient Titan", 1200, 40, 40),
            ],
            personalities: [
                "arrogant and conceited, looks down on humans",
                "cold and ruthless, a creature of few words",
                "berserk and bloodthirsty, lives for battle",
                "deeply cunning, loves toying with opponents",
                "ancient and mysterious, full of wisdom",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Catalog {
    /// A catalog with exactly one boss and one trait. Handy for scripted games.
    pub fn single(template: BossTemplate, personality: impl Into<String>) -> Self {
        Self {
            bosses: vec![template],
            personalities: vec![personality.into()],
        }
    }

    /// Pick a template and a trait uniformly at random.
    ///
    /// Returns `None` only for an empty catalog.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&BossTemplate, &str)> {
        let template = self.bosses.choose(rng)?;
        let personality = self.personalities.choose(rng)?;
        Some((template, personality.as_str()))
    }

    /// The template a boss with this name and base stats was built from.
    pub fn template_named(&self, name: &str) -> Option<&BossTemplate> {
        self.bosses.iter().find(|t| t.name == name)
    }
}
