//! Game and narrative configuration.
//!
//! Both configs start from sensible defaults, can be adjusted with `with_*`
//! builders, and can be overlaid from environment variables:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `BOSS_SUMMON_COMMAND` | literal message that summons a boss |
//! | `BOSS_ATTACK_COMMAND` | literal message that attacks the boss |
//! | `BOSS_COOLDOWN_SECS` | seconds between a user's attacks |
//! | `BOSS_NARRATIVE_TIMEOUT_SECS` | upper bound on one narrative call |
//! | `BOSS_MODEL` | model used for boss dialogue |
//! | `BOSS_MAX_TOKENS` | token cap for one line of dialogue |
//! | `BOSS_TEMPERATURE` | sampling temperature |
//! | `ANTHROPIC_BASE_URL` | alternative API base |

use crate::catalog::Catalog;
use crate::narrative::DEFAULT_TIMEOUT;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SUMMON_COMMAND: &str = "!summon boss";
pub const DEFAULT_ATTACK_COMMAND: &str = "!attack boss";
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("catalog has no boss templates")]
    EmptyCatalog,

    #[error("catalog has no personality traits")]
    NoPersonalities,

    #[error("boss template {0:?} must have positive hp")]
    InvalidTemplate(String),

    #[error("summon and attack commands must be distinct and non-empty")]
    AmbiguousCommands,

    #[error("narrative timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Rules of the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Exact message text that summons a boss.
    pub summon_command: String,
    /// Exact message text that attacks the group's boss.
    pub attack_command: String,
    /// Minimum time between two attacks by the same user.
    pub cooldown: Duration,
    /// Upper bound on a single narrative call.
    pub narrative_timeout: Duration,
    pub catalog: Catalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            summon_command: DEFAULT_SUMMON_COMMAND.to_string(),
            attack_command: DEFAULT_ATTACK_COMMAND.to_string(),
            cooldown: DEFAULT_COOLDOWN,
            narrative_timeout: DEFAULT_TIMEOUT,
            catalog: Catalog::default(),
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(command) = lookup("BOSS_SUMMON_COMMAND") {
            config.summon_command = command;
        }
        if let Some(command) = lookup("BOSS_ATTACK_COMMAND") {
            config.attack_command = command;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "BOSS_COOLDOWN_SECS")? {
            config.cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "BOSS_NARRATIVE_TIMEOUT_SECS")? {
            config.narrative_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_summon_command(mut self, command: impl Into<String>) -> Self {
        self.summon_command = command.into();
        self
    }

    pub fn with_attack_command(mut self, command: impl Into<String>) -> Self {
        self.attack_command = command.into();
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_narrative_timeout(mut self, timeout: Duration) -> Self {
        self.narrative_timeout = timeout;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the catalog with one read from a JSON file.
    pub fn with_catalog_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = serde_json::from_str(&content).map_err(|source| ConfigError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.with_catalog(catalog))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.summon_command.is_empty()
            || self.attack_command.is_empty()
            || self.summon_command == self.attack_command
        {
            return Err(ConfigError::AmbiguousCommands);
        }
        if self.narrative_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.catalog.bosses.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if self.catalog.personalities.is_empty() {
            return Err(ConfigError::NoPersonalities);
        }
        if let Some(bad) = self.catalog.bosses.iter().find(|t| t.hp <= 0) {
            return Err(ConfigError::InvalidTemplate(bad.name.clone()));
        }
        Ok(())
    }
}

/// How boss dialogue is requested from the model.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    /// Model override; the client default is used when unset.
    pub model: Option<String>,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    pub api_base: Option<String>,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 256,
            temperature: Some(0.9),
            api_base: None,
        }
    }
}

impl NarrativeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            model: lookup("BOSS_MODEL").filter(|m| !m.is_empty()),
            api_base: lookup("ANTHROPIC_BASE_URL").filter(|b| !b.is_empty()),
            ..Self::default()
        };
        if let Some(tokens) = parse_var::<usize>(&lookup, "BOSS_MAX_TOKENS")? {
            config.max_tokens = tokens;
        }
        if let Some(temperature) = parse_var::<f32>(&lookup, "BOSS_TEMPERATURE")? {
            config.temperature = Some(temperature);
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BossTemplate;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.summon_command, "!summon boss");
        assert_eq!(config.attack_command, "!attack boss");
        assert_eq!(config.cooldown, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let config = GameConfig::from_lookup(lookup(&[
            ("BOSS_ATTACK_COMMAND", "!hit"),
            ("BOSS_COOLDOWN_SECS", " 5 "),
            ("BOSS_NARRATIVE_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.summon_command, DEFAULT_SUMMON_COMMAND);
        assert_eq!(config.attack_command, "!hit");
        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.narrative_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let err = GameConfig::from_lookup(lookup(&[("BOSS_COOLDOWN_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "BOSS_COOLDOWN_SECS", .. }));
    }

    #[test]
    fn test_same_command_twice_is_rejected() {
        let err = GameConfig::from_lookup(lookup(&[("BOSS_ATTACK_COMMAND", DEFAULT_SUMMON_COMMAND)])).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousCommands));
    }

    #[test]
    fn test_zero_narrative_timeout_is_rejected() {
        let err = GameConfig::from_lookup(lookup(&[("BOSS_NARRATIVE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));

        let config = GameConfig::default().with_narrative_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
        assert!(GameConfig::default().with_narrative_timeout(Duration::from_millis(1)).validate().is_ok());
    }

    #[test]
    fn test_catalog_validation() {
        let empty = GameConfig::default().with_catalog(Catalog {
            bosses: vec![],
            personalities: vec!["calm".into()],
        });
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyCatalog)));

        let no_traits = GameConfig::default().with_catalog(Catalog {
            bosses: vec![BossTemplate::new("Imp", 10, 1, 1)],
            personalities: vec![],
        });
        assert!(matches!(no_traits.validate(), Err(ConfigError::NoPersonalities)));

        let dead_on_arrival =
            GameConfig::default().with_catalog(Catalog::single(BossTemplate::new("Ghost", 0, 1, 1), "wistful"));
        assert!(matches!(dead_on_arrival.validate(), Err(ConfigError::InvalidTemplate(name)) if name == "Ghost"));
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = GameConfig::default()
            .with_catalog_file("/definitely/not/here/catalog.json")
            .unwrap_err();
        assert!(matches!(err, ConfigError::CatalogIo { .. }));
    }

    #[test]
    fn test_narrative_overlay() {
        let config = NarrativeConfig::from_lookup(lookup(&[
            ("BOSS_MODEL", "claude-3-5-haiku-latest"),
            ("BOSS_TEMPERATURE", "0.4"),
        ]))
        .unwrap();

        assert_eq!(config.model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.max_tokens, 256);
        assert!(config.api_base.is_none());
    }
}
