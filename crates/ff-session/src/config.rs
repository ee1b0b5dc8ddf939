//! Engine configuration and session start options.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for constructing an [`crate::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RNG seed for reproducible rolls and template resolution.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: rand::random(),
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// How a new character's stats are determined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMethod {
    /// Use each stat's adventure-defined default.
    #[default]
    Defaults,
    /// Roll 4d6-drop-lowest per stat, clamped to the stat's bounds.
    Rolled,
    /// Caller-supplied values, clamped to bounds. Unknown stat names
    /// are rejected, not silently added.
    Custom(HashMap<String, i64>),
}

/// Options for starting a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartOptions {
    /// Name for the player character, stored in `custom_data`.
    pub character_name: Option<String>,
    /// Substitute `{list}` templates in the opening location and story.
    pub randomize_initial: bool,
    /// How the character's stats are determined.
    pub stats: StatMethod,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            character_name: None,
            randomize_initial: true,
            stats: StatMethod::Defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_randomize() {
        let opts = StartOptions::default();
        assert!(opts.randomize_initial);
        assert!(opts.character_name.is_none());
        assert!(matches!(opts.stats, StatMethod::Defaults));
    }

    #[test]
    fn seed_builder() {
        let cfg = EngineConfig::default().with_seed(7);
        assert_eq!(cfg.seed, 7);
    }
}
