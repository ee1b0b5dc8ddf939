use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Definition of a single character stat for an adventure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatDefinition {
    /// Stat name, e.g. "Strength".
    pub name: String,
    /// What this stat governs, for the narrator's benefit.
    pub description: String,
    /// Value a new character starts with.
    pub default_value: i64,
    /// Inclusive lower bound.
    pub min_value: i64,
    /// Inclusive upper bound.
    pub max_value: i64,
}

impl StatDefinition {
    /// Create a stat definition with the conventional 0-20 bounds and
    /// a default of 10.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default_value: 10,
            min_value: 0,
            max_value: 20,
        }
    }

    /// Clamp a value to this stat's declared bounds.
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// A named pool of words, grouped into categories, used for procedural
/// text substitution in templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordList {
    /// List name referenced by `{name}` template tokens.
    pub name: String,
    /// What kind of words this list holds.
    pub description: String,
    /// Category name to word pool. A bare `{name}` token draws from
    /// the union of all categories.
    pub categories: HashMap<String, Vec<String>>,
}

/// In-game clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Hour of day (0-23) a new session starts at.
    pub starting_hour: u32,
    /// Day number a new session starts at.
    pub starting_day: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            starting_hour: 8,
            starting_day: 1,
        }
    }
}

/// Currency configuration for an adventure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Starting currency balance.
    pub starting_amount: i64,
    /// Whether the balance may go negative.
    pub allow_debt: bool,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            starting_amount: 0,
            allow_debt: false,
        }
    }
}

/// A faction seeded into every new session of an adventure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionDefinition {
    /// Stable identifier within the adventure.
    pub id: String,
    /// Faction name.
    pub name: String,
    /// Faction description.
    pub description: String,
    /// Reputation the player starts with (-100 Hostile to +100 Revered).
    pub initial_reputation: i64,
}

/// A read-only adventure template. Supplied once at session creation;
/// the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdventureDefinition {
    /// Stable adventure identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short blurb shown when listing adventures.
    pub description: String,
    /// System prompt guiding the narrator's story generation.
    pub prompt: String,
    /// Stats every player character in this adventure has.
    pub stats: Vec<StatDefinition>,
    /// Hit points a new character starts (and maxes out) at.
    #[serde(default = "default_starting_hp")]
    pub starting_hp: i64,
    /// Word lists available for template substitution.
    #[serde(default)]
    pub word_lists: Vec<WordList>,
    /// Where the player begins. May contain `{list}` template tokens.
    pub initial_location: String,
    /// Opening story text. May contain `{list}` template tokens.
    pub initial_story: String,
    /// Clock configuration.
    #[serde(default)]
    pub time_config: TimeConfig,
    /// Currency configuration.
    #[serde(default)]
    pub currency_config: CurrencyConfig,
    /// Factions seeded into each new session.
    #[serde(default)]
    pub factions: Vec<FactionDefinition>,
}

fn default_starting_hp() -> i64 {
    10
}

impl AdventureDefinition {
    /// Look up a stat definition by name.
    pub fn stat(&self, name: &str) -> Option<&StatDefinition> {
        self.stats.iter().find(|s| s.name == name)
    }

    /// The default stat map a new character starts with.
    pub fn default_stats(&self) -> HashMap<String, i64> {
        self.stats
            .iter()
            .map(|s| (s.name.clone(), s.default_value))
            .collect()
    }
}
