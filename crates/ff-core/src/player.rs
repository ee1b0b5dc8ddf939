use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adventure::AdventureDefinition;
use crate::id::SessionId;
use crate::props::Props;

/// A stack of identical items in the player's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item name; inventory entries are merged by name.
    pub name: String,
    /// How many the player carries. Always at least 1; the entry is
    /// removed when quantity reaches 0.
    pub quantity: u32,
    /// Open item properties, e.g. `consumable: false`.
    #[serde(default)]
    pub properties: Props,
}

impl InventoryItem {
    /// Create a single-item stack with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 1,
            properties: Props::new(),
        }
    }

    /// Whether using this item consumes one from the stack. Items are
    /// consumable unless a `consumable: false` property says otherwise.
    pub fn is_consumable(&self) -> bool {
        self.properties
            .get("consumable")
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }
}

/// Lifecycle state of a quest.
///
/// Legal transitions form a straight line: `NotStarted` to `Active`,
/// then `Active` to either terminal state. Terminal states admit
/// nothing, including each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    /// Quest is known but not yet taken up.
    NotStarted,
    /// Quest is in progress.
    Active,
    /// Quest finished successfully. Terminal.
    Completed,
    /// Quest finished in failure. Terminal.
    Failed,
}

impl QuestStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Active)
                | (Self::Active, Self::Completed)
                | (Self::Active, Self::Failed)
        )
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A quest tracked on the player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    /// Stable quest identifier chosen by the narrator.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current lifecycle status.
    pub status: QuestStatus,
    /// All objectives belonging to this quest.
    pub objectives: Vec<String>,
    /// Objectives ticked off so far. Always a subset of `objectives`.
    pub completed_objectives: Vec<String>,
}

/// The single mutable player record for a session.
///
/// Created exactly once when the adventure starts and never recreated;
/// every mutation goes through the session engine's validated
/// transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// The owning session.
    pub session_id: SessionId,
    /// Current hit points, 0..=max_hp. Reaching 0 does not end the
    /// session; the narrator decides the consequence.
    pub hp: i64,
    /// Hit point ceiling, fixed at session creation.
    pub max_hp: i64,
    /// Running score. Unbounded, may go negative.
    pub score: i64,
    /// Current location name. Free text; the narrator may reference
    /// places that were never materialized as Location entities.
    pub location: String,
    /// Stat name to current value. Every key must name a stat defined
    /// by the owning adventure.
    pub stats: HashMap<String, i64>,
    /// Carried items, in acquisition order.
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    /// Quests the player has picked up or been offered.
    #[serde(default)]
    pub quests: Vec<Quest>,
    /// Entity name to reputation. Open range; conventions vary by
    /// adventure.
    #[serde(default)]
    pub relationships: HashMap<String, i64>,
    /// Currency balance.
    pub currency: i64,
    /// Hour of day, 0..=23.
    pub game_time: u32,
    /// Day number, starting at 1.
    pub game_day: u32,
    /// Adventure-specific extensions, e.g. the character's name.
    #[serde(default)]
    pub custom_data: Props,
}

impl PlayerState {
    /// Build the initial player record for a new session of the given
    /// adventure: default stats, starting hp/currency/clock, empty
    /// collections.
    pub fn initial(session_id: SessionId, adventure: &AdventureDefinition) -> Self {
        Self {
            session_id,
            hp: adventure.starting_hp,
            max_hp: adventure.starting_hp,
            score: 0,
            location: adventure.initial_location.clone(),
            stats: adventure.default_stats(),
            inventory: Vec::new(),
            quests: Vec::new(),
            relationships: HashMap::new(),
            currency: adventure.currency_config.starting_amount,
            game_time: adventure.time_config.starting_hour,
            game_day: adventure.time_config.starting_day,
            custom_data: Props::new(),
        }
    }

    /// Advance the clock by `hours`, wrapping the hour-of-day modulo 24
    /// and bumping the day counter once per wrap. Returns how many
    /// days passed.
    pub fn advance_clock(&mut self, hours: u32) -> u32 {
        // Widen before adding so an advance near u32::MAX cannot overflow.
        let total = u64::from(self.game_time) + u64::from(hours);
        let days_passed = (total / 24) as u32;
        self.game_time = (total % 24) as u32;
        self.game_day = self.game_day.saturating_add(days_passed);
        days_passed
    }

    /// Find an inventory entry by name.
    pub fn item(&self, name: &str) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.name == name)
    }

    /// Find an inventory entry by name, mutably.
    pub fn item_mut(&mut self, name: &str) -> Option<&mut InventoryItem> {
        self.inventory.iter_mut().find(|i| i.name == name)
    }

    /// Find a quest by id.
    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    /// Find a quest by id, mutably.
    pub fn quest_mut(&mut self, id: &str) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.id == id)
    }
}
