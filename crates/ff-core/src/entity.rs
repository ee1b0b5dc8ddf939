use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId, SessionId};
use crate::props::Props;

/// One remembered event on a character, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// What the character remembers.
    pub content: String,
    /// The recorded event this memory came from, if any. Directly
    /// implanted memories (rumors, secrets) have none.
    pub source_event_id: Option<EventId>,
    /// When the memory was formed.
    pub timestamp: DateTime<Utc>,
}

/// A non-player character in the world.
///
/// Characters witness events recorded at their location and accumulate
/// memories the narrator can query later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: EntityId,
    /// The owning session.
    pub session_id: SessionId,
    /// Character name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Current location name. `None` means unplaced.
    pub location: Option<String>,
    /// Stats for checks against this character. Unclamped; adventure
    /// stat bounds apply to the player only.
    #[serde(default)]
    pub stats: HashMap<String, i64>,
    /// Open properties, e.g. `hostile: true`.
    #[serde(default)]
    pub properties: Props,
    /// Accumulated memories, oldest first. Append-only; truncation is
    /// a read-time concern.
    #[serde(default)]
    pub memories: Vec<Memory>,
    /// Creation timestamp. List order follows creation order.
    pub created_at: DateTime<Utc>,
}

/// A place in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier.
    pub id: EntityId,
    /// The owning session.
    pub session_id: SessionId,
    /// Location name. Player and character `location` fields reference
    /// locations by this name, never by id.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Names of locations reachable from here. Symmetry is not
    /// enforced; edges may be one-directional.
    #[serde(default)]
    pub connected_to: Vec<String>,
    /// Open properties, e.g. `locked: true`.
    #[serde(default)]
    pub properties: Props,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A physical object in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: EntityId,
    /// The owning session.
    pub session_id: SessionId,
    /// Item name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Where the item lies. `None` means it is in the player's
    /// inventory.
    pub location: Option<String>,
    /// Open properties, e.g. `usable: true`.
    #[serde(default)]
    pub properties: Props,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An organization the player holds reputation with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    /// Unique identifier.
    pub id: EntityId,
    /// The owning session.
    pub session_id: SessionId,
    /// Faction name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Standing with the player, conventionally -100 Hostile to
    /// +100 Revered.
    pub reputation: i64,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A temporary condition on the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Unique identifier.
    pub id: EntityId,
    /// The owning session.
    pub session_id: SessionId,
    /// Effect name, e.g. "Poisoned".
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Remaining ticks. Zero or negative means expired and eligible
    /// for removal.
    pub duration: i64,
    /// Stat name to delta, applied transiently on top of base stats.
    /// Never merged into the persisted stat map.
    #[serde(default)]
    pub stat_modifiers: HashMap<String, i64>,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl StatusEffect {
    /// Whether this effect has run out.
    pub fn is_expired(&self) -> bool {
        self.duration <= 0
    }
}

/// A narrated event recorded at a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier referenced by witness memories.
    pub id: EventId,
    /// The owning session.
    pub session_id: SessionId,
    /// Location name the event happened at.
    pub location: String,
    /// What happened.
    pub description: String,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_effect_expiry() {
        let mut effect = StatusEffect {
            id: EntityId::new(),
            session_id: SessionId::new(),
            name: "Poisoned".to_string(),
            description: String::new(),
            duration: 2,
            stat_modifiers: HashMap::new(),
            properties: Props::new(),
            created_at: Utc::now(),
        };
        assert!(!effect.is_expired());
        effect.duration = 0;
        assert!(effect.is_expired());
        effect.duration = -1;
        assert!(effect.is_expired());
    }

    #[test]
    fn character_optional_fields_default_on_deserialize() {
        let json = format!(
            r#"{{
                "id": "{}", "session_id": "{}",
                "name": "Guard", "description": "Stern",
                "location": "Gate", "created_at": "2026-01-01T00:00:00Z"
            }}"#,
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4(),
        );
        let character: Character = serde_json::from_str(&json).unwrap();
        assert!(character.stats.is_empty());
        assert!(character.memories.is_empty());
        assert_eq!(character.location.as_deref(), Some("Gate"));
    }
}
