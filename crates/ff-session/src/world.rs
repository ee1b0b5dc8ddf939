//! World-entity CRUD: characters, locations, items, factions, status
//! effects.
//!
//! All five kinds share one contract, expressed through [`WorldRecord`]
//! and a handful of generic helpers: create persists a fresh record and
//! returns it whole, update applies a partial patch (`properties`
//! shallow-merged, list fields replaced wholesale), list returns
//! creation order, delete is idempotent. There is no referential
//! integrity: deleting or renaming a location leaves `connected_to`
//! arrays and entity `location` strings pointing at the old name. The
//! narrator owns the fiction's consistency; the engine owns the rows.

use std::collections::HashMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ff_core::{
    Character, EntityId, Faction, Item, Location, Props, SessionId, StatusEffect, merge_props,
};
use ff_store::RecordKind;

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};

/// Deserializes `Option<Option<T>>` so an absent field, an explicit
/// null, and a value are three distinct patch states: leave unchanged,
/// clear, set.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub(crate) fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::deserialize(deserializer).map(Some)
    }
}

/// A session-scoped entity the generic CRUD helpers can persist.
pub(crate) trait WorldRecord: Serialize + DeserializeOwned {
    /// The store keyspace this record lives in.
    const KIND: RecordKind;

    fn id(&self) -> EntityId;
    fn session_id(&self) -> SessionId;
}

macro_rules! world_record {
    ($ty:ty, $kind:expr) => {
        impl WorldRecord for $ty {
            const KIND: RecordKind = $kind;

            fn id(&self) -> EntityId {
                self.id
            }

            fn session_id(&self) -> SessionId {
                self.session_id
            }
        }
    };
}

world_record!(Character, RecordKind::Character);
world_record!(Location, RecordKind::Location);
world_record!(Item, RecordKind::Item);
world_record!(Faction, RecordKind::Faction);
world_record!(StatusEffect, RecordKind::StatusEffect);

impl Engine {
    fn world_get<T: WorldRecord>(&self, id: EntityId) -> EngineResult<T> {
        self.load_doc(T::KIND, &id.0.to_string())?
            .ok_or_else(|| EngineError::NotFound(format!("{} {id}", T::KIND.as_str())))
    }

    fn world_put<T: WorldRecord>(&self, record: &T) -> EngineResult<()> {
        self.save_doc(
            T::KIND,
            &record.id().0.to_string(),
            Some(&record.session_id()),
            record,
        )
    }

    fn world_list<T: WorldRecord>(&self, session_id: SessionId) -> EngineResult<Vec<T>> {
        self.load_session(session_id)?;
        self.load_rows(T::KIND, session_id)
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Create a character.
    pub fn create_character(
        &self,
        session_id: SessionId,
        new: NewCharacter,
    ) -> EngineResult<Character> {
        self.load_session(session_id)?;
        let character = Character {
            id: EntityId::new(),
            session_id,
            name: new.name,
            description: new.description,
            location: new.location,
            stats: new.stats,
            properties: new.properties,
            memories: Vec::new(),
            created_at: Utc::now(),
        };
        self.world_put(&character)?;
        debug!(session = %session_id, id = %character.id, name = %character.name, "character created");
        Ok(character)
    }

    /// Fetch a character by id.
    pub fn get_character(&self, id: EntityId) -> EngineResult<Character> {
        self.world_get(id)
    }

    /// Patch a character.
    pub fn update_character(
        &self,
        id: EntityId,
        patch: CharacterPatch,
    ) -> EngineResult<Character> {
        let mut character: Character = self.world_get(id)?;
        if let Some(name) = patch.name {
            character.name = name;
        }
        if let Some(description) = patch.description {
            character.description = description;
        }
        if let Some(location) = patch.location {
            character.location = location;
        }
        if let Some(stats) = patch.stats {
            character.stats = stats;
        }
        merge_props(&mut character.properties, patch.properties);
        self.world_put(&character)?;
        Ok(character)
    }

    /// Characters in a session, oldest first, optionally filtered by
    /// exact location name.
    pub fn list_characters(
        &self,
        session_id: SessionId,
        location: Option<&str>,
    ) -> EngineResult<Vec<Character>> {
        let mut characters: Vec<Character> = self.world_list(session_id)?;
        if let Some(location) = location {
            characters.retain(|c| c.location.as_deref() == Some(location));
        }
        Ok(characters)
    }

    /// Delete a character. Idempotent.
    pub fn delete_character(&self, id: EntityId) -> EngineResult<bool> {
        self.store_delete(RecordKind::Character, &id.0.to_string())
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    /// Create a location. Connections are one-directional unless the
    /// caller adds the reverse edge.
    pub fn create_location(
        &self,
        session_id: SessionId,
        new: NewLocation,
    ) -> EngineResult<Location> {
        self.load_session(session_id)?;
        let location = Location {
            id: EntityId::new(),
            session_id,
            name: new.name,
            description: new.description,
            connected_to: new.connected_to,
            properties: new.properties,
            created_at: Utc::now(),
        };
        self.world_put(&location)?;
        debug!(session = %session_id, id = %location.id, name = %location.name, "location created");
        Ok(location)
    }

    /// Fetch a location by id.
    pub fn get_location(&self, id: EntityId) -> EngineResult<Location> {
        self.world_get(id)
    }

    /// Patch a location. `connected_to` is replaced wholesale when
    /// given.
    pub fn update_location(&self, id: EntityId, patch: LocationPatch) -> EngineResult<Location> {
        let mut location: Location = self.world_get(id)?;
        if let Some(name) = patch.name {
            location.name = name;
        }
        if let Some(description) = patch.description {
            location.description = description;
        }
        if let Some(connected_to) = patch.connected_to {
            location.connected_to = connected_to;
        }
        merge_props(&mut location.properties, patch.properties);
        self.world_put(&location)?;
        Ok(location)
    }

    /// Locations in a session, oldest first.
    pub fn list_locations(&self, session_id: SessionId) -> EngineResult<Vec<Location>> {
        self.world_list(session_id)
    }

    /// Delete a location. Idempotent; referencing `connected_to`
    /// arrays are left as-is.
    pub fn delete_location(&self, id: EntityId) -> EngineResult<bool> {
        self.store_delete(RecordKind::Location, &id.0.to_string())
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Create an item. An item with no location is in the player's
    /// hands, so it is mirrored into the inventory as well.
    pub fn create_item(&self, session_id: SessionId, new: NewItem) -> EngineResult<Item> {
        self.load_session(session_id)?;
        let item = Item {
            id: EntityId::new(),
            session_id,
            name: new.name,
            description: new.description,
            location: new.location,
            properties: new.properties,
            created_at: Utc::now(),
        };
        self.world_put(&item)?;
        if item.location.is_none() {
            self.add_item(session_id, &item.name, 1, item.properties.clone())?;
        }
        debug!(session = %session_id, id = %item.id, name = %item.name, "item created");
        Ok(item)
    }

    /// Fetch an item by id.
    pub fn get_item(&self, id: EntityId) -> EngineResult<Item> {
        self.world_get(id)
    }

    /// Patch an item. Moving an item in or out of the player's hands
    /// here does not touch the inventory; pair it with
    /// [`Engine::add_item`] / [`Engine::remove_item`].
    pub fn update_item_entity(&self, id: EntityId, patch: ItemPatch) -> EngineResult<Item> {
        let mut item: Item = self.world_get(id)?;
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(location) = patch.location {
            item.location = location;
        }
        merge_props(&mut item.properties, patch.properties);
        self.world_put(&item)?;
        Ok(item)
    }

    /// Items in a session, oldest first, optionally filtered by exact
    /// location name.
    pub fn list_items(
        &self,
        session_id: SessionId,
        location: Option<&str>,
    ) -> EngineResult<Vec<Item>> {
        let mut items: Vec<Item> = self.world_list(session_id)?;
        if let Some(location) = location {
            items.retain(|i| i.location.as_deref() == Some(location));
        }
        Ok(items)
    }

    /// Delete an item. Idempotent; any mirrored inventory entry stays.
    pub fn delete_item(&self, id: EntityId) -> EngineResult<bool> {
        self.store_delete(RecordKind::Item, &id.0.to_string())
    }

    // -----------------------------------------------------------------------
    // Factions
    // -----------------------------------------------------------------------

    /// Create a faction.
    pub fn create_faction(&self, session_id: SessionId, new: NewFaction) -> EngineResult<Faction> {
        self.load_session(session_id)?;
        let faction = Faction {
            id: EntityId::new(),
            session_id,
            name: new.name,
            description: new.description,
            reputation: new.reputation,
            properties: new.properties,
            created_at: Utc::now(),
        };
        self.world_put(&faction)?;
        Ok(faction)
    }

    /// Fetch a faction by id.
    pub fn get_faction(&self, id: EntityId) -> EngineResult<Faction> {
        self.world_get(id)
    }

    /// Patch a faction. `reputation` here is an absolute set; use a
    /// delta through the reputation conventions of the adventure if
    /// relative changes are wanted.
    pub fn update_faction(&self, id: EntityId, patch: FactionPatch) -> EngineResult<Faction> {
        let mut faction: Faction = self.world_get(id)?;
        if let Some(name) = patch.name {
            faction.name = name;
        }
        if let Some(description) = patch.description {
            faction.description = description;
        }
        if let Some(reputation) = patch.reputation {
            faction.reputation = reputation;
        }
        merge_props(&mut faction.properties, patch.properties);
        self.world_put(&faction)?;
        Ok(faction)
    }

    /// Factions in a session, oldest first.
    pub fn list_factions(&self, session_id: SessionId) -> EngineResult<Vec<Faction>> {
        self.world_list(session_id)
    }

    /// Delete a faction. Idempotent.
    pub fn delete_faction(&self, id: EntityId) -> EngineResult<bool> {
        self.store_delete(RecordKind::Faction, &id.0.to_string())
    }

    // -----------------------------------------------------------------------
    // Status effects
    // -----------------------------------------------------------------------

    /// Apply a status effect to the player. Modifiers act transiently
    /// through [`Engine::effective_stats`]; the persisted stat map is
    /// never changed.
    pub fn create_status_effect(
        &self,
        session_id: SessionId,
        new: NewStatusEffect,
    ) -> EngineResult<StatusEffect> {
        self.load_session(session_id)?;
        if new.duration <= 0 {
            return Err(EngineError::InvalidArgument(
                "status effect duration must be positive".to_string(),
            ));
        }
        let effect = StatusEffect {
            id: EntityId::new(),
            session_id,
            name: new.name,
            description: new.description,
            duration: new.duration,
            stat_modifiers: new.stat_modifiers,
            properties: new.properties,
            created_at: Utc::now(),
        };
        self.world_put(&effect)?;
        debug!(session = %session_id, name = %effect.name, duration = effect.duration, "status effect applied");
        Ok(effect)
    }

    /// Fetch a status effect by id.
    pub fn get_status_effect(&self, id: EntityId) -> EngineResult<StatusEffect> {
        self.world_get(id)
    }

    /// Patch a status effect.
    pub fn update_status_effect(
        &self,
        id: EntityId,
        patch: StatusEffectPatch,
    ) -> EngineResult<StatusEffect> {
        let mut effect: StatusEffect = self.world_get(id)?;
        if let Some(name) = patch.name {
            effect.name = name;
        }
        if let Some(description) = patch.description {
            effect.description = description;
        }
        if let Some(duration) = patch.duration {
            effect.duration = duration;
        }
        if let Some(stat_modifiers) = patch.stat_modifiers {
            effect.stat_modifiers = stat_modifiers;
        }
        merge_props(&mut effect.properties, patch.properties);
        self.world_put(&effect)?;
        Ok(effect)
    }

    /// Status effects on the player, oldest first.
    pub fn list_status_effects(&self, session_id: SessionId) -> EngineResult<Vec<StatusEffect>> {
        self.world_list(session_id)
    }

    /// Remove a status effect early. Idempotent.
    pub fn delete_status_effect(&self, id: EntityId) -> EngineResult<bool> {
        self.store_delete(RecordKind::StatusEffect, &id.0.to_string())
    }
}

/// Fields for creating a character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCharacter {
    /// Character name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Starting location name, if placed.
    #[serde(default)]
    pub location: Option<String>,
    /// Stats for checks against this character.
    #[serde(default)]
    pub stats: HashMap<String, i64>,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
}

/// Partial update for a character. Absent fields are left unchanged;
/// an explicit null `location` unplaces the character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterPatch {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement location; `Some(None)` clears it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub location: Option<Option<String>>,
    /// Wholesale replacement stat map.
    #[serde(default)]
    pub stats: Option<HashMap<String, i64>>,
    /// Properties shallow-merged into the existing map.
    #[serde(default)]
    pub properties: Props,
}

/// Fields for creating a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLocation {
    /// Location name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Names of reachable locations.
    #[serde(default)]
    pub connected_to: Vec<String>,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
}

/// Partial update for a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationPatch {
    /// Replacement name. Entities referencing the old name are not
    /// repointed.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Wholesale replacement connection list.
    #[serde(default)]
    pub connected_to: Option<Vec<String>>,
    /// Properties shallow-merged into the existing map.
    #[serde(default)]
    pub properties: Props,
}

/// Fields for creating an item. No location means the player holds it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    /// Item name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Where the item lies, or `None` for the player's inventory.
    #[serde(default)]
    pub location: Option<String>,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
}

/// Partial update for an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement location; `Some(None)` hands it to the player.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub location: Option<Option<String>>,
    /// Properties shallow-merged into the existing map.
    #[serde(default)]
    pub properties: Props,
}

/// Fields for creating a faction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFaction {
    /// Faction name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Starting reputation with the player.
    #[serde(default)]
    pub reputation: i64,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
}

/// Partial update for a faction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionPatch {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute replacement reputation.
    #[serde(default)]
    pub reputation: Option<i64>,
    /// Properties shallow-merged into the existing map.
    #[serde(default)]
    pub properties: Props,
}

/// Fields for applying a status effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStatusEffect {
    /// Effect name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Ticks until the effect wears off. Must be positive.
    pub duration: i64,
    /// Transient stat deltas while active.
    #[serde(default)]
    pub stat_modifiers: HashMap<String, i64>,
    /// Open properties.
    #[serde(default)]
    pub properties: Props,
}

/// Partial update for a status effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffectPatch {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement remaining duration.
    #[serde(default)]
    pub duration: Option<i64>,
    /// Wholesale replacement modifier map.
    #[serde(default)]
    pub stat_modifiers: Option<HashMap<String, i64>>,
    /// Properties shallow-merged into the existing map.
    #[serde(default)]
    pub properties: Props,
}
