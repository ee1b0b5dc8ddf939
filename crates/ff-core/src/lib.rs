//! Core types for Fateforge: the data model behind an AI-narrated
//! interactive-fiction session.
//!
//! This crate defines the persistent shapes — player state, world
//! entities, adventure definitions — without any storage or mutation
//! logic. The session engine validates and mutates them; this crate
//! only guarantees their serialized form and pure invariant helpers.

/// Adventure templates: stat definitions, word lists, and feature configs.
pub mod adventure;
/// World entity records: characters, locations, items, factions, effects.
pub mod entity;
/// Identifier newtypes for sessions, entities, and events.
pub mod id;
/// The per-session player record and its sub-structures.
pub mod player;
/// Open, typed property values for adventure-specific extensions.
pub mod props;
/// Session bookkeeping records.
pub mod session;

/// Re-export adventure definition types.
pub use adventure::{
    AdventureDefinition, CurrencyConfig, FactionDefinition, StatDefinition, TimeConfig, WordList,
};
/// Re-export entity records.
pub use entity::{Character, EventRecord, Faction, Item, Location, Memory, StatusEffect};
/// Re-export identifier newtypes.
pub use id::{ActionId, EntityId, EventId, SessionId};
/// Re-export player state types.
pub use player::{InventoryItem, PlayerState, Quest, QuestStatus};
/// Re-export property value types.
pub use props::{PropValue, Props, merge_props};
/// Re-export session records.
pub use session::{GameSession, SessionSummary};
