//! Session engine for Fateforge.
//!
//! The engine sits between a tool-call transport and a row store: the
//! narrator (an AI agent) issues one call at a time, each call is a
//! single validated read-modify-write, and every result — success or
//! structured failure — is safe to hand back across the tool boundary.
//!
//! The pieces, leaves first: [`error`] defines the structured failure
//! vocabulary; [`engine`] owns the store handle, the adventure
//! registry, and session lifecycle; [`player`] is the player state
//! machine; [`world`] the entity CRUD layer; [`events`] the
//! witness/memory propagator; [`batch`] the sequential multi-command
//! coordinator.

/// Ordered multi-command execution with partial-success semantics.
pub mod batch;
/// Engine configuration and session start options.
pub mod config;
/// The engine: store handle, adventure registry, session lifecycle.
pub mod engine;
/// Structured engine errors.
pub mod error;
/// Event recording and character memory propagation.
pub mod events;
/// The player state machine.
pub mod player;
/// World-entity CRUD: characters, locations, items, factions, effects.
pub mod world;

/// Re-export batch types.
pub use batch::{BatchFailure, BatchReport, Command, CommandOutcome};
/// Re-export configuration types.
pub use config::{EngineConfig, StartOptions, StatMethod};
/// Re-export the engine and its lifecycle reports.
pub use engine::{AdventureDigest, Engine, ResumeReport, SessionDigest, StartReport};
/// Re-export error types.
pub use error::{EngineError, EngineResult, ErrorPayload};
/// Re-export event types.
pub use events::{ActionRecord, EventRecorded, MemoryAdded, Witness};
/// Re-export player state machine reports.
pub use player::{
    ClockChange, CurrencyChange, HpChange, InventoryChange, ItemUsed, Moved, RelationshipChange,
    ScoreChange, StatChange, WordDraw,
};
/// Re-export world patch/new types.
pub use world::{
    CharacterPatch, FactionPatch, ItemPatch, LocationPatch, NewCharacter, NewFaction, NewItem,
    NewLocation, NewStatusEffect, StatusEffectPatch,
};
