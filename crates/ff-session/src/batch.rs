//! Ordered multi-command execution.
//!
//! A batch runs strictly sequentially and stops at the first failing
//! command. Everything before the failure stays committed; there is no
//! rollback. The report carries one outcome per executed command plus
//! the failure position, so the narrator can tell the story exactly as
//! far as it really happened and repair the rest.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use ff_core::{
    Character, EntityId, Faction, Item, Location, Props, Quest, SessionId, StatusEffect,
};
use ff_dice::{CheckResult, RollMode};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::events::{ActionRecord, EventRecorded, MemoryAdded};
use crate::player::{
    ClockChange, CurrencyChange, HpChange, InventoryChange, ItemUsed, Moved, RelationshipChange,
    ScoreChange, StatChange,
};
use crate::world::{
    CharacterPatch, FactionPatch, ItemPatch, LocationPatch, NewCharacter, NewFaction, NewItem,
    NewLocation, NewStatusEffect, StatusEffectPatch,
};

fn one() -> u32 {
    1
}

/// One command in a batch. The wire shape is tagged by `op`, e.g.
/// `{"op": "modify_hp", "delta": -3}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Apply a hit point delta.
    ModifyHp {
        /// The delta.
        delta: i64,
        /// Narrative reason, logged.
        #[serde(default)]
        reason: Option<String>,
    },
    /// Apply a stat delta.
    ModifyStat {
        /// The stat name.
        stat: String,
        /// The delta.
        delta: i64,
    },
    /// Apply a score delta.
    ModifyScore {
        /// The delta.
        delta: i64,
    },
    /// Move the player.
    MoveTo {
        /// The destination.
        location: String,
    },
    /// Add items to the inventory.
    AddItem {
        /// The item name.
        name: String,
        /// How many to add.
        #[serde(default = "one")]
        quantity: u32,
        /// Item properties, merged on an existing stack.
        #[serde(default)]
        properties: Props,
    },
    /// Remove items from the inventory.
    RemoveItem {
        /// The item name.
        name: String,
        /// How many to remove.
        #[serde(default = "one")]
        quantity: u32,
    },
    /// Patch an inventory entry.
    UpdateItem {
        /// The item name.
        name: String,
        /// Replacement quantity.
        #[serde(default)]
        quantity: Option<u32>,
        /// Properties merged into the entry.
        #[serde(default)]
        properties: Props,
    },
    /// Use an item.
    UseItem {
        /// The item name.
        name: String,
    },
    /// Start a quest.
    StartQuest {
        /// The quest id.
        id: String,
        /// Display name.
        name: String,
        /// The quest's objectives.
        #[serde(default)]
        objectives: Vec<String>,
    },
    /// Tick off a quest objective.
    UpdateQuest {
        /// The quest id.
        id: String,
        /// The objective completed.
        completed_objective: String,
    },
    /// Close a quest.
    CompleteQuest {
        /// The quest id.
        id: String,
        /// Whether it succeeded.
        success: bool,
    },
    /// Adjust a relationship.
    AdjustRelationship {
        /// The entity the standing is with.
        entity_name: String,
        /// The delta.
        delta: i64,
    },
    /// Advance the clock.
    AdvanceTime {
        /// Hours to advance. Must be non-negative.
        hours: i64,
    },
    /// Apply a currency delta.
    Transact {
        /// The delta.
        delta: i64,
        /// Narrative reason, logged.
        #[serde(default)]
        reason: Option<String>,
    },
    /// Roll a check against a player stat.
    CheckStat {
        /// The stat name.
        stat: String,
        /// Difficulty class.
        dc: i64,
        /// Advantage, disadvantage, or neither.
        #[serde(default)]
        mode: RollMode,
    },
    /// Roll a check with an explicit modifier.
    CheckPlain {
        /// The modifier.
        #[serde(default)]
        modifier: i64,
        /// Difficulty class.
        dc: i64,
        /// Advantage, disadvantage, or neither.
        #[serde(default)]
        mode: RollMode,
    },
    /// Create a character.
    CreateCharacter {
        /// The character's fields.
        #[serde(flatten)]
        new: NewCharacter,
    },
    /// Patch a character.
    UpdateCharacter {
        /// The character's id.
        id: EntityId,
        /// The fields to change.
        #[serde(flatten)]
        patch: CharacterPatch,
    },
    /// Delete a character.
    DeleteCharacter {
        /// The character's id.
        id: EntityId,
    },
    /// Create a location.
    CreateLocation {
        /// The location's fields.
        #[serde(flatten)]
        new: NewLocation,
    },
    /// Patch a location.
    UpdateLocation {
        /// The location's id.
        id: EntityId,
        /// The fields to change.
        #[serde(flatten)]
        patch: LocationPatch,
    },
    /// Delete a location.
    DeleteLocation {
        /// The location's id.
        id: EntityId,
    },
    /// Create an item entity.
    CreateItem {
        /// The item's fields.
        #[serde(flatten)]
        new: NewItem,
    },
    /// Patch an item entity.
    UpdateItemEntity {
        /// The item's id.
        id: EntityId,
        /// The fields to change.
        #[serde(flatten)]
        patch: ItemPatch,
    },
    /// Delete an item entity.
    DeleteItem {
        /// The item's id.
        id: EntityId,
    },
    /// Create a faction.
    CreateFaction {
        /// The faction's fields.
        #[serde(flatten)]
        new: NewFaction,
    },
    /// Patch a faction.
    UpdateFaction {
        /// The faction's id.
        id: EntityId,
        /// The fields to change.
        #[serde(flatten)]
        patch: FactionPatch,
    },
    /// Delete a faction.
    DeleteFaction {
        /// The faction's id.
        id: EntityId,
    },
    /// Apply a status effect.
    CreateStatusEffect {
        /// The effect's fields.
        #[serde(flatten)]
        new: NewStatusEffect,
    },
    /// Patch a status effect.
    UpdateStatusEffect {
        /// The effect's id.
        id: EntityId,
        /// The fields to change.
        #[serde(flatten)]
        patch: StatusEffectPatch,
    },
    /// Remove a status effect.
    DeleteStatusEffect {
        /// The effect's id.
        id: EntityId,
    },
    /// Record an event and propagate witness memories.
    RecordEvent {
        /// Where it happened.
        location: String,
        /// What happened.
        description: String,
    },
    /// Implant a memory directly into a character.
    AddCharacterMemory {
        /// The character's id.
        character_id: EntityId,
        /// What the character remembers.
        content: String,
    },
    /// Append a row to the action log.
    RecordAction {
        /// What the player attempted.
        action: String,
        /// The stat the attempt tested, if any.
        #[serde(default)]
        stat_used: Option<String>,
        /// Dice detail of the check, if one was made.
        #[serde(default)]
        check: Option<CheckResult>,
        /// How the attempt resolved.
        outcome: String,
        /// Score delta awarded.
        #[serde(default)]
        score_change: i64,
    },
}

/// The result of one executed command, tagged by `kind` on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Hit points changed.
    Hp(HpChange),
    /// A stat changed.
    Stat(StatChange),
    /// The score changed.
    Score(ScoreChange),
    /// The player moved.
    Moved(Moved),
    /// The inventory changed.
    Inventory(InventoryChange),
    /// An item was used.
    ItemUsed(ItemUsed),
    /// A quest changed.
    Quest(Quest),
    /// A relationship changed.
    Relationship(RelationshipChange),
    /// The clock advanced.
    Clock(ClockChange),
    /// Currency changed.
    Currency(CurrencyChange),
    /// A check was rolled.
    Check(CheckResult),
    /// A character was created or patched.
    Character(Character),
    /// A location was created or patched.
    Location(Location),
    /// An item entity was created or patched.
    Item(Item),
    /// A faction was created or patched.
    Faction(Faction),
    /// A status effect was created or patched.
    StatusEffect(StatusEffect),
    /// An entity was deleted.
    Deleted {
        /// Whether the entity existed.
        existed: bool,
    },
    /// An event was recorded.
    Event(EventRecorded),
    /// A memory was implanted.
    Memory(MemoryAdded),
    /// An action was logged.
    Action(ActionRecord),
}

/// The position and cause of a batch's first failure.
#[derive(Debug)]
pub struct BatchFailure {
    /// Zero-based index of the failed command.
    pub index: usize,
    /// Why it failed.
    pub error: EngineError,
}

impl Serialize for BatchFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("BatchFailure", 2)?;
        row.serialize_field("index", &self.index)?;
        row.serialize_field("error", &self.error.payload())?;
        row.end()
    }
}

/// Report for an executed batch: one outcome per command that ran,
/// plus the first failure if one stopped the batch early.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// Outcomes of the commands that succeeded, in order.
    pub results: Vec<CommandOutcome>,
    /// The failure that stopped the batch, if any.
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    /// Zero-based index of the first failed command, if any.
    pub fn first_failure_index(&self) -> Option<usize> {
        self.failure.as_ref().map(|f| f.index)
    }
}

impl Engine {
    /// Execute commands strictly in order, stopping at the first
    /// failure. Effects of commands before the failure stay committed.
    pub fn execute_batch(
        &mut self,
        session_id: SessionId,
        commands: Vec<Command>,
    ) -> EngineResult<BatchReport> {
        self.load_session(session_id)?;
        let total = commands.len();
        let mut results = Vec::with_capacity(total);
        let mut failure = None;
        for (index, command) in commands.into_iter().enumerate() {
            match self.execute(session_id, command) {
                Ok(outcome) => results.push(outcome),
                Err(error) => {
                    failure = Some(BatchFailure { index, error });
                    break;
                }
            }
        }
        debug!(
            session = %session_id,
            total,
            executed = results.len(),
            failed = failure.is_some(),
            "batch executed"
        );
        Ok(BatchReport { results, failure })
    }

    fn execute(&mut self, session_id: SessionId, command: Command) -> EngineResult<CommandOutcome> {
        Ok(match command {
            Command::ModifyHp { delta, reason } => {
                CommandOutcome::Hp(self.modify_hp(session_id, delta, reason.as_deref())?)
            }
            Command::ModifyStat { stat, delta } => {
                CommandOutcome::Stat(self.modify_stat(session_id, &stat, delta)?)
            }
            Command::ModifyScore { delta } => {
                CommandOutcome::Score(self.modify_score(session_id, delta)?)
            }
            Command::MoveTo { location } => {
                CommandOutcome::Moved(self.move_to(session_id, &location)?)
            }
            Command::AddItem {
                name,
                quantity,
                properties,
            } => CommandOutcome::Inventory(self.add_item(session_id, &name, quantity, properties)?),
            Command::RemoveItem { name, quantity } => {
                CommandOutcome::Inventory(self.remove_item(session_id, &name, quantity)?)
            }
            Command::UpdateItem {
                name,
                quantity,
                properties,
            } => CommandOutcome::Inventory(self.update_item(
                session_id,
                &name,
                quantity,
                properties,
            )?),
            Command::UseItem { name } => {
                CommandOutcome::ItemUsed(self.use_item(session_id, &name)?)
            }
            Command::StartQuest {
                id,
                name,
                objectives,
            } => CommandOutcome::Quest(self.start_quest(session_id, &id, &name, objectives)?),
            Command::UpdateQuest {
                id,
                completed_objective,
            } => CommandOutcome::Quest(self.update_quest(session_id, &id, &completed_objective)?),
            Command::CompleteQuest { id, success } => {
                CommandOutcome::Quest(self.complete_quest(session_id, &id, success)?)
            }
            Command::AdjustRelationship { entity_name, delta } => CommandOutcome::Relationship(
                self.adjust_relationship(session_id, &entity_name, delta)?,
            ),
            Command::AdvanceTime { hours } => {
                CommandOutcome::Clock(self.advance_time(session_id, hours)?)
            }
            Command::Transact { delta, reason } => {
                CommandOutcome::Currency(self.transact(session_id, delta, reason.as_deref())?)
            }
            Command::CheckStat { stat, dc, mode } => {
                CommandOutcome::Check(self.check_stat(session_id, &stat, dc, mode)?)
            }
            Command::CheckPlain { modifier, dc, mode } => {
                CommandOutcome::Check(self.check_plain(session_id, modifier, dc, mode)?)
            }
            Command::CreateCharacter { new } => {
                CommandOutcome::Character(self.create_character(session_id, new)?)
            }
            Command::UpdateCharacter { id, patch } => {
                CommandOutcome::Character(self.update_character(id, patch)?)
            }
            Command::DeleteCharacter { id } => CommandOutcome::Deleted {
                existed: self.delete_character(id)?,
            },
            Command::CreateLocation { new } => {
                CommandOutcome::Location(self.create_location(session_id, new)?)
            }
            Command::UpdateLocation { id, patch } => {
                CommandOutcome::Location(self.update_location(id, patch)?)
            }
            Command::DeleteLocation { id } => CommandOutcome::Deleted {
                existed: self.delete_location(id)?,
            },
            Command::CreateItem { new } => {
                CommandOutcome::Item(self.create_item(session_id, new)?)
            }
            Command::UpdateItemEntity { id, patch } => {
                CommandOutcome::Item(self.update_item_entity(id, patch)?)
            }
            Command::DeleteItem { id } => CommandOutcome::Deleted {
                existed: self.delete_item(id)?,
            },
            Command::CreateFaction { new } => {
                CommandOutcome::Faction(self.create_faction(session_id, new)?)
            }
            Command::UpdateFaction { id, patch } => {
                CommandOutcome::Faction(self.update_faction(id, patch)?)
            }
            Command::DeleteFaction { id } => CommandOutcome::Deleted {
                existed: self.delete_faction(id)?,
            },
            Command::CreateStatusEffect { new } => {
                CommandOutcome::StatusEffect(self.create_status_effect(session_id, new)?)
            }
            Command::UpdateStatusEffect { id, patch } => {
                CommandOutcome::StatusEffect(self.update_status_effect(id, patch)?)
            }
            Command::DeleteStatusEffect { id } => CommandOutcome::Deleted {
                existed: self.delete_status_effect(id)?,
            },
            Command::RecordEvent {
                location,
                description,
            } => CommandOutcome::Event(self.record_event(session_id, &location, &description)?),
            Command::AddCharacterMemory {
                character_id,
                content,
            } => CommandOutcome::Memory(self.add_character_memory(character_id, &content)?),
            Command::RecordAction {
                action,
                stat_used,
                check,
                outcome,
                score_change,
            } => CommandOutcome::Action(self.record_action(
                session_id,
                &action,
                stat_used.as_deref(),
                check,
                &outcome,
                score_change,
            )?),
        })
    }
}
