//! Event recording, character memory propagation, and the action log.
//!
//! Recording an event fans its description out to every character
//! standing at the event's location, by exact name match on the
//! location string. Memories are append-only and unbounded at write
//! time; [`Engine::character_memories`] truncates at read time.
//!
//! The action log is a separate append-only trail of what the player
//! did and how it went, one row per narrated action, read back as the
//! session recap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ff_core::{ActionId, Character, EntityId, EventId, EventRecord, Memory, SessionId};
use ff_dice::CheckResult;
use ff_store::RecordKind;

use crate::engine::Engine;
use crate::error::EngineResult;

impl Engine {
    /// Record a narrative event at a location and propagate it as a
    /// memory to every character standing there.
    ///
    /// Witness matching is exact string equality on location names.
    /// Unplaced characters never witness anything.
    pub fn record_event(
        &self,
        session_id: SessionId,
        location: &str,
        description: &str,
    ) -> EngineResult<EventRecorded> {
        self.load_session(session_id)?;
        let event = EventRecord {
            id: EventId::new(),
            session_id,
            location: location.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        self.save_doc(
            RecordKind::Event,
            &event.id.0.to_string(),
            Some(&session_id),
            &event,
        )?;

        let mut witnesses = Vec::new();
        let characters: Vec<Character> = self.load_rows(RecordKind::Character, session_id)?;
        for mut character in characters {
            if character.location.as_deref() != Some(location) {
                continue;
            }
            character.memories.push(Memory {
                content: description.to_string(),
                source_event_id: Some(event.id),
                timestamp: event.created_at,
            });
            self.save_doc(
                RecordKind::Character,
                &character.id.0.to_string(),
                Some(&session_id),
                &character,
            )?;
            witnesses.push(Witness {
                id: character.id,
                name: character.name,
            });
        }

        debug!(session = %session_id, event = %event.id, %location, witnesses = witnesses.len(), "event recorded");
        Ok(EventRecorded {
            event_id: event.id,
            witnesses,
        })
    }

    /// Recorded events for a session, oldest first.
    pub fn list_events(&self, session_id: SessionId) -> EngineResult<Vec<EventRecord>> {
        self.load_session(session_id)?;
        self.load_rows(RecordKind::Event, session_id)
    }

    /// Implant a memory directly into a character, bypassing witness
    /// computation. No event row is written; the memory carries no
    /// source event id.
    pub fn add_character_memory(
        &self,
        character_id: EntityId,
        content: &str,
    ) -> EngineResult<MemoryAdded> {
        let mut character: Character = self.get_character(character_id)?;
        character.memories.push(Memory {
            content: content.to_string(),
            source_event_id: None,
            timestamp: Utc::now(),
        });
        let memory_count = character.memories.len();
        self.save_doc(
            RecordKind::Character,
            &character.id.0.to_string(),
            Some(&character.session_id),
            &character,
        )?;
        Ok(MemoryAdded {
            character_id,
            memory_count,
        })
    }

    /// A character's memories in chronological order, truncated to the
    /// most recent `limit` when one is given. The full history is
    /// always retained on disk.
    pub fn character_memories(
        &self,
        character_id: EntityId,
        limit: Option<usize>,
    ) -> EngineResult<Vec<Memory>> {
        let character: Character = self.get_character(character_id)?;
        let mut memories = character.memories;
        if let Some(limit) = limit {
            let excess = memories.len().saturating_sub(limit);
            memories.drain(..excess);
        }
        Ok(memories)
    }

    /// Append one row to the session's action log: what the player
    /// tried, the check it rode on (if any), how it resolved, and the
    /// score awarded. Record-only; the score itself is applied by a
    /// separate [`Engine::modify_score`] call.
    pub fn record_action(
        &self,
        session_id: SessionId,
        action: &str,
        stat_used: Option<&str>,
        check: Option<CheckResult>,
        outcome: &str,
        score_change: i64,
    ) -> EngineResult<ActionRecord> {
        self.load_session(session_id)?;
        let record = ActionRecord {
            id: ActionId::new(),
            session_id,
            action: action.to_string(),
            stat_used: stat_used.map(str::to_string),
            check,
            outcome: outcome.to_string(),
            score_change,
            created_at: Utc::now(),
        };
        self.save_doc(
            RecordKind::Action,
            &record.id.0.to_string(),
            Some(&session_id),
            &record,
        )?;
        debug!(session = %session_id, action = %record.id, score_change, "action logged");
        Ok(record)
    }

    /// The most recent `limit` action-log rows, in chronological
    /// order. This is the recap the narrator reads back to the player
    /// when a session resumes.
    pub fn action_history(
        &self,
        session_id: SessionId,
        limit: Option<usize>,
    ) -> EngineResult<Vec<ActionRecord>> {
        self.load_session(session_id)?;
        let mut actions: Vec<ActionRecord> = self.load_rows(RecordKind::Action, session_id)?;
        if let Some(limit) = limit {
            let excess = actions.len().saturating_sub(limit);
            actions.drain(..excess);
        }
        Ok(actions)
    }
}

/// One row of the action log: a player action and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Row id.
    pub id: ActionId,
    /// The session the action belongs to.
    pub session_id: SessionId,
    /// What the player attempted, in the narrator's words.
    pub action: String,
    /// The stat the attempt tested, if it called for a check.
    pub stat_used: Option<String>,
    /// Full dice detail of the check, if one was made.
    pub check: Option<CheckResult>,
    /// How the attempt resolved.
    pub outcome: String,
    /// Score delta awarded for the attempt.
    pub score_change: i64,
    /// When the action was logged.
    pub created_at: DateTime<Utc>,
}

/// A character that witnessed a recorded event.
#[derive(Debug, Clone, Serialize)]
pub struct Witness {
    /// The character's id.
    pub id: EntityId,
    /// The character's name.
    pub name: String,
}

/// Outcome of recording an event.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecorded {
    /// Id of the persisted event row.
    pub event_id: EventId,
    /// Characters at the event's location, each now carrying the
    /// event as a memory.
    pub witnesses: Vec<Witness>,
}

/// Outcome of a direct memory implant.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryAdded {
    /// The character the memory was added to.
    pub character_id: EntityId,
    /// Total memories the character now holds.
    pub memory_count: usize,
}
