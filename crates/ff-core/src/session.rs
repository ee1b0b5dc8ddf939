use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::SessionId;

/// Bookkeeping record for one play-through.
///
/// A session owns exactly one [`crate::PlayerState`] and an arbitrary
/// number of world entities, all of which are deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// The adventure template this session plays.
    pub adventure_id: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last touched by the narrator.
    pub last_played: DateTime<Utc>,
}

impl GameSession {
    /// Create a fresh session record for an adventure.
    pub fn new(adventure_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            adventure_id: adventure_id.into(),
            created_at: now,
            last_played: now,
        }
    }
}

/// A narrative recap saved at the end of a sitting, used for story
/// continuity when the player returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique summary identifier.
    pub id: Uuid,
    /// The summarized session.
    pub session_id: SessionId,
    /// Concise narrative summary, a few sentences.
    pub summary: String,
    /// Important story beats.
    pub key_events: Vec<String>,
    /// Notable character developments.
    pub character_changes: Vec<String>,
    /// When the summary was written.
    pub created_at: DateTime<Utc>,
}
