//! Persistence boundary for the session engine.
//!
//! The engine needs a row store, not a database: get/put/query/delete
//! of opaque JSON documents, scoped by session. Every write replaces a
//! whole row atomically, never a field at a time, so a concurrent
//! reader (the narrator's next call, or a dashboard) observes either
//! the old document or the new one, never a half-written blob.
//! Field-level schema validation is the engine's job, not the store's.

/// The in-memory reference store.
pub mod memory;

/// Re-export the in-memory store.
pub use memory::MemoryStore;

use serde_json::Value;

/// A persisted row: an opaque JSON-serializable document.
pub type Document = Value;

/// The kinds of rows the engine persists. Each kind is an independent
/// keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// An adventure template. Not session-scoped.
    Adventure,
    /// A session bookkeeping row.
    Session,
    /// The one player-state row of a session, keyed by session id.
    Player,
    /// A character entity.
    Character,
    /// A location entity.
    Location,
    /// An item entity.
    Item,
    /// A faction entity.
    Faction,
    /// A status effect entity.
    StatusEffect,
    /// A recorded narrative event.
    Event,
    /// A logged player action and its outcome.
    Action,
    /// A session summary.
    Summary,
}

impl RecordKind {
    /// Stable name used in logs and store keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Session => "session",
            Self::Player => "player",
            Self::Character => "character",
            Self::Location => "location",
            Self::Item => "item",
            Self::Faction => "faction",
            Self::StatusEffect => "status_effect",
            Self::Event => "event",
            Self::Action => "action",
            Self::Summary => "summary",
        }
    }
}

/// Errors surfaced by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document could not be encoded or decoded.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing medium failed.
    #[error("backend: {0}")]
    Backend(String),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The row-store capability the engine is constructed with.
///
/// Implementations must make `put` a single atomic row replacement and
/// must return `query` results in creation (first-insertion) order;
/// the engine relies on that order for deterministic listings and
/// "oldest entity is the root" logic.
pub trait StateStore: Send + Sync {
    /// Fetch a row by kind and id.
    fn get(&self, kind: RecordKind, id: &str) -> StoreResult<Option<Document>>;

    /// Insert or replace a row. `session_id` is `None` only for rows
    /// that are not session-scoped (adventure templates).
    fn put(
        &self,
        kind: RecordKind,
        id: &str,
        session_id: Option<&str>,
        doc: Document,
    ) -> StoreResult<()>;

    /// All rows of a kind belonging to a session, in creation order.
    fn query(&self, kind: RecordKind, session_id: &str) -> StoreResult<Vec<Document>>;

    /// All rows of a kind regardless of session, in creation order.
    fn scan(&self, kind: RecordKind) -> StoreResult<Vec<Document>>;

    /// Delete a row. Idempotent: deleting an absent id returns
    /// `Ok(false)`, not an error.
    fn delete(&self, kind: RecordKind, id: &str) -> StoreResult<bool>;

    /// Delete every row belonging to a session, across all kinds.
    /// Returns how many rows were removed.
    fn purge_session(&self, session_id: &str) -> StoreResult<usize>;
}
