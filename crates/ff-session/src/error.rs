//! Structured errors for engine operations.
//!
//! Every failure crosses the tool-call boundary as data, never as a
//! fault: the transport serializes an [`ErrorPayload`] and the
//! narrator recovers by adjusting its next call. Clamping is not an
//! error — out-of-range deltas are silently corrected and the
//! corrected value reported; only invariant violations (bad stat
//! names, illegal quest transitions, overdrafts) fail.

use serde::Serialize;

use ff_core::QuestStatus;
use ff_store::StoreError;

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors an engine operation can return.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A session, entity, adventure, or quest does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A stat name is not defined by the owning adventure.
    #[error("unknown stat: {0}")]
    UnknownStat(String),

    /// An argument violates an operation's contract, e.g. negative
    /// time advance or an objective not on the quest.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The named item is not in the player's inventory.
    #[error("item not in inventory: {0}")]
    ItemNotFound(String),

    /// The inventory holds fewer than the requested quantity.
    #[error("insufficient quantity of {item}: have {have}, requested {requested}")]
    InsufficientQuantity {
        /// The item name.
        item: String,
        /// How many the player carries.
        have: u32,
        /// How many the caller asked to remove.
        requested: u32,
    },

    /// The transaction would overdraw a no-debt adventure.
    #[error("insufficient funds: balance {balance}, change {change}")]
    InsufficientFunds {
        /// Current balance.
        balance: i64,
        /// The requested change.
        change: i64,
    },

    /// A quest transition outside `not_started -> active -> terminal`.
    #[error("invalid quest transition for {quest}: {from} -> {to}")]
    InvalidQuestTransition {
        /// The quest id.
        quest: String,
        /// Status before the attempted transition.
        from: QuestStatus,
        /// The attempted target status.
        to: QuestStatus,
    },

    /// An adventure or quest with this id already exists.
    #[error("already exists: {0}")]
    Duplicate(String),

    /// The persistence layer failed.
    #[error("storage: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable kind string for the transport layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::UnknownStat(_) => "unknown_stat",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::ItemNotFound(_) => "item_not_found",
            Self::InsufficientQuantity { .. } => "insufficient_quantity",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidQuestTransition { .. } => "invalid_quest_transition",
            Self::Duplicate(_) => "duplicate",
            Self::Store(_) => "store",
        }
    }

    /// The serializable form handed across the tool-call boundary.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// The wire shape of a structured failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Stable error kind, e.g. `unknown_stat`.
    pub kind: &'static str,
    /// Human-readable detail for the narrator to work into the story.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(EngineError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(EngineError::UnknownStat("Luck".into()).kind(), "unknown_stat");
        assert_eq!(
            EngineError::InvalidQuestTransition {
                quest: "q".into(),
                from: QuestStatus::Completed,
                to: QuestStatus::Active,
            }
            .kind(),
            "invalid_quest_transition"
        );
    }

    #[test]
    fn payload_serializes() {
        let payload = EngineError::InsufficientFunds {
            balance: 3,
            change: -5,
        }
        .payload();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "insufficient_funds");
        assert!(json["message"].as_str().unwrap().contains("balance 3"));
    }
}
