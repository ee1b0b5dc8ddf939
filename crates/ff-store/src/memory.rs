//! In-memory reference implementation of [`StateStore`].

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::{Document, RecordKind, StateStore, StoreError, StoreResult};

struct Row {
    session_id: Option<String>,
    doc: Document,
    /// Monotonic insertion sequence, fixed at first insert so
    /// replacements keep their original creation order.
    seq: u64,
}

#[derive(Default)]
struct Shelf {
    rows: HashMap<String, Row>,
}

/// A `RwLock`-guarded in-memory store. The whole document is swapped
/// under the write lock, so readers get snapshot-consistent rows.
/// Suitable for tests and single-process embedding.
#[derive(Default)]
pub struct MemoryStore {
    shelves: RwLock<HashMap<RecordKind, Shelf>>,
    next_seq: RwLock<u64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_seq(&self) -> StoreResult<u64> {
        let mut seq = self
            .next_seq
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        *seq += 1;
        Ok(*seq)
    }
}

impl StateStore for MemoryStore {
    fn get(&self, kind: RecordKind, id: &str) -> StoreResult<Option<Document>> {
        let shelves = self
            .shelves
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(shelves
            .get(&kind)
            .and_then(|shelf| shelf.rows.get(id))
            .map(|row| row.doc.clone()))
    }

    fn put(
        &self,
        kind: RecordKind,
        id: &str,
        session_id: Option<&str>,
        doc: Document,
    ) -> StoreResult<()> {
        let seq = self.bump_seq()?;
        let mut shelves = self
            .shelves
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let shelf = shelves.entry(kind).or_default();
        debug!(kind = kind.as_str(), id, "put row");
        match shelf.rows.get_mut(id) {
            // Replacement keeps the original sequence number.
            Some(row) => row.doc = doc,
            None => {
                shelf.rows.insert(
                    id.to_string(),
                    Row {
                        session_id: session_id.map(str::to_string),
                        doc,
                        seq,
                    },
                );
            }
        }
        Ok(())
    }

    fn query(&self, kind: RecordKind, session_id: &str) -> StoreResult<Vec<Document>> {
        let shelves = self
            .shelves
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut rows: Vec<(u64, Document)> = shelves
            .get(&kind)
            .map(|shelf| {
                shelf
                    .rows
                    .values()
                    .filter(|row| row.session_id.as_deref() == Some(session_id))
                    .map(|row| (row.seq, row.doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, doc)| doc).collect())
    }

    fn scan(&self, kind: RecordKind) -> StoreResult<Vec<Document>> {
        let shelves = self
            .shelves
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut rows: Vec<(u64, Document)> = shelves
            .get(&kind)
            .map(|shelf| {
                shelf
                    .rows
                    .values()
                    .map(|row| (row.seq, row.doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, doc)| doc).collect())
    }

    fn delete(&self, kind: RecordKind, id: &str) -> StoreResult<bool> {
        let mut shelves = self
            .shelves
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let removed = shelves
            .get_mut(&kind)
            .is_some_and(|shelf| shelf.rows.remove(id).is_some());
        debug!(kind = kind.as_str(), id, removed, "delete row");
        Ok(removed)
    }

    fn purge_session(&self, session_id: &str) -> StoreResult<usize> {
        let mut shelves = self
            .shelves
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut removed = 0;
        for shelf in shelves.values_mut() {
            let before = shelf.rows.len();
            shelf
                .rows
                .retain(|_, row| row.session_id.as_deref() != Some(session_id));
            removed += before - shelf.rows.len();
        }
        debug!(session_id, removed, "purge session");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Item, "i1", Some("s1"), json!({"name": "rope"}))
            .unwrap();
        let doc = store.get(RecordKind::Item, "i1").unwrap().unwrap();
        assert_eq!(doc["name"], "rope");
        assert!(store.get(RecordKind::Item, "nope").unwrap().is_none());
    }

    #[test]
    fn kinds_are_independent_keyspaces() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Item, "x", Some("s1"), json!({"kind": "item"}))
            .unwrap();
        store
            .put(RecordKind::Character, "x", Some("s1"), json!({"kind": "char"}))
            .unwrap();
        assert_eq!(
            store.get(RecordKind::Item, "x").unwrap().unwrap()["kind"],
            "item"
        );
        assert_eq!(
            store.get(RecordKind::Character, "x").unwrap().unwrap()["kind"],
            "char"
        );
    }

    #[test]
    fn query_filters_by_session_in_creation_order() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Location, "a", Some("s1"), json!({"n": 1}))
            .unwrap();
        store
            .put(RecordKind::Location, "b", Some("s2"), json!({"n": 2}))
            .unwrap();
        store
            .put(RecordKind::Location, "c", Some("s1"), json!({"n": 3}))
            .unwrap();

        let docs = store.query(RecordKind::Location, "s1").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["n"], 1);
        assert_eq!(docs[1]["n"], 3);
    }

    #[test]
    fn replacement_keeps_creation_order() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Location, "a", Some("s1"), json!({"n": 1}))
            .unwrap();
        store
            .put(RecordKind::Location, "b", Some("s1"), json!({"n": 2}))
            .unwrap();
        // Rewrite the older row; it must stay first.
        store
            .put(RecordKind::Location, "a", Some("s1"), json!({"n": 10}))
            .unwrap();

        let docs = store.query(RecordKind::Location, "s1").unwrap();
        assert_eq!(docs[0]["n"], 10);
        assert_eq!(docs[1]["n"], 2);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Faction, "f", Some("s1"), json!({}))
            .unwrap();
        assert!(store.delete(RecordKind::Faction, "f").unwrap());
        assert!(!store.delete(RecordKind::Faction, "f").unwrap());
        assert!(!store.delete(RecordKind::Faction, "never-existed").unwrap());
    }

    #[test]
    fn purge_session_cascades_across_kinds() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Session, "s1", Some("s1"), json!({}))
            .unwrap();
        store
            .put(RecordKind::Player, "s1", Some("s1"), json!({}))
            .unwrap();
        store
            .put(RecordKind::Character, "c1", Some("s1"), json!({}))
            .unwrap();
        store
            .put(RecordKind::Character, "c2", Some("s2"), json!({}))
            .unwrap();

        assert_eq!(store.purge_session("s1").unwrap(), 3);
        assert!(store.get(RecordKind::Player, "s1").unwrap().is_none());
        assert!(store.get(RecordKind::Character, "c2").unwrap().is_some());
    }

    #[test]
    fn scan_returns_unscoped_rows() {
        let store = MemoryStore::new();
        store
            .put(RecordKind::Adventure, "a1", None, json!({"t": "first"}))
            .unwrap();
        store
            .put(RecordKind::Adventure, "a2", None, json!({"t": "second"}))
            .unwrap();
        let docs = store.scan(RecordKind::Adventure).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["t"], "first");
    }
}
