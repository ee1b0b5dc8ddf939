//! The engine: store capability, adventure registry, and session
//! lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use ff_core::{
    AdventureDefinition, Faction, GameSession, PlayerState, SessionId, SessionSummary,
};
use ff_dice::roll_stat_block;
use ff_lexicon::resolve_template;
use ff_store::{RecordKind, StateStore};

use crate::config::{EngineConfig, StartOptions, StatMethod};
use crate::error::{EngineError, EngineResult};

/// The session engine.
///
/// Holds the persistence capability it was constructed with (explicit
/// injection, no process-wide handles) and one RNG that all dice and
/// template draws flow through. Operations take a session id plus
/// typed arguments; single-session calls are issued one at a time by
/// the narrator, so the engine performs no internal locking — the
/// store's atomic row replacement covers concurrent readers.
pub struct Engine {
    store: Arc<dyn StateStore>,
    rng: StdRng,
}

impl Engine {
    /// Construct an engine over a store.
    pub fn new(store: Arc<dyn StateStore>, config: EngineConfig) -> Self {
        Self {
            store,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // -----------------------------------------------------------------------
    // Typed row helpers
    // -----------------------------------------------------------------------

    pub(crate) fn load_doc<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> EngineResult<Option<T>> {
        match self.store.get(kind, id)? {
            Some(doc) => Ok(Some(
                serde_json::from_value(doc).map_err(ff_store::StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    pub(crate) fn save_doc<T: Serialize>(
        &self,
        kind: RecordKind,
        id: &str,
        session_id: Option<&SessionId>,
        value: &T,
    ) -> EngineResult<()> {
        let doc = serde_json::to_value(value).map_err(ff_store::StoreError::from)?;
        let session_key = session_id.map(|s| s.0.to_string());
        self.store.put(kind, id, session_key.as_deref(), doc)?;
        Ok(())
    }

    pub(crate) fn load_rows<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        session_id: SessionId,
    ) -> EngineResult<Vec<T>> {
        let docs = self.store.query(kind, &session_id.0.to_string())?;
        docs.into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| EngineError::Store(ff_store::StoreError::from(e)))
            })
            .collect()
    }

    pub(crate) fn store_delete(&self, kind: RecordKind, id: &str) -> EngineResult<bool> {
        Ok(self.store.delete(kind, id)?)
    }

    pub(crate) fn load_session(&self, session_id: SessionId) -> EngineResult<GameSession> {
        self.load_doc(RecordKind::Session, &session_id.0.to_string())?
            .ok_or_else(|| EngineError::NotFound(format!("session {session_id}")))
    }

    pub(crate) fn load_player(&self, session_id: SessionId) -> EngineResult<PlayerState> {
        self.load_doc(RecordKind::Player, &session_id.0.to_string())?
            .ok_or_else(|| EngineError::NotFound(format!("player state for session {session_id}")))
    }

    pub(crate) fn save_player(&self, state: &PlayerState) -> EngineResult<()> {
        // One atomic row replace: no tool call ever observes a
        // half-applied mutation.
        self.save_doc(
            RecordKind::Player,
            &state.session_id.0.to_string(),
            Some(&state.session_id),
            state,
        )
    }

    pub(crate) fn adventure_for(&self, session_id: SessionId) -> EngineResult<AdventureDefinition> {
        let session = self.load_session(session_id)?;
        self.adventure(&session.adventure_id)
    }

    // -----------------------------------------------------------------------
    // Adventure registry
    // -----------------------------------------------------------------------

    /// Register an adventure template. Fails on a duplicate id; the
    /// definition is read-only once installed.
    pub fn install_adventure(&self, adventure: &AdventureDefinition) -> EngineResult<()> {
        if self
            .store
            .get(RecordKind::Adventure, &adventure.id)?
            .is_some()
        {
            return Err(EngineError::Duplicate(format!(
                "adventure {}",
                adventure.id
            )));
        }
        self.save_doc(RecordKind::Adventure, &adventure.id, None, adventure)?;
        info!(adventure = %adventure.id, "installed adventure");
        Ok(())
    }

    /// Fetch an adventure template by id.
    pub fn adventure(&self, adventure_id: &str) -> EngineResult<AdventureDefinition> {
        self.load_doc(RecordKind::Adventure, adventure_id)?
            .ok_or_else(|| EngineError::NotFound(format!("adventure {adventure_id}")))
    }

    /// Digest of every installed adventure, in installation order.
    pub fn list_adventures(&self) -> EngineResult<Vec<AdventureDigest>> {
        let docs = self.store.scan(RecordKind::Adventure)?;
        docs.into_iter()
            .map(|doc| {
                let adv: AdventureDefinition =
                    serde_json::from_value(doc).map_err(ff_store::StoreError::from)?;
                Ok(AdventureDigest {
                    id: adv.id,
                    title: adv.title,
                    description: adv.description,
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Start a new session of an adventure.
    ///
    /// Creates the session row and the one-and-only player record,
    /// seeds the adventure's factions, and resolves `{list}` templates
    /// in the opening content when randomization is on.
    pub fn start_adventure(
        &mut self,
        adventure_id: &str,
        options: StartOptions,
    ) -> EngineResult<StartReport> {
        let adventure = self.adventure(adventure_id)?;
        let session = GameSession::new(adventure_id);
        let mut player = PlayerState::initial(session.id, &adventure);

        match options.stats {
            StatMethod::Defaults => {}
            StatMethod::Rolled => {
                player.stats = roll_stat_block(&adventure.stats, &mut self.rng);
            }
            StatMethod::Custom(custom) => {
                for (name, value) in custom {
                    let def = adventure
                        .stat(&name)
                        .ok_or_else(|| EngineError::UnknownStat(name.clone()))?;
                    player.stats.insert(name, def.clamp(value));
                }
            }
        }

        if let Some(name) = &options.character_name {
            player
                .custom_data
                .insert("character_name".to_string(), name.as_str().into());
        }

        let (location, story) = if options.randomize_initial {
            (
                resolve_template(&adventure.initial_location, &adventure.word_lists, &mut self.rng),
                resolve_template(&adventure.initial_story, &adventure.word_lists, &mut self.rng),
            )
        } else {
            (
                adventure.initial_location.clone(),
                adventure.initial_story.clone(),
            )
        };
        player.location = location.clone();

        self.save_doc(
            RecordKind::Session,
            &session.id.0.to_string(),
            Some(&session.id),
            &session,
        )?;
        self.save_player(&player)?;

        for def in &adventure.factions {
            let faction = Faction {
                id: ff_core::EntityId::new(),
                session_id: session.id,
                name: def.name.clone(),
                description: def.description.clone(),
                reputation: def.initial_reputation,
                properties: ff_core::Props::new(),
                created_at: Utc::now(),
            };
            self.save_doc(
                RecordKind::Faction,
                &faction.id.0.to_string(),
                Some(&session.id),
                &faction,
            )?;
        }

        info!(session = %session.id, adventure = adventure_id, "started adventure");
        Ok(StartReport {
            session_id: session.id,
            title: adventure.title,
            location,
            story,
            stats: player.stats.clone(),
            hp: player.hp,
            max_hp: player.max_hp,
            score: player.score,
            character_name: options.character_name,
        })
    }

    /// Resume an existing session: touch `last_played` and return the
    /// state digest the narrator needs to pick the story back up.
    pub fn resume(&self, session_id: SessionId) -> EngineResult<ResumeReport> {
        let mut session = self.load_session(session_id)?;
        let adventure = self.adventure(&session.adventure_id)?;
        let player = self.load_player(session_id)?;

        session.last_played = Utc::now();
        self.save_doc(
            RecordKind::Session,
            &session.id.0.to_string(),
            Some(&session.id),
            &session,
        )?;

        Ok(ResumeReport {
            session_id,
            title: adventure.title,
            location: player.location,
            stats: player.stats,
            score: player.score,
            hp: player.hp,
            created_at: session.created_at,
            last_played: session.last_played,
        })
    }

    /// Recent sessions, most recently played first.
    pub fn sessions(&self, limit: usize) -> EngineResult<Vec<SessionDigest>> {
        let docs = self.store.scan(RecordKind::Session)?;
        let mut digests = Vec::with_capacity(docs.len());
        for doc in docs {
            let session: GameSession =
                serde_json::from_value(doc).map_err(ff_store::StoreError::from)?;
            let title = self
                .adventure(&session.adventure_id)
                .map(|a| a.title)
                .unwrap_or_else(|_| session.adventure_id.clone());
            let player = self.load_player(session.id)?;
            digests.push(SessionDigest {
                id: session.id,
                adventure_id: session.adventure_id,
                title,
                last_played: session.last_played,
                location: player.location,
                score: player.score,
            });
        }
        digests.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        digests.truncate(limit);
        Ok(digests)
    }

    /// The full player record for a session.
    pub fn player_state(&self, session_id: SessionId) -> EngineResult<PlayerState> {
        self.load_player(session_id)
    }

    /// Delete a session and everything it owns: player state, world
    /// entities, events, summaries. Idempotent; returns whether any
    /// rows existed.
    pub fn delete_session(&self, session_id: SessionId) -> EngineResult<bool> {
        let removed = self.store.purge_session(&session_id.0.to_string())?;
        info!(session = %session_id, rows = removed, "deleted session");
        Ok(removed > 0)
    }

    /// Save a narrative recap for story continuity across sittings.
    pub fn summarize(
        &self,
        session_id: SessionId,
        summary: &str,
        key_events: Vec<String>,
        character_changes: Vec<String>,
    ) -> EngineResult<SessionSummary> {
        self.load_session(session_id)?;
        let record = SessionSummary {
            id: Uuid::new_v4(),
            session_id,
            summary: summary.to_string(),
            key_events,
            character_changes,
            created_at: Utc::now(),
        };
        self.save_doc(
            RecordKind::Summary,
            &record.id.to_string(),
            Some(&session_id),
            &record,
        )?;
        Ok(record)
    }

    /// All recaps for a session in chronological order.
    pub fn summaries(&self, session_id: SessionId) -> EngineResult<Vec<SessionSummary>> {
        self.load_session(session_id)?;
        self.load_rows(RecordKind::Summary, session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StartOptions, StatMethod};
    use crate::error::EngineError;
    use ff_core::{StatDefinition, WordList};
    use ff_store::MemoryStore;

    fn adventure() -> AdventureDefinition {
        let mut categories = HashMap::new();
        categories.insert(
            "metal".to_string(),
            vec!["chrome".to_string(), "cobalt".to_string()],
        );
        serde_json::from_value(serde_json::json!({
            "id": "rustwreck",
            "title": "Rustwreck",
            "description": "Salvage runs on a derelict station",
            "prompt": "You narrate a salvage adventure.",
            "stats": [],
            "initial_location": "The {colors.metal} Docking Bay",
            "initial_story": "The airlock hisses open.",
            "factions": [
                { "id": "guild", "name": "Salvage Guild", "description": "", "initial_reputation": 10 }
            ]
        }))
        .map(|mut adv: AdventureDefinition| {
            adv.stats = vec![StatDefinition::new("Strength", "muscle")];
            adv.word_lists = vec![WordList {
                name: "colors".to_string(),
                description: String::new(),
                categories,
            }];
            adv
        })
        .unwrap()
    }

    fn engine() -> Engine {
        let engine = Engine::new(
            Arc::new(MemoryStore::new()),
            EngineConfig::default().with_seed(3),
        );
        engine.install_adventure(&adventure()).unwrap();
        engine
    }

    #[test]
    fn install_rejects_duplicate_id() {
        let engine = engine();
        let err = engine.install_adventure(&adventure()).unwrap_err();
        assert_eq!(err.kind(), "duplicate");
        assert_eq!(engine.list_adventures().unwrap().len(), 1);
    }

    #[test]
    fn start_resolves_templates_and_seeds_factions() {
        let mut engine = engine();
        let report = engine
            .start_adventure("rustwreck", StartOptions::default())
            .unwrap();
        assert!(
            report.location == "The chrome Docking Bay"
                || report.location == "The cobalt Docking Bay",
            "unresolved location: {}",
            report.location
        );
        assert_eq!(report.stats["Strength"], 10);
        assert_eq!(report.hp, 10);

        let factions = engine.list_factions(report.session_id).unwrap();
        assert_eq!(factions.len(), 1);
        assert_eq!(factions[0].name, "Salvage Guild");
        assert_eq!(factions[0].reputation, 10);
    }

    #[test]
    fn start_without_randomization_keeps_templates_verbatim() {
        let mut engine = engine();
        let report = engine
            .start_adventure(
                "rustwreck",
                StartOptions {
                    randomize_initial: false,
                    ..StartOptions::default()
                },
            )
            .unwrap();
        assert_eq!(report.location, "The {colors.metal} Docking Bay");
    }

    #[test]
    fn custom_stats_are_clamped_and_unknown_names_rejected() {
        let mut engine = engine();
        let mut stats = HashMap::new();
        stats.insert("Strength".to_string(), 99);
        let report = engine
            .start_adventure(
                "rustwreck",
                StartOptions {
                    stats: StatMethod::Custom(stats),
                    ..StartOptions::default()
                },
            )
            .unwrap();
        assert_eq!(report.stats["Strength"], 20);

        let mut bogus = HashMap::new();
        bogus.insert("Luck".to_string(), 12);
        let err = engine
            .start_adventure(
                "rustwreck",
                StartOptions {
                    stats: StatMethod::Custom(bogus),
                    ..StartOptions::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownStat(name) if name == "Luck"));
    }

    #[test]
    fn sessions_list_most_recent_first() {
        let mut engine = engine();
        let first = engine
            .start_adventure("rustwreck", StartOptions::default())
            .unwrap();
        let second = engine
            .start_adventure("rustwreck", StartOptions::default())
            .unwrap();

        // Resuming the older session bumps it to the front.
        engine.resume(first.session_id).unwrap();
        let digests = engine.sessions(10).unwrap();
        assert_eq!(digests[0].id, first.session_id);
        assert_eq!(digests[1].id, second.session_id);

        assert_eq!(engine.sessions(1).unwrap().len(), 1);
    }

    #[test]
    fn delete_session_cascades_and_is_idempotent() {
        let mut engine = engine();
        let report = engine
            .start_adventure("rustwreck", StartOptions::default())
            .unwrap();
        let session = report.session_id;
        engine
            .create_character(
                session,
                crate::world::NewCharacter {
                    name: "Vex".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(engine.delete_session(session).unwrap());
        assert!(matches!(
            engine.player_state(session),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            engine.list_characters(session, None),
            Err(EngineError::NotFound(_))
        ));
        assert!(!engine.delete_session(session).unwrap());
    }

    #[test]
    fn summaries_accumulate_in_order() {
        let mut engine = engine();
        let session = engine
            .start_adventure("rustwreck", StartOptions::default())
            .unwrap()
            .session_id;
        engine
            .summarize(session, "Docked and bartered.", vec!["docked".into()], vec![])
            .unwrap();
        engine
            .summarize(session, "Fought the guild.", vec![], vec!["scarred".into()])
            .unwrap();

        let summaries = engine.summaries(session).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].summary, "Docked and bartered.");
        assert_eq!(summaries[1].character_changes, vec!["scarred".to_string()]);
    }

    #[test]
    fn unknown_session_is_not_found() {
        let engine = engine();
        let err = engine.resume(SessionId::new()).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}

/// Listing entry for an installed adventure.
#[derive(Debug, Clone, Serialize)]
pub struct AdventureDigest {
    /// Adventure id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short blurb.
    pub description: String,
}

/// Everything the narrator needs to open a fresh session.
#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    /// The new session's id.
    pub session_id: SessionId,
    /// Adventure title.
    pub title: String,
    /// Opening location, templates resolved.
    pub location: String,
    /// Opening story text, templates resolved.
    pub story: String,
    /// The character's starting stats.
    pub stats: HashMap<String, i64>,
    /// Starting hit points.
    pub hp: i64,
    /// Hit point ceiling.
    pub max_hp: i64,
    /// Starting score.
    pub score: i64,
    /// The character's name, if one was given.
    pub character_name: Option<String>,
}

/// State digest returned when resuming a session.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeReport {
    /// The session id.
    pub session_id: SessionId,
    /// Adventure title.
    pub title: String,
    /// Current location.
    pub location: String,
    /// Current stats.
    pub stats: HashMap<String, i64>,
    /// Current score.
    pub score: i64,
    /// Current hit points.
    pub hp: i64,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last touched (just now).
    pub last_played: DateTime<Utc>,
}

/// Listing entry for a recent session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDigest {
    /// The session id.
    pub id: SessionId,
    /// The adventure it plays.
    pub adventure_id: String,
    /// The adventure's title.
    pub title: String,
    /// When the session was last touched.
    pub last_played: DateTime<Utc>,
    /// The player's current location.
    pub location: String,
    /// The player's current score.
    pub score: i64,
}
