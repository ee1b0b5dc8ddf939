//! The player state machine.
//!
//! Every operation here is one validated read-modify-write: load the
//! player row, check the invariant, mutate, persist with a single
//! atomic put. Out-of-range deltas are clamped and the applied value
//! reported; only invariant violations return errors.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use ff_core::{InventoryItem, Props, Quest, QuestStatus, SessionId, StatusEffect, merge_props};
use ff_dice::{CheckResult, RollMode, check_with_modifier, stat_modifier};
use ff_lexicon::{random_word, resolve_template, word_prompt};
use ff_store::RecordKind;

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};

impl Engine {
    /// Apply a hit point delta, clamped to `[0, max_hp]`. Reaching 0
    /// is reported, never acted on; the narrator decides what dying
    /// means.
    pub fn modify_hp(
        &self,
        session_id: SessionId,
        delta: i64,
        reason: Option<&str>,
    ) -> EngineResult<HpChange> {
        let mut player = self.load_player(session_id)?;
        let old = player.hp;
        player.hp = (player.hp + delta).clamp(0, player.max_hp);
        self.save_player(&player)?;
        debug!(session = %session_id, old, new = player.hp, reason, "hp changed");
        Ok(HpChange {
            hp: player.hp,
            max_hp: player.max_hp,
            change: player.hp - old,
        })
    }

    /// Apply a stat delta, clamped to the stat's adventure-defined
    /// bounds. Unknown stat names are rejected.
    pub fn modify_stat(
        &self,
        session_id: SessionId,
        stat: &str,
        delta: i64,
    ) -> EngineResult<StatChange> {
        let adventure = self.adventure_for(session_id)?;
        let def = adventure
            .stat(stat)
            .ok_or_else(|| EngineError::UnknownStat(stat.to_string()))?;
        let mut player = self.load_player(session_id)?;
        let old = player.stats.get(stat).copied().unwrap_or(def.default_value);
        let new = def.clamp(old + delta);
        player.stats.insert(stat.to_string(), new);
        self.save_player(&player)?;
        Ok(StatChange {
            stat: stat.to_string(),
            old_value: old,
            new_value: new,
            requested: delta,
            applied: new - old,
        })
    }

    /// Apply a score delta. Unclamped; may go negative.
    pub fn modify_score(&self, session_id: SessionId, delta: i64) -> EngineResult<ScoreChange> {
        let mut player = self.load_player(session_id)?;
        player.score += delta;
        self.save_player(&player)?;
        Ok(ScoreChange {
            score: player.score,
            change: delta,
        })
    }

    /// Move the player. The destination is free text; it does not have
    /// to name a Location entity.
    pub fn move_to(&self, session_id: SessionId, location: &str) -> EngineResult<Moved> {
        let mut player = self.load_player(session_id)?;
        let from = std::mem::replace(&mut player.location, location.to_string());
        self.save_player(&player)?;
        debug!(session = %session_id, %from, to = location, "player moved");
        Ok(Moved {
            from,
            location: location.to_string(),
        })
    }

    /// Add items to the inventory, merging by name.
    pub fn add_item(
        &self,
        session_id: SessionId,
        name: &str,
        quantity: u32,
        properties: Props,
    ) -> EngineResult<InventoryChange> {
        if quantity == 0 {
            return Err(EngineError::InvalidArgument(
                "quantity must be at least 1".to_string(),
            ));
        }
        let mut player = self.load_player(session_id)?;
        let total = match player.item_mut(name) {
            Some(entry) => {
                entry.quantity += quantity;
                merge_props(&mut entry.properties, properties);
                entry.quantity
            }
            None => {
                player.inventory.push(InventoryItem {
                    name: name.to_string(),
                    quantity,
                    properties,
                });
                quantity
            }
        };
        self.save_player(&player)?;
        Ok(InventoryChange {
            name: name.to_string(),
            quantity: total,
        })
    }

    /// Remove items from the inventory. The entry is dropped when its
    /// quantity reaches zero.
    pub fn remove_item(
        &self,
        session_id: SessionId,
        name: &str,
        quantity: u32,
    ) -> EngineResult<InventoryChange> {
        let mut player = self.load_player(session_id)?;
        let have = player
            .item(name)
            .map(|i| i.quantity)
            .ok_or_else(|| EngineError::ItemNotFound(name.to_string()))?;
        if have < quantity {
            return Err(EngineError::InsufficientQuantity {
                item: name.to_string(),
                have,
                requested: quantity,
            });
        }
        let remaining = have - quantity;
        if remaining == 0 {
            player.inventory.retain(|i| i.name != name);
        } else if let Some(entry) = player.item_mut(name) {
            entry.quantity = remaining;
        }
        self.save_player(&player)?;
        Ok(InventoryChange {
            name: name.to_string(),
            quantity: remaining,
        })
    }

    /// Patch an inventory entry: replace the quantity if given, merge
    /// any properties. Use [`Engine::remove_item`] to drop an entry;
    /// a zero quantity here is rejected.
    pub fn update_item(
        &self,
        session_id: SessionId,
        name: &str,
        quantity: Option<u32>,
        properties: Props,
    ) -> EngineResult<InventoryChange> {
        if quantity == Some(0) {
            return Err(EngineError::InvalidArgument(
                "use remove_item to drop an inventory entry".to_string(),
            ));
        }
        let mut player = self.load_player(session_id)?;
        let entry = player
            .item_mut(name)
            .ok_or_else(|| EngineError::ItemNotFound(name.to_string()))?;
        if let Some(q) = quantity {
            entry.quantity = q;
        }
        merge_props(&mut entry.properties, properties);
        let total = entry.quantity;
        self.save_player(&player)?;
        Ok(InventoryChange {
            name: name.to_string(),
            quantity: total,
        })
    }

    /// Use an item. Consumable items (the default) lose one from the
    /// stack; items marked `consumable: false` are reported used but
    /// not consumed.
    pub fn use_item(&self, session_id: SessionId, name: &str) -> EngineResult<ItemUsed> {
        let mut player = self.load_player(session_id)?;
        let (consumed, have) = {
            let entry = player
                .item(name)
                .ok_or_else(|| EngineError::ItemNotFound(name.to_string()))?;
            (entry.is_consumable(), entry.quantity)
        };
        let remaining = if consumed {
            let left = have - 1;
            if left == 0 {
                player.inventory.retain(|i| i.name != name);
            } else if let Some(entry) = player.item_mut(name) {
                entry.quantity = left;
            }
            left
        } else {
            have
        };
        self.save_player(&player)?;
        Ok(ItemUsed {
            name: name.to_string(),
            consumed,
            remaining,
        })
    }

    /// Start a quest. Creates it as `Active` if the player has never
    /// seen it; an already-known quest must be `NotStarted`.
    pub fn start_quest(
        &self,
        session_id: SessionId,
        id: &str,
        name: &str,
        objectives: Vec<String>,
    ) -> EngineResult<Quest> {
        let mut player = self.load_player(session_id)?;
        let quest = match player.quest_mut(id) {
            Some(quest) => {
                if !quest.status.can_transition_to(QuestStatus::Active) {
                    return Err(EngineError::InvalidQuestTransition {
                        quest: id.to_string(),
                        from: quest.status,
                        to: QuestStatus::Active,
                    });
                }
                quest.status = QuestStatus::Active;
                quest.clone()
            }
            None => {
                let quest = Quest {
                    id: id.to_string(),
                    name: name.to_string(),
                    status: QuestStatus::Active,
                    objectives,
                    completed_objectives: Vec::new(),
                };
                player.quests.push(quest.clone());
                quest
            }
        };
        self.save_player(&player)?;
        debug!(session = %session_id, quest = id, "quest started");
        Ok(quest)
    }

    /// Tick off an objective on an active quest. The objective must be
    /// one the quest declares; ticking it twice is a no-op.
    pub fn update_quest(
        &self,
        session_id: SessionId,
        id: &str,
        completed_objective: &str,
    ) -> EngineResult<Quest> {
        let mut player = self.load_player(session_id)?;
        let quest = player
            .quest_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("quest {id}")))?;
        if quest.status != QuestStatus::Active {
            return Err(EngineError::InvalidArgument(format!(
                "quest {id} is {}, not active",
                quest.status
            )));
        }
        if !quest.objectives.iter().any(|o| o == completed_objective) {
            return Err(EngineError::InvalidArgument(format!(
                "quest {id} has no objective \"{completed_objective}\""
            )));
        }
        if !quest
            .completed_objectives
            .iter()
            .any(|o| o == completed_objective)
        {
            quest
                .completed_objectives
                .push(completed_objective.to_string());
        }
        let snapshot = quest.clone();
        self.save_player(&player)?;
        Ok(snapshot)
    }

    /// Close an active quest in success or failure. Terminal states
    /// admit nothing further.
    pub fn complete_quest(
        &self,
        session_id: SessionId,
        id: &str,
        success: bool,
    ) -> EngineResult<Quest> {
        let target = if success {
            QuestStatus::Completed
        } else {
            QuestStatus::Failed
        };
        let mut player = self.load_player(session_id)?;
        let quest = player
            .quest_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("quest {id}")))?;
        if !quest.status.can_transition_to(target) {
            return Err(EngineError::InvalidQuestTransition {
                quest: id.to_string(),
                from: quest.status,
                to: target,
            });
        }
        quest.status = target;
        let snapshot = quest.clone();
        self.save_player(&player)?;
        debug!(session = %session_id, quest = id, status = %target, "quest closed");
        Ok(snapshot)
    }

    /// Adjust the player's standing with a named entity. Unbounded;
    /// conventions are the adventure's business.
    pub fn adjust_relationship(
        &self,
        session_id: SessionId,
        entity_name: &str,
        delta: i64,
    ) -> EngineResult<RelationshipChange> {
        let mut player = self.load_player(session_id)?;
        let reputation = player
            .relationships
            .entry(entity_name.to_string())
            .or_insert(0);
        *reputation += delta;
        let reputation = *reputation;
        self.save_player(&player)?;
        Ok(RelationshipChange {
            entity_name: entity_name.to_string(),
            reputation,
        })
    }

    /// Advance the in-game clock. Each call also ticks every status
    /// effect down by one; effects that hit zero are removed and
    /// reported so the narrator can describe them wearing off.
    pub fn advance_time(&self, session_id: SessionId, hours: i64) -> EngineResult<ClockChange> {
        let hours: u32 = hours
            .try_into()
            .map_err(|_| {
                EngineError::InvalidArgument(format!(
                    "hours must be between 0 and {}",
                    u32::MAX
                ))
            })?;
        let mut player = self.load_player(session_id)?;
        let days_passed = player.advance_clock(hours);
        self.save_player(&player)?;

        let mut expired_effects = Vec::new();
        let effects: Vec<StatusEffect> = self.load_rows(RecordKind::StatusEffect, session_id)?;
        for mut effect in effects {
            effect.duration -= 1;
            if effect.is_expired() {
                self.store_delete(RecordKind::StatusEffect, &effect.id.0.to_string())?;
                expired_effects.push(effect.name);
            } else {
                self.save_doc(
                    RecordKind::StatusEffect,
                    &effect.id.0.to_string(),
                    Some(&session_id),
                    &effect,
                )?;
            }
        }

        Ok(ClockChange {
            game_time: player.game_time,
            game_day: player.game_day,
            days_passed,
            expired_effects,
        })
    }

    /// Apply a currency delta. Overdraft is refused unless the
    /// adventure allows debt.
    pub fn transact(
        &self,
        session_id: SessionId,
        delta: i64,
        reason: Option<&str>,
    ) -> EngineResult<CurrencyChange> {
        let adventure = self.adventure_for(session_id)?;
        let mut player = self.load_player(session_id)?;
        let balance = player.currency + delta;
        if balance < 0 && !adventure.currency_config.allow_debt {
            return Err(EngineError::InsufficientFunds {
                balance: player.currency,
                change: delta,
            });
        }
        player.currency = balance;
        self.save_player(&player)?;
        debug!(session = %session_id, balance, delta, reason, "currency changed");
        Ok(CurrencyChange {
            currency: balance,
            change: delta,
        })
    }

    /// Roll a d20 check against a player stat, status-effect modifiers
    /// included. Purely computational; nothing is persisted.
    pub fn check_stat(
        &mut self,
        session_id: SessionId,
        stat: &str,
        dc: i64,
        mode: RollMode,
    ) -> EngineResult<CheckResult> {
        let stats = self.effective_stats(session_id)?;
        let value = *stats
            .get(stat)
            .ok_or_else(|| EngineError::UnknownStat(stat.to_string()))?;
        Ok(check_with_modifier(
            stat_modifier(value),
            dc,
            mode,
            self.rng_mut(),
        ))
    }

    /// Roll a plain d20 check with an explicit modifier.
    pub fn check_plain(
        &mut self,
        session_id: SessionId,
        modifier: i64,
        dc: i64,
        mode: RollMode,
    ) -> EngineResult<CheckResult> {
        self.load_session(session_id)?;
        Ok(check_with_modifier(modifier, dc, mode, self.rng_mut()))
    }

    /// Base stats with active status-effect modifiers applied
    /// transiently. Modifiers on stats the player does not have are
    /// ignored; the persisted stat map is never touched.
    pub fn effective_stats(&self, session_id: SessionId) -> EngineResult<HashMap<String, i64>> {
        let mut stats = self.load_player(session_id)?.stats;
        let effects: Vec<StatusEffect> = self.load_rows(RecordKind::StatusEffect, session_id)?;
        for effect in effects.iter().filter(|e| !e.is_expired()) {
            for (stat, delta) in &effect.stat_modifiers {
                if let Some(value) = stats.get_mut(stat) {
                    *value += delta;
                }
            }
        }
        Ok(stats)
    }

    /// Draw a random word from one of the adventure's word lists.
    /// Returns the word, or a generation prompt for the narrator when
    /// the list or category has nothing to offer.
    pub fn random_word(
        &mut self,
        session_id: SessionId,
        list_name: &str,
        category: Option<&str>,
        context: Option<&str>,
    ) -> EngineResult<WordDraw> {
        let adventure = self.adventure_for(session_id)?;
        match random_word(&adventure.word_lists, list_name, category, self.rng_mut()) {
            Some(word) => Ok(WordDraw {
                word: Some(word.to_string()),
                prompt: None,
            }),
            None => Ok(WordDraw {
                word: None,
                prompt: Some(word_prompt(list_name, category, context)),
            }),
        }
    }

    /// Resolve `{list}` / `{list.category}` tokens in a piece of text
    /// against the session's adventure word lists.
    pub fn resolve_text(&mut self, session_id: SessionId, text: &str) -> EngineResult<String> {
        let adventure = self.adventure_for(session_id)?;
        Ok(resolve_template(
            text,
            &adventure.word_lists,
            self.rng_mut(),
        ))
    }
}

/// Outcome of a hit point change.
#[derive(Debug, Clone, Serialize)]
pub struct HpChange {
    /// Hit points after the change.
    pub hp: i64,
    /// Hit point ceiling.
    pub max_hp: i64,
    /// The delta actually applied, after clamping.
    pub change: i64,
}

/// Outcome of a stat change.
#[derive(Debug, Clone, Serialize)]
pub struct StatChange {
    /// The stat name.
    pub stat: String,
    /// Value before.
    pub old_value: i64,
    /// Value after, within the stat's bounds.
    pub new_value: i64,
    /// The delta the caller asked for.
    pub requested: i64,
    /// The delta actually applied, after clamping.
    pub applied: i64,
}

/// Outcome of a score change.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreChange {
    /// Score after the change.
    pub score: i64,
    /// The delta applied.
    pub change: i64,
}

/// Outcome of a player move.
#[derive(Debug, Clone, Serialize)]
pub struct Moved {
    /// Where the player was.
    pub from: String,
    /// Where the player is now.
    pub location: String,
}

/// Outcome of an inventory mutation.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryChange {
    /// The item name.
    pub name: String,
    /// Quantity now carried. Zero means the entry was removed.
    pub quantity: u32,
}

/// Outcome of using an item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemUsed {
    /// The item name.
    pub name: String,
    /// Whether one was consumed from the stack.
    pub consumed: bool,
    /// Quantity remaining after use.
    pub remaining: u32,
}

/// Outcome of a relationship adjustment.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipChange {
    /// The entity the standing is with.
    pub entity_name: String,
    /// Standing after the change.
    pub reputation: i64,
}

/// Outcome of advancing the clock.
#[derive(Debug, Clone, Serialize)]
pub struct ClockChange {
    /// Hour of day after the advance, 0..=23.
    pub game_time: u32,
    /// Day number after the advance.
    pub game_day: u32,
    /// How many midnights were crossed.
    pub days_passed: u32,
    /// Status effects that wore off during this advance.
    pub expired_effects: Vec<String>,
}

/// Outcome of a currency transaction.
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyChange {
    /// Balance after the transaction.
    pub currency: i64,
    /// The delta applied.
    pub change: i64,
}

/// A word drawn from an adventure word list, or the fallback prompt
/// when the list cannot supply one.
#[derive(Debug, Clone, Serialize)]
pub struct WordDraw {
    /// The drawn word, when the list had one.
    pub word: Option<String>,
    /// A generation prompt for the narrator, when it did not.
    pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, StartOptions};
    use crate::world::NewStatusEffect;
    use ff_core::{AdventureDefinition, PropValue, StatDefinition};
    use ff_store::MemoryStore;
    use std::sync::Arc;

    fn engine_with_session() -> (Engine, SessionId) {
        let mut adv: AdventureDefinition = serde_json::from_value(serde_json::json!({
            "id": "rustwreck",
            "title": "Rustwreck",
            "description": "",
            "prompt": "",
            "stats": [],
            "starting_hp": 10,
            "initial_location": "Docking Bay",
            "initial_story": "",
            "currency_config": { "starting_amount": 20, "allow_debt": false }
        }))
        .unwrap();
        adv.stats = vec![StatDefinition::new("Strength", "muscle")];
        let mut engine = Engine::new(
            Arc::new(MemoryStore::new()),
            EngineConfig::default().with_seed(5),
        );
        engine.install_adventure(&adv).unwrap();
        let session = engine
            .start_adventure("rustwreck", StartOptions::default())
            .unwrap()
            .session_id;
        (engine, session)
    }

    #[test]
    fn hp_clamps_to_zero_and_ceiling() {
        let (engine, session) = engine_with_session();
        let change = engine.modify_hp(session, -25, Some("crushed")).unwrap();
        assert_eq!(change.hp, 0);
        assert_eq!(change.change, -10);

        let change = engine.modify_hp(session, 99, None).unwrap();
        assert_eq!(change.hp, 10);
        assert_eq!(change.max_hp, 10);
        assert_eq!(change.change, 10);
    }

    #[test]
    fn hp_zero_does_not_end_the_session() {
        let (engine, session) = engine_with_session();
        engine.modify_hp(session, -10, None).unwrap();
        // State remains fully operable afterwards.
        engine.modify_score(session, 1).unwrap();
        assert_eq!(engine.player_state(session).unwrap().hp, 0);
    }

    #[test]
    fn stat_changes_report_requested_and_applied() {
        let (engine, session) = engine_with_session();
        let change = engine.modify_stat(session, "Strength", 15).unwrap();
        assert_eq!(change.old_value, 10);
        assert_eq!(change.new_value, 20);
        assert_eq!(change.requested, 15);
        assert_eq!(change.applied, 10);

        let err = engine.modify_stat(session, "Luck", 1).unwrap_err();
        assert_eq!(err.kind(), "unknown_stat");
    }

    #[test]
    fn move_accepts_any_destination() {
        let (engine, session) = engine_with_session();
        let moved = engine.move_to(session, "A Place Never Mentioned").unwrap();
        assert_eq!(moved.from, "Docking Bay");
        assert_eq!(
            engine.player_state(session).unwrap().location,
            "A Place Never Mentioned"
        );
    }

    #[test]
    fn inventory_merges_by_name_and_drops_at_zero() {
        let (engine, session) = engine_with_session();
        engine.add_item(session, "rope", 2, Props::new()).unwrap();
        let change = engine.add_item(session, "rope", 3, Props::new()).unwrap();
        assert_eq!(change.quantity, 5);
        assert_eq!(engine.player_state(session).unwrap().inventory.len(), 1);

        let change = engine.remove_item(session, "rope", 5).unwrap();
        assert_eq!(change.quantity, 0);
        assert!(engine.player_state(session).unwrap().inventory.is_empty());
    }

    #[test]
    fn removal_failures_leave_state_untouched() {
        let (engine, session) = engine_with_session();
        engine.add_item(session, "flare", 2, Props::new()).unwrap();

        let err = engine.remove_item(session, "flare", 3).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientQuantity { have: 2, requested: 3, .. }
        ));
        let err = engine.remove_item(session, "rope", 1).unwrap_err();
        assert_eq!(err.kind(), "item_not_found");

        assert_eq!(
            engine.player_state(session).unwrap().item("flare").unwrap().quantity,
            2
        );
    }

    #[test]
    fn use_item_consumes_unless_marked_otherwise() {
        let (engine, session) = engine_with_session();
        engine.add_item(session, "ration", 2, Props::new()).unwrap();
        let mut props = Props::new();
        props.insert("consumable".to_string(), PropValue::Bool(false));
        engine.add_item(session, "lantern", 1, props).unwrap();

        let used = engine.use_item(session, "ration").unwrap();
        assert!(used.consumed);
        assert_eq!(used.remaining, 1);

        let used = engine.use_item(session, "lantern").unwrap();
        assert!(!used.consumed);
        assert_eq!(used.remaining, 1);
        assert!(engine.player_state(session).unwrap().item("lantern").is_some());
    }

    #[test]
    fn quest_lifecycle_enforced() {
        let (engine, session) = engine_with_session();
        let quest = engine
            .start_quest(
                session,
                "salvage",
                "Strip the Wreck",
                vec!["reach the hold".to_string(), "cut the plating".to_string()],
            )
            .unwrap();
        assert_eq!(quest.status, QuestStatus::Active);

        let quest = engine
            .update_quest(session, "salvage", "reach the hold")
            .unwrap();
        assert_eq!(quest.completed_objectives, vec!["reach the hold".to_string()]);
        // Ticking the same objective again is a no-op.
        let quest = engine
            .update_quest(session, "salvage", "reach the hold")
            .unwrap();
        assert_eq!(quest.completed_objectives.len(), 1);

        let err = engine
            .update_quest(session, "salvage", "find the captain")
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");

        let quest = engine.complete_quest(session, "salvage", true).unwrap();
        assert_eq!(quest.status, QuestStatus::Completed);

        // Terminal states admit nothing, not even a restart.
        let err = engine.complete_quest(session, "salvage", false).unwrap_err();
        assert_eq!(err.kind(), "invalid_quest_transition");
        let err = engine
            .start_quest(session, "salvage", "Strip the Wreck", vec![])
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_quest_transition");
    }

    #[test]
    fn relationships_are_unbounded() {
        let (engine, session) = engine_with_session();
        engine.adjust_relationship(session, "Vex", -150).unwrap();
        let change = engine.adjust_relationship(session, "Vex", -50).unwrap();
        assert_eq!(change.reputation, -200);
    }

    #[test]
    fn time_advances_and_ticks_effects() {
        let (engine, session) = engine_with_session();
        engine
            .create_status_effect(
                session,
                NewStatusEffect {
                    name: "Winded".to_string(),
                    description: String::new(),
                    duration: 2,
                    stat_modifiers: HashMap::new(),
                    properties: Props::new(),
                },
            )
            .unwrap();

        let change = engine.advance_time(session, 3).unwrap();
        assert_eq!(change.game_time, 11);
        assert_eq!(change.days_passed, 0);
        assert!(change.expired_effects.is_empty());

        let change = engine.advance_time(session, 24).unwrap();
        assert_eq!(change.game_time, 11);
        assert_eq!(change.game_day, 2);
        assert_eq!(change.days_passed, 1);
        assert_eq!(change.expired_effects, vec!["Winded".to_string()]);
        assert!(engine.list_status_effects(session).unwrap().is_empty());

        let err = engine.advance_time(session, -1).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn clock_accepts_the_largest_representable_advance() {
        let (engine, session) = engine_with_session();
        // 08:00 + u32::MAX hours lands on 23:00, 178_956_970 days later.
        let change = engine.advance_time(session, i64::from(u32::MAX)).unwrap();
        assert_eq!(change.game_time, 23);
        assert_eq!(change.days_passed, 178_956_970);
        assert_eq!(change.game_day, 178_956_971);

        let err = engine
            .advance_time(session, i64::from(u32::MAX) + 1)
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn transactions_refuse_overdraft_without_debt() {
        let (engine, session) = engine_with_session();
        let change = engine.transact(session, -15, Some("bribed the dockmaster")).unwrap();
        assert_eq!(change.currency, 5);

        let err = engine.transact(session, -6, None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientFunds { balance: 5, change: -6 }
        ));
        assert_eq!(engine.player_state(session).unwrap().currency, 5);
    }

    #[test]
    fn checks_use_effective_stats() {
        let (mut engine, session) = engine_with_session();
        engine
            .create_status_effect(
                session,
                NewStatusEffect {
                    name: "Blessed".to_string(),
                    description: String::new(),
                    duration: 5,
                    stat_modifiers: HashMap::from([("Strength".to_string(), 4)]),
                    properties: Props::new(),
                },
            )
            .unwrap();

        let stats = engine.effective_stats(session).unwrap();
        assert_eq!(stats["Strength"], 14);
        // The persisted stat map is untouched.
        assert_eq!(engine.player_state(session).unwrap().stats["Strength"], 10);

        // Strength 14 gives +2; total always lands in roll+2.
        let result = engine
            .check_stat(session, "Strength", 10, RollMode::Normal)
            .unwrap();
        assert_eq!(result.modifier, 2);
        assert_eq!(result.total, i64::from(result.roll) + 2);

        let err = engine
            .check_stat(session, "Luck", 10, RollMode::Normal)
            .unwrap_err();
        assert_eq!(err.kind(), "unknown_stat");
    }

    #[test]
    fn modifiers_for_unknown_stats_are_ignored() {
        let (engine, session) = engine_with_session();
        engine
            .create_status_effect(
                session,
                NewStatusEffect {
                    name: "Haunted".to_string(),
                    description: String::new(),
                    duration: 3,
                    stat_modifiers: HashMap::from([("Dread".to_string(), 5)]),
                    properties: Props::new(),
                },
            )
            .unwrap();
        let stats = engine.effective_stats(session).unwrap();
        assert_eq!(stats.len(), 1);
        assert!(!stats.contains_key("Dread"));
    }
}
