//! Testing utilities for the companion.
//!
//! This module provides tools for integration testing:
//! - Fixture factories for trainers and creatures
//! - `TestHarness` for scripted sessions over an in-memory store
//! - Assertion helpers for verifying state

use crate::persist::MemoryStore;
use crate::rules::Intent;
use crate::session::{Response, Session, SessionConfig};
use crate::status::{status_badges, Condition};
use crate::world::{
    AbilityScores, ActionType, Attack, Creature, CreatureId, InventoryItem, ItemCategory, ItemId,
    ResourcePool, Trainer,
};

/// A level 5 trainer with a couple of potions and balls.
pub fn sample_trainer(name: &str) -> Trainer {
    Trainer {
        name: name.to_string(),
        level: 5,
        class: "Ace Trainer".to_string(),
        attributes: AbilityScores::new(10, 14, 12, 13, 11, 15),
        hp: ResourcePool::full(30),
        inventory: vec![
            InventoryItem {
                id: ItemId::from("potion"),
                name: "Potion".to_string(),
                quantity: 2,
                category: ItemCategory::Medicine,
                description: Some("Restores 20 HP".to_string()),
            },
            InventoryItem {
                id: ItemId::from("poke-ball"),
                name: "Poke Ball".to_string(),
                quantity: 5,
                category: ItemCategory::Ball,
                description: None,
            },
        ],
        pokedollars: 500,
    }
}

/// A healthy level 5 creature with one attack in four slots and no statuses.
pub fn sample_creature(name: &str) -> Creature {
    Creature {
        name: name.to_string(),
        type_tag: "Electric".to_string(),
        level: 5,
        hp: ResourcePool::full(40),
        experience: 0,
        experience_to_next: 100,
        attributes: AbilityScores::default(),
        attacks: vec![
            Some(
                Attack::new("Tackle", 35)
                    .with_action_type(ActionType::Action)
                    .with_move_bonus(3)
                    .with_damage_dice("1d6+1"),
            ),
            None,
            None,
            None,
        ],
        primary_status: None,
        confusion: None,
        temporary_effects: Vec::new(),
    }
}

/// Test harness for running scripted sessions.
pub struct TestHarness {
    pub session: Session<MemoryStore>,
}

impl TestHarness {
    /// A session with a sample trainer and an empty team.
    pub fn new() -> Self {
        let mut harness = Self::empty();
        harness.dispatch(Intent::CreateTrainer {
            trainer: sample_trainer("Test Trainer"),
        });
        harness
    }

    /// A session with nothing in it.
    pub fn empty() -> Self {
        Self::with_config(SessionConfig::new())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: Session::new(config, MemoryStore::new()),
        }
    }

    /// Add a sample creature, returning its id.
    ///
    /// Panics if the team cap is reached.
    pub fn catch(&mut self, name: &str) -> CreatureId {
        self.session
            .add_creature(sample_creature(name))
            .unwrap_or_else(|e| panic!("Failed to add {name}: {e}"))
    }

    pub fn dispatch(&mut self, intent: Intent) -> Response {
        self.session.dispatch(intent)
    }

    fn creature(&self, id: CreatureId) -> &Creature {
        self.session
            .creature(id)
            .unwrap_or_else(|| panic!("No creature with id {id}"))
    }

    /// HP as (current, max).
    pub fn hp(&self, id: CreatureId) -> (i32, i32) {
        let hp = self.creature(id).hp;
        (hp.current, hp.max)
    }

    /// PP of an attack slot as (current, max).
    pub fn pp(&self, id: CreatureId, slot: usize) -> Option<(i32, i32)> {
        self.creature(id).attack(slot).map(|a| (a.pp.current, a.pp.max))
    }

    /// Badge labels in display order.
    pub fn badges(&self, id: CreatureId) -> Vec<String> {
        status_badges(self.creature(id))
            .into_iter()
            .map(|b| b.label)
            .collect()
    }

    pub fn has_condition(&self, id: CreatureId, condition: &Condition) -> bool {
        self.creature(id).has_condition(condition)
    }

    pub fn team_size(&self) -> usize {
        self.session.state().team.len()
    }

    pub fn pokedollars(&self) -> u32 {
        self.session
            .trainer()
            .map(|t| t.pokedollars)
            .unwrap_or_default()
    }

    /// Quantity of the first inventory row with this name.
    pub fn item_quantity(&self, name: &str) -> Option<u32> {
        self.session
            .trainer()
            .ok()?
            .inventory
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.quantity)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert a creature's HP.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, id: CreatureId, current: i32, max: i32) {
    let (actual_current, actual_max) = harness.hp(id);
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert the PP of an attack slot.
#[track_caller]
pub fn assert_pp(harness: &TestHarness, id: CreatureId, slot: usize, current: i32, max: i32) {
    assert_eq!(
        harness.pp(id, slot),
        Some((current, max)),
        "Expected PP {current}/{max} in slot {slot}"
    );
}

/// Assert a creature carries a condition.
#[track_caller]
pub fn assert_has_condition(harness: &TestHarness, id: CreatureId, condition: &Condition) {
    assert!(
        harness.has_condition(id, condition),
        "Expected creature to be {}",
        condition.display_name()
    );
}

/// Assert a creature does NOT carry a condition.
#[track_caller]
pub fn assert_no_condition(harness: &TestHarness, id: CreatureId, condition: &Condition) {
    assert!(
        !harness.has_condition(id, condition),
        "Expected creature to NOT be {}",
        condition.display_name()
    );
}

/// Assert the team size.
#[track_caller]
pub fn assert_team_size(harness: &TestHarness, expected: usize) {
    assert_eq!(
        harness.team_size(),
        expected,
        "Expected {expected} team members"
    );
}
