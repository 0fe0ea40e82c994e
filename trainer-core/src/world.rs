//! Trainer and creature state types.
//!
//! Contains the value records (ability scores, resource pools), the two
//! entities (trainer and creature) and the aggregate [`AppState`] owned by a
//! session.

use crate::status::StatusEffect;
use crate::team::TeamRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for creatures in the team registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub Uuid);

impl CreatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CreatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an inventory row.
///
/// Kept as a free-form string so that ids written by older stores load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Ability score block shared by trainers and creatures.
///
/// Scores are conventionally 1-20; the range is a form hint and is not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// Tabletop modifier: `floor((score - 10) / 2)`.
    pub fn modifier(&self, ability: Ability) -> i8 {
        let score = self.get(ability) as i16;
        (score - 10).div_euclid(2) as i8
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Resource Pools
// ============================================================================

/// A bounded current/max pair used for HP and PP.
///
/// Every mutation clamps `current` into `[0, max]`, and so does loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawResourcePool")]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
}

/// Wire shape of a pool before clamping.
#[derive(Deserialize)]
struct RawResourcePool {
    current: i32,
    max: i32,
}

impl From<RawResourcePool> for ResourcePool {
    fn from(raw: RawResourcePool) -> Self {
        ResourcePool::new(raw.current, raw.max)
    }
}

impl ResourcePool {
    pub fn new(current: i32, max: i32) -> Self {
        Self { current, max }.clamped()
    }

    /// A pool at its maximum.
    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    /// Return the pool with `delta` applied, saturating at 0 and `max`.
    ///
    /// Never fails. A malformed negative `max` clamps to 0.
    pub fn apply_delta(self, delta: i32) -> Self {
        Self {
            current: self.current.saturating_add(delta),
            max: self.max,
        }
        .clamped()
    }

    /// Refill to max.
    pub fn restore(self) -> Self {
        Self::full(self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Fill ratio for gauges, 0.0 for empty or zero-capacity pools.
    pub fn ratio(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }

    fn clamped(self) -> Self {
        let max = self.max.max(0);
        Self {
            current: self.current.clamp(0, max),
            max,
        }
    }
}

impl fmt::Display for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

// ============================================================================
// Attacks
// ============================================================================

/// How much of a turn an attack consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    #[default]
    Action,
    BonusAction,
    Reaction,
}

impl ActionType {
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::Action => "Action",
            ActionType::BonusAction => "Bonus Action",
            ActionType::Reaction => "Reaction",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A creature attack with its own PP pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    pub pp: ResourcePool,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub move_bonus: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_effect: Option<String>,
}

impl Attack {
    pub fn new(name: impl Into<String>, max_pp: i32) -> Self {
        Self {
            name: name.into(),
            pp: ResourcePool::full(max_pp),
            action_type: ActionType::Action,
            move_bonus: 0,
            damage_dice: None,
            description: None,
            special_effect: None,
        }
    }

    pub fn with_action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = action_type;
        self
    }

    pub fn with_move_bonus(mut self, bonus: i32) -> Self {
        self.move_bonus = bonus;
        self
    }

    pub fn with_damage_dice(mut self, dice: impl Into<String>) -> Self {
        self.damage_dice = Some(dice.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_special_effect(mut self, effect: impl Into<String>) -> Self {
        self.special_effect = Some(effect.into());
        self
    }

    /// Performing is only possible with PP left.
    pub fn can_perform(&self) -> bool {
        self.pp.current > 0
    }
}

// ============================================================================
// Creatures
// ============================================================================

/// A team member with HP, attacks and status effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub name: String,
    pub type_tag: String,
    pub level: u32,
    pub hp: ResourcePool,
    #[serde(default)]
    pub experience: u32,
    pub experience_to_next: u32,
    #[serde(default)]
    pub attributes: AbilityScores,
    #[serde(default)]
    pub attacks: Vec<Option<Attack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_status: Option<StatusEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confusion: Option<StatusEffect>,
    #[serde(default)]
    pub temporary_effects: Vec<StatusEffect>,
}

impl Creature {
    /// Attack at a slot index, if the slot exists and is filled.
    pub fn attack(&self, slot: usize) -> Option<&Attack> {
        self.attacks.get(slot).and_then(Option::as_ref)
    }

    pub fn attack_mut(&mut self, slot: usize) -> Option<&mut Attack> {
        self.attacks.get_mut(slot).and_then(Option::as_mut)
    }

    /// Put an attack into a slot (or empty it), growing the slot list as needed.
    pub fn set_attack(&mut self, slot: usize, attack: Option<Attack>) {
        if self.attacks.len() <= slot {
            self.attacks.resize(slot + 1, None);
        }
        self.attacks[slot] = attack;
    }

    /// The first `count` display slots, padded with empties.
    pub fn attack_slots(&self, count: usize) -> Vec<Option<&Attack>> {
        (0..count).map(|slot| self.attack(slot)).collect()
    }

    pub fn is_fainted(&self) -> bool {
        self.hp.is_empty()
    }
}

// ============================================================================
// Trainer
// ============================================================================

/// Broad grouping for inventory rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    Medicine,
    Ball,
    Berry,
    KeyItem,
    #[default]
    Other,
}

impl ItemCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ItemCategory::Medicine => "Medicine",
            ItemCategory::Ball => "Ball",
            ItemCategory::Berry => "Berry",
            ItemCategory::KeyItem => "Key Item",
            ItemCategory::Other => "Other",
        }
    }
}

/// A row in the trainer's item ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields for a new inventory row; the id is generated on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            category: ItemCategory::Other,
            description: None,
        }
    }

    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_item(self, id: ItemId) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            quantity: self.quantity,
            category: self.category,
            description: self.description,
        }
    }
}

/// The player character owning the team and inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub name: String,
    pub level: u32,
    pub class: String,
    #[serde(default)]
    pub attributes: AbilityScores,
    pub hp: ResourcePool,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub pokedollars: u32,
}

impl Trainer {
    pub fn find_item(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| &i.id == id)
    }

    /// Spend one of an item. Rows that reach zero are dropped.
    pub fn use_item(&mut self, id: &ItemId) {
        if let Some(item) = self.inventory.iter_mut().find(|i| &i.id == id) {
            item.quantity = item.quantity.saturating_sub(1);
        }
        self.inventory.retain(|i| i.quantity > 0);
    }

    /// Append a row under a freshly generated id and return it.
    pub fn add_item(&mut self, item: NewItem) -> ItemId {
        let id = ItemId::generate();
        self.inventory.push(item.into_item(id.clone()));
        id
    }

    pub fn increase_item(&mut self, id: &ItemId) {
        if let Some(item) = self.inventory.iter_mut().find(|i| &i.id == id) {
            item.quantity = item.quantity.saturating_add(1);
        }
    }

    pub fn set_currency(&mut self, amount: u32) {
        self.pokedollars = amount;
    }

    pub fn total_items(&self) -> u32 {
        self.inventory.iter().map(|i| i.quantity).sum()
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Everything a session owns: at most one trainer and the team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<Trainer>,
    #[serde(default)]
    pub team: TeamRegistry,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.team.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heal_and_damage_clamp() {
        let pool = ResourcePool::new(60, 100);
        assert_eq!(pool.apply_delta(20), ResourcePool::new(80, 100));
        assert_eq!(pool.apply_delta(-15), ResourcePool::new(45, 100));
        assert_eq!(pool.apply_delta(500).current, 100);
        assert_eq!(pool.apply_delta(-500).current, 0);
    }

    #[test]
    fn test_delta_saturates_on_overflow() {
        let pool = ResourcePool::new(10, 20);
        assert_eq!(pool.apply_delta(i32::MAX).current, 20);
        assert_eq!(pool.apply_delta(i32::MIN).current, 0);
    }

    #[test]
    fn test_negative_max_clamps_to_zero() {
        let pool = ResourcePool { current: 5, max: -3 };
        assert_eq!(pool.apply_delta(1), ResourcePool { current: 0, max: 0 });
    }

    #[test]
    fn test_loaded_pool_is_clamped() {
        let over: ResourcePool = serde_json::from_str(r#"{"current":500,"max":100}"#).unwrap();
        assert_eq!(over, ResourcePool { current: 100, max: 100 });

        let under: ResourcePool =
            serde_json::from_str(r#"{"current":-2147483648,"max":10}"#).unwrap();
        assert_eq!(under, ResourcePool { current: 0, max: 10 });

        let negative: ResourcePool = serde_json::from_str(r#"{"current":3,"max":-5}"#).unwrap();
        assert_eq!(negative, ResourcePool { current: 0, max: 0 });
    }

    #[test]
    fn test_modifier() {
        let scores = AbilityScores::new(10, 15, 8, 20, 1, 11);
        assert_eq!(scores.modifier(Ability::Strength), 0);
        assert_eq!(scores.modifier(Ability::Dexterity), 2);
        assert_eq!(scores.modifier(Ability::Constitution), -1);
        assert_eq!(scores.modifier(Ability::Intelligence), 5);
        assert_eq!(scores.modifier(Ability::Wisdom), -5);
        assert_eq!(scores.modifier(Ability::Charisma), 0);
    }

    #[test]
    fn test_set_attack_grows_slots() {
        let mut creature = crate::testing::sample_creature("Sparky");
        creature.attacks.clear();
        creature.set_attack(2, Some(Attack::new("Ember", 25)));

        assert_eq!(creature.attacks.len(), 3);
        assert!(creature.attack(0).is_none());
        assert_eq!(creature.attack(2).map(|a| a.name.as_str()), Some("Ember"));

        let slots = creature.attack_slots(4);
        assert_eq!(slots.len(), 4);
        assert!(slots[3].is_none());
    }

    #[test]
    fn test_use_item_removes_at_zero() {
        let mut trainer = crate::testing::sample_trainer("Ash");
        trainer.inventory = vec![InventoryItem {
            id: ItemId::from("a"),
            name: "Potion".to_string(),
            quantity: 1,
            category: ItemCategory::Medicine,
            description: None,
        }];

        trainer.use_item(&ItemId::from("a"));
        assert!(trainer.inventory.is_empty());
    }

    #[test]
    fn test_increase_then_use_keeps_row() {
        let mut trainer = crate::testing::sample_trainer("Ash");
        trainer.inventory = vec![InventoryItem {
            id: ItemId::from("a"),
            name: "Potion".to_string(),
            quantity: 1,
            category: ItemCategory::Medicine,
            description: None,
        }];

        trainer.increase_item(&ItemId::from("a"));
        assert_eq!(trainer.inventory[0].quantity, 2);

        trainer.use_item(&ItemId::from("a"));
        assert_eq!(trainer.inventory.len(), 1);
        assert_eq!(trainer.inventory[0].quantity, 1);
    }

    #[test]
    fn test_add_item_generates_distinct_ids() {
        let mut trainer = crate::testing::sample_trainer("Ash");
        let before = trainer.inventory.len();
        let first = trainer.add_item(NewItem::new("Poke Ball", 5));
        let second = trainer.add_item(NewItem::new("Poke Ball", 5));
        assert_ne!(first, second);
        assert_eq!(trainer.inventory.len(), before + 2);
        assert_eq!(trainer.find_item(&first).map(|i| i.quantity), Some(5));
    }

    #[test]
    fn test_attack_omits_absent_optionals() {
        let attack = Attack::new("Tackle", 35);
        let json = serde_json::to_value(&attack).unwrap();
        assert!(json.get("damageDice").is_none());
        assert_eq!(json["actionType"], "action");
        assert_eq!(json["pp"]["max"], 35);
    }
}
