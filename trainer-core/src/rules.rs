//! Intent/Effect rules engine.
//!
//! Every state change goes through the same pipeline:
//! 1. The front end emits an [`Intent`] (heal this creature, use that item)
//! 2. [`RulesEngine::resolve`] reads the current [`AppState`] and produces
//!    [`Effect`]s describing the change, plus a narrative line
//! 3. [`apply_effects`] replaces the affected records in the state
//!
//! Resolving never mutates state, so the whole pipeline is testable without
//! any UI. [`reduce`] composes the steps into `(state, intent) -> state'`.

use crate::dice::{self, Advantage, DiceExpression, RollResult};
use crate::status::{Condition, StatusEffect, StatusSlot};
use crate::world::{
    AppState, Attack, Creature, CreatureId, InventoryItem, ItemId, NewItem, ResourcePool, Trainer,
};
use serde::{Deserialize, Serialize};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Intent {
    /// Create the session's trainer
    CreateTrainer { trainer: Trainer },

    /// Replace the trainer record
    UpdateTrainer { trainer: Trainer },

    /// Remove the trainer
    DeleteTrainer,

    /// Heal (positive) or damage (negative) the trainer
    AdjustTrainerHp { delta: i32 },

    /// Add a creature to the team under a new id
    AddCreature { creature: Creature },

    /// Replace a creature record, keeping its id
    UpdateCreature { id: CreatureId, creature: Creature },

    /// Remove a creature from the team
    RemoveCreature { id: CreatureId },

    /// Restore HP
    HealCreature { id: CreatureId, amount: i32 },

    /// Deal damage
    DamageCreature { id: CreatureId, amount: i32 },

    /// Use the attack in a slot, spending one PP
    PerformAttack {
        id: CreatureId,
        slot: usize,
        #[serde(default)]
        advantage: Advantage,
    },

    /// Fill or empty an attack slot
    SetAttack {
        id: CreatureId,
        slot: usize,
        attack: Option<Attack>,
    },

    /// Give back PP to one attack
    RestorePp {
        id: CreatureId,
        slot: usize,
        amount: i32,
    },

    /// Put a status effect into a slot
    ApplyStatus {
        id: CreatureId,
        slot: StatusSlot,
        effect: StatusEffect,
    },

    /// Empty a status slot
    ClearStatus { id: CreatureId, slot: StatusSlot },

    /// Drop one temporary effect by position
    RemoveTemporaryEffect { id: CreatureId, index: usize },

    /// End the creature's turn, ticking status durations
    EndTurn { id: CreatureId },

    /// Full restore of HP, PP and statuses; `None` rests the whole team
    Rest { id: Option<CreatureId> },

    /// Award experience, levelling up as thresholds are crossed
    GainExperience { id: CreatureId, amount: u32 },

    /// Spend one of an inventory item
    UseItem { item_id: ItemId },

    /// Add a new inventory row
    AddItem { item: NewItem },

    /// Add one to an inventory row
    IncreaseItem { item_id: ItemId },

    /// Replace the currency balance
    SetCurrency { amount: u32 },
}

/// The result of resolving an intent.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub narrative: String,
}

impl Resolution {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            effects: Vec::new(),
            narrative: narrative.into(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// True when resolving changed nothing.
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Concrete state changes produced by resolving an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Effect {
    TrainerCreated {
        trainer: Trainer,
    },
    TrainerUpdated {
        trainer: Trainer,
    },
    TrainerDeleted,
    TrainerHpChanged {
        amount: i32,
        new_current: i32,
        new_max: i32,
    },
    CreatureAdded {
        id: CreatureId,
        creature: Creature,
    },
    CreatureUpdated {
        id: CreatureId,
        creature: Creature,
    },
    CreatureRemoved {
        id: CreatureId,
    },

    /// HP changed (damage or healing)
    HpChanged {
        id: CreatureId,
        amount: i32,
        new_current: i32,
        new_max: i32,
        fainted: bool,
    },

    /// One PP was spent on an attack
    PpSpent {
        id: CreatureId,
        slot: usize,
        remaining: i32,
    },
    PpRestored {
        id: CreatureId,
        slot: usize,
        amount: i32,
        new_current: i32,
    },

    /// Dice rolled for a performed attack
    AttackRolled {
        id: CreatureId,
        slot: usize,
        to_hit: RollResult,
        damage: Option<RollResult>,
    },
    AttackSet {
        id: CreatureId,
        slot: usize,
        attack: Option<Attack>,
    },
    StatusApplied {
        id: CreatureId,
        slot: StatusSlot,
        effect: StatusEffect,
    },
    StatusCleared {
        id: CreatureId,
        slot: StatusSlot,
    },
    TemporaryEffectRemoved {
        id: CreatureId,
        index: usize,
    },

    /// Turn ended; `expired` lists the conditions that ran out
    TurnEnded {
        id: CreatureId,
        expired: Vec<Condition>,
    },
    Rested {
        id: CreatureId,
    },
    ExperienceGained {
        id: CreatureId,
        amount: u32,
        new_total: u32,
    },
    LevelUp {
        id: CreatureId,
        new_level: u32,
    },
    ItemUsed {
        item_id: ItemId,
        remaining: u32,
    },
    ItemAdded {
        item: InventoryItem,
    },
    ItemIncreased {
        item_id: ItemId,
        new_quantity: u32,
    },
    CurrencyChanged {
        previous: u32,
        new_total: u32,
    },
}

/// Resolves intents against the current state.
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Resolve an intent into effects. The state is only read.
    pub fn resolve(&self, state: &AppState, intent: Intent) -> Resolution {
        match intent {
            Intent::CreateTrainer { trainer } => self.resolve_create_trainer(state, trainer),
            Intent::UpdateTrainer { trainer } => self.resolve_update_trainer(state, trainer),
            Intent::DeleteTrainer => self.resolve_delete_trainer(state),
            Intent::AdjustTrainerHp { delta } => self.resolve_adjust_trainer_hp(state, delta),
            Intent::AddCreature { creature } => {
                let id = CreatureId::new();
                Resolution::new(format!("{} joins the team", creature.name))
                    .with_effect(Effect::CreatureAdded { id, creature })
            }
            Intent::UpdateCreature { id, creature } => {
                if !state.team.contains(id) {
                    return missing_creature(id);
                }
                Resolution::new(format!("{} updated", creature.name))
                    .with_effect(Effect::CreatureUpdated { id, creature })
            }
            Intent::RemoveCreature { id } => match state.creature(id) {
                Some(creature) => Resolution::new(format!("{} leaves the team", creature.name))
                    .with_effect(Effect::CreatureRemoved { id }),
                None => missing_creature(id),
            },
            Intent::HealCreature { id, amount } => self.resolve_heal(state, id, amount),
            Intent::DamageCreature { id, amount } => self.resolve_damage(state, id, amount),
            Intent::PerformAttack {
                id,
                slot,
                advantage,
            } => self.resolve_perform_attack(state, id, slot, advantage),
            Intent::SetAttack { id, slot, attack } => {
                self.resolve_set_attack(state, id, slot, attack)
            }
            Intent::RestorePp { id, slot, amount } => {
                self.resolve_restore_pp(state, id, slot, amount)
            }
            Intent::ApplyStatus { id, slot, effect } => {
                self.resolve_apply_status(state, id, slot, effect)
            }
            Intent::ClearStatus { id, slot } => match state.creature(id) {
                Some(creature) => Resolution::new(format!(
                    "{}'s {} status is cleared",
                    creature.name,
                    slot.name()
                ))
                .with_effect(Effect::StatusCleared { id, slot }),
                None => missing_creature(id),
            },
            Intent::RemoveTemporaryEffect { id, index } => {
                self.resolve_remove_temporary(state, id, index)
            }
            Intent::EndTurn { id } => self.resolve_end_turn(state, id),
            Intent::Rest { id } => self.resolve_rest(state, id),
            Intent::GainExperience { id, amount } => {
                self.resolve_gain_experience(state, id, amount)
            }
            Intent::UseItem { item_id } => self.resolve_use_item(state, item_id),
            Intent::AddItem { item } => self.resolve_add_item(state, item),
            Intent::IncreaseItem { item_id } => self.resolve_increase_item(state, item_id),
            Intent::SetCurrency { amount } => self.resolve_set_currency(state, amount),
        }
    }

    fn resolve_create_trainer(&self, state: &AppState, trainer: Trainer) -> Resolution {
        if let Some(existing) = &state.trainer {
            return Resolution::new(format!(
                "{} is already the active trainer",
                existing.name
            ));
        }
        Resolution::new(format!("{} begins their journey", trainer.name))
            .with_effect(Effect::TrainerCreated { trainer })
    }

    fn resolve_update_trainer(&self, state: &AppState, trainer: Trainer) -> Resolution {
        if state.trainer.is_none() {
            return no_trainer();
        }
        Resolution::new(format!("{} updated", trainer.name))
            .with_effect(Effect::TrainerUpdated { trainer })
    }

    fn resolve_delete_trainer(&self, state: &AppState) -> Resolution {
        match &state.trainer {
            Some(trainer) => Resolution::new(format!("{} retires", trainer.name))
                .with_effect(Effect::TrainerDeleted),
            None => no_trainer(),
        }
    }

    fn resolve_adjust_trainer_hp(&self, state: &AppState, delta: i32) -> Resolution {
        let Some(trainer) = &state.trainer else {
            return no_trainer();
        };
        let next = trainer.hp.apply_delta(delta);
        let amount = next.current.saturating_sub(trainer.hp.current);
        if amount == 0 {
            return Resolution::new(format!("{}'s HP is unchanged ({})", trainer.name, next));
        }
        Resolution::new(format!("{} HP: {}", trainer.name, next)).with_effect(
            Effect::TrainerHpChanged {
                amount,
                new_current: next.current,
                new_max: next.max,
            },
        )
    }

    fn resolve_heal(&self, state: &AppState, id: CreatureId, amount: i32) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        if amount <= 0 {
            return Resolution::new("Nothing to heal");
        }

        let next = creature.hp.apply_delta(amount);
        let healed = next.current.saturating_sub(creature.hp.current);
        if healed == 0 {
            return Resolution::new(format!("{} is already at full HP", creature.name));
        }

        let hp_status = if next.is_full() {
            format!(" (HP: {next} - fully healed)")
        } else {
            format!(" (HP: {next})")
        };

        Resolution::new(format!(
            "{} recovers {} HP{}",
            creature.name, healed, hp_status
        ))
        .with_effect(Effect::HpChanged {
            id,
            amount: healed,
            new_current: next.current,
            new_max: next.max,
            fainted: false,
        })
    }

    fn resolve_damage(&self, state: &AppState, id: CreatureId, amount: i32) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        if amount <= 0 {
            return Resolution::new("No damage dealt");
        }
        if creature.hp.is_empty() {
            return Resolution::new(format!("{} has already fainted", creature.name));
        }

        let next = creature.hp.apply_delta(amount.saturating_neg());
        let lost = creature.hp.current.saturating_sub(next.current);
        let fainted = next.is_empty();

        let hp_status = if fainted {
            format!(" (HP: {next} - fainted!)")
        } else if next.current <= next.max / 4 {
            format!(" (HP: {next} - critical)")
        } else {
            format!(" (HP: {next})")
        };

        Resolution::new(format!("{} takes {} damage{}", creature.name, lost, hp_status))
            .with_effect(Effect::HpChanged {
                id,
                amount: -lost,
                new_current: next.current,
                new_max: next.max,
                fainted,
            })
    }

    fn resolve_perform_attack(
        &self,
        state: &AppState,
        id: CreatureId,
        slot: usize,
        advantage: Advantage,
    ) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        let Some(attack) = creature.attack(slot) else {
            return Resolution::new(format!(
                "{} has no attack in slot {}",
                creature.name,
                slot + 1
            ));
        };
        // Also disabled in the UI; at 0 PP nothing changes.
        if !attack.can_perform() {
            return Resolution::new(format!(
                "{} has no PP left for {}",
                creature.name, attack.name
            ));
        }

        let mut rng = rand::thread_rng();
        let to_hit = dice::roll_to_hit(attack.move_bonus, advantage, &mut rng);
        let damage = attack
            .damage_dice
            .as_deref()
            .and_then(|notation| match DiceExpression::parse(notation) {
                Ok(expr) => Some(expr.roll_with_rng(&mut rng)),
                Err(e) => {
                    tracing::debug!(attack = %attack.name, error = %e, "Unrollable damage dice");
                    None
                }
            });

        let remaining = attack.pp.apply_delta(-1).current;

        let hit_text = if to_hit.is_critical() {
            format!("{} to hit (natural 20!)", to_hit.total)
        } else if to_hit.is_fumble() {
            format!("{} to hit (natural 1)", to_hit.total)
        } else {
            format!("{} to hit", to_hit.total)
        };
        let damage_text = damage
            .as_ref()
            .map(|d| format!(", {} damage", d.total))
            .unwrap_or_default();

        Resolution::new(format!(
            "{} uses {}: {}{} (PP {}/{})",
            creature.name, attack.name, hit_text, damage_text, remaining, attack.pp.max
        ))
        .with_effect(Effect::PpSpent {
            id,
            slot,
            remaining,
        })
        .with_effect(Effect::AttackRolled {
            id,
            slot,
            to_hit,
            damage,
        })
    }

    fn resolve_set_attack(
        &self,
        state: &AppState,
        id: CreatureId,
        slot: usize,
        attack: Option<Attack>,
    ) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        let narrative = match (&attack, creature.attack(slot)) {
            (Some(new), Some(old)) => {
                format!("{} forgets {} and learns {}", creature.name, old.name, new.name)
            }
            (Some(new), None) => format!("{} learns {}", creature.name, new.name),
            (None, Some(old)) => format!("{} forgets {}", creature.name, old.name),
            (None, None) => return Resolution::new(format!("Slot {} is already empty", slot + 1)),
        };
        Resolution::new(narrative).with_effect(Effect::AttackSet { id, slot, attack })
    }

    fn resolve_restore_pp(
        &self,
        state: &AppState,
        id: CreatureId,
        slot: usize,
        amount: i32,
    ) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        let Some(attack) = creature.attack(slot) else {
            return Resolution::new(format!(
                "{} has no attack in slot {}",
                creature.name,
                slot + 1
            ));
        };
        if amount <= 0 {
            return Resolution::new("No PP restored");
        }
        let next = attack.pp.apply_delta(amount);
        let restored = next.current.saturating_sub(attack.pp.current);
        if restored == 0 {
            return Resolution::new(format!("{} already has full PP", attack.name));
        }
        Resolution::new(format!(
            "{} restores {} PP (PP {})",
            attack.name, restored, next
        ))
        .with_effect(Effect::PpRestored {
            id,
            slot,
            amount: restored,
            new_current: next.current,
        })
    }

    fn resolve_apply_status(
        &self,
        state: &AppState,
        id: CreatureId,
        slot: StatusSlot,
        effect: StatusEffect,
    ) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        if effect.condition.is_none() {
            return Resolution::new(format!(
                "{}'s {} status is cleared",
                creature.name,
                slot.name()
            ))
            .with_effect(Effect::StatusCleared { id, slot });
        }

        let duration_text = effect
            .duration
            .map(|d| format!(" for {d} turns"))
            .unwrap_or_default();
        Resolution::new(format!(
            "{} is now {}{}",
            creature.name,
            effect.condition.display_name(),
            duration_text
        ))
        .with_effect(Effect::StatusApplied { id, slot, effect })
    }

    fn resolve_remove_temporary(&self, state: &AppState, id: CreatureId, index: usize) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        match creature.temporary_effects.get(index) {
            Some(effect) => Resolution::new(format!(
                "{} is no longer {}",
                creature.name,
                effect.condition.display_name()
            ))
            .with_effect(Effect::TemporaryEffectRemoved { id, index }),
            None => Resolution::new(format!("{} has no such effect", creature.name)),
        }
    }

    fn resolve_end_turn(&self, state: &AppState, id: CreatureId) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        let mut preview = creature.clone();
        let expired = preview.tick_statuses();

        let narrative = if expired.is_empty() {
            format!("{} ends their turn", creature.name)
        } else {
            let names: Vec<String> = expired.iter().map(Condition::display_name).collect();
            format!(
                "{} ends their turn; no longer {}",
                creature.name,
                names.join(", ")
            )
        };
        Resolution::new(narrative).with_effect(Effect::TurnEnded { id, expired })
    }

    fn resolve_rest(&self, state: &AppState, id: Option<CreatureId>) -> Resolution {
        match id {
            Some(id) => match state.creature(id) {
                Some(creature) => Resolution::new(format!("{} is fully restored", creature.name))
                    .with_effect(Effect::Rested { id }),
                None => missing_creature(id),
            },
            None if state.team.is_empty() => Resolution::new("There is no one to rest"),
            None => Resolution::new("The whole team is fully restored")
                .with_effects(state.team.ids().into_iter().map(|id| Effect::Rested { id })),
        }
    }

    fn resolve_gain_experience(&self, state: &AppState, id: CreatureId, amount: u32) -> Resolution {
        let Some(creature) = state.creature(id) else {
            return missing_creature(id);
        };
        if amount == 0 {
            return Resolution::new("No experience gained");
        }

        let threshold = creature.experience_to_next.max(1);
        let total = creature.experience.saturating_add(amount);
        let experience = total % threshold;
        let level = creature.level.saturating_add(total / threshold);

        let mut resolution = Resolution::new(format!(
            "{} gains {} experience",
            creature.name, amount
        ))
        .with_effect(Effect::ExperienceGained {
            id,
            amount,
            new_total: experience,
        });

        if level != creature.level {
            resolution.narrative = format!(
                "{} gains {} experience and grows to level {}!",
                creature.name, amount, level
            );
            resolution = resolution.with_effect(Effect::LevelUp {
                id,
                new_level: level,
            });
        }
        resolution
    }

    fn resolve_use_item(&self, state: &AppState, item_id: ItemId) -> Resolution {
        let Some(trainer) = &state.trainer else {
            return no_trainer();
        };
        match trainer.find_item(&item_id) {
            Some(item) => {
                let remaining = item.quantity.saturating_sub(1);
                Resolution::new(format!("{} uses {} ({} left)", trainer.name, item.name, remaining))
                    .with_effect(Effect::ItemUsed { item_id, remaining })
            }
            None => Resolution::new(format!("{} doesn't have that item", trainer.name)),
        }
    }

    fn resolve_add_item(&self, state: &AppState, item: NewItem) -> Resolution {
        let Some(trainer) = &state.trainer else {
            return no_trainer();
        };
        if item.quantity == 0 {
            return Resolution::new(format!("{} adds nothing to the bag", trainer.name));
        }
        let item = item.into_item(ItemId::generate());
        Resolution::new(format!(
            "{} adds {} x{} to the bag",
            trainer.name, item.name, item.quantity
        ))
        .with_effect(Effect::ItemAdded { item })
    }

    fn resolve_increase_item(&self, state: &AppState, item_id: ItemId) -> Resolution {
        let Some(trainer) = &state.trainer else {
            return no_trainer();
        };
        match trainer.find_item(&item_id) {
            Some(item) => {
                let new_quantity = item.quantity.saturating_add(1);
                Resolution::new(format!("{} now x{}", item.name, new_quantity))
                    .with_effect(Effect::ItemIncreased {
                        item_id,
                        new_quantity,
                    })
            }
            None => Resolution::new(format!("{} doesn't have that item", trainer.name)),
        }
    }

    fn resolve_set_currency(&self, state: &AppState, amount: u32) -> Resolution {
        let Some(trainer) = &state.trainer else {
            return no_trainer();
        };
        if trainer.pokedollars == amount {
            return Resolution::new(format!("{} still has P{}", trainer.name, amount));
        }
        let action = if amount > trainer.pokedollars {
            "gains"
        } else {
            "spends"
        };
        Resolution::new(format!(
            "{} {} P{} (now P{})",
            trainer.name,
            action,
            amount.abs_diff(trainer.pokedollars),
            amount
        ))
        .with_effect(Effect::CurrencyChanged {
            previous: trainer.pokedollars,
            new_total: amount,
        })
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_creature(id: CreatureId) -> Resolution {
    tracing::debug!(%id, "Intent targets a creature that is not on the team");
    Resolution::new("That creature is no longer on the team")
}

fn no_trainer() -> Resolution {
    Resolution::new("No trainer has been created yet")
}

/// Resolve and apply in one step: `(state, intent) -> state'`.
pub fn reduce(mut state: AppState, intent: Intent) -> AppState {
    let resolution = RulesEngine::new().resolve(&state, intent);
    apply_effects(&mut state, &resolution.effects);
    state
}

/// Apply effects to the state.
pub fn apply_effects(state: &mut AppState, effects: &[Effect]) {
    for effect in effects {
        apply_effect(state, effect);
    }
}

/// Replace the creature under `id` with an edited copy. Unknown ids are ignored.
fn replace_creature(state: &mut AppState, id: CreatureId, edit: impl FnOnce(&mut Creature)) {
    if let Some(current) = state.team.get(id) {
        let mut next = current.clone();
        edit(&mut next);
        state.team.update(id, next);
    }
}

/// Replace the trainer with an edited copy. A missing trainer is ignored.
fn replace_trainer(state: &mut AppState, edit: impl FnOnce(&mut Trainer)) {
    if let Some(current) = &state.trainer {
        let mut next = current.clone();
        edit(&mut next);
        state.trainer = Some(next);
    }
}

fn set_pool(pool: &mut ResourcePool, new_current: i32) {
    *pool = ResourcePool::new(new_current, pool.max);
}

/// Apply a single effect to the state.
pub fn apply_effect(state: &mut AppState, effect: &Effect) {
    match effect {
        Effect::TrainerCreated { trainer } | Effect::TrainerUpdated { trainer } => {
            state.trainer = Some(trainer.clone());
        }
        Effect::TrainerDeleted => {
            state.trainer = None;
        }
        Effect::TrainerHpChanged { amount, .. } => {
            replace_trainer(state, |t| t.hp = t.hp.apply_delta(*amount));
        }
        Effect::CreatureAdded { id, creature } => {
            state.team.insert_with_id(*id, creature.clone());
        }
        Effect::CreatureUpdated { id, creature } => {
            state.team.update(*id, creature.clone());
        }
        Effect::CreatureRemoved { id } => {
            state.team.remove(*id);
        }
        Effect::HpChanged { id, amount, .. } => {
            replace_creature(state, *id, |c| c.hp = c.hp.apply_delta(*amount));
        }
        Effect::PpSpent { id, slot, .. } => {
            replace_creature(state, *id, |c| {
                if let Some(attack) = c.attack_mut(*slot) {
                    attack.pp = attack.pp.apply_delta(-1);
                }
            });
        }
        Effect::PpRestored {
            id,
            slot,
            new_current,
            ..
        } => {
            replace_creature(state, *id, |c| {
                if let Some(attack) = c.attack_mut(*slot) {
                    set_pool(&mut attack.pp, *new_current);
                }
            });
        }
        Effect::AttackRolled { .. } => {
            // Rolls are reported to the player; they change no stored state.
        }
        Effect::AttackSet { id, slot, attack } => {
            replace_creature(state, *id, |c| c.set_attack(*slot, attack.clone()));
        }
        Effect::StatusApplied { id, slot, effect } => {
            replace_creature(state, *id, |c| c.apply_status(*slot, effect.clone()));
        }
        Effect::StatusCleared { id, slot } => {
            replace_creature(state, *id, |c| c.clear_status(*slot));
        }
        Effect::TemporaryEffectRemoved { id, index } => {
            replace_creature(state, *id, |c| {
                c.remove_temporary_effect(*index);
            });
        }
        Effect::TurnEnded { id, .. } => {
            replace_creature(state, *id, |c| {
                c.tick_statuses();
            });
        }
        Effect::Rested { id } => {
            replace_creature(state, *id, |c| {
                c.hp = c.hp.restore();
                for attack in c.attacks.iter_mut().flatten() {
                    attack.pp = attack.pp.restore();
                }
                c.clear_all_statuses();
            });
        }
        Effect::ExperienceGained { id, new_total, .. } => {
            replace_creature(state, *id, |c| c.experience = *new_total);
        }
        Effect::LevelUp { id, new_level } => {
            replace_creature(state, *id, |c| c.level = *new_level);
        }
        Effect::ItemUsed { item_id, .. } => {
            replace_trainer(state, |t| t.use_item(item_id));
        }
        Effect::ItemAdded { item } => {
            replace_trainer(state, |t| t.inventory.push(item.clone()));
        }
        Effect::ItemIncreased { item_id, .. } => {
            replace_trainer(state, |t| t.increase_item(item_id));
        }
        Effect::CurrencyChanged { new_total, .. } => {
            replace_trainer(state, |t| t.set_currency(*new_total));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_creature, sample_trainer};
    use crate::world::{ItemCategory, NewItem};

    fn state_with_creature() -> (AppState, CreatureId) {
        let mut state = AppState::new();
        state.trainer = Some(sample_trainer("Ash"));
        let id = state.team.add(sample_creature("Sparky"));
        (state, id)
    }

    fn with_hp(mut state: AppState, id: CreatureId, current: i32, max: i32) -> AppState {
        if let Some(c) = state.team.get_mut(id) {
            c.hp = ResourcePool::new(current, max);
        }
        state
    }

    #[test]
    fn test_heal() {
        let (state, id) = state_with_creature();
        let state = with_hp(state, id, 60, 100);

        let state = reduce(state, Intent::HealCreature { id, amount: 20 });
        assert_eq!(state.creature(id).unwrap().hp, ResourcePool::new(80, 100));
    }

    #[test]
    fn test_damage() {
        let (state, id) = state_with_creature();
        let state = with_hp(state, id, 60, 100);

        let resolution = RulesEngine::new().resolve(&state, Intent::DamageCreature { id, amount: 15 });
        assert!(resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::HpChanged { amount, .. } if *amount == -15)));

        let state = reduce(state, Intent::DamageCreature { id, amount: 15 });
        assert_eq!(state.creature(id).unwrap().hp, ResourcePool::new(45, 100));
    }

    #[test]
    fn test_damage_to_zero_faints() {
        let (state, id) = state_with_creature();
        let state = with_hp(state, id, 10, 100);

        let resolution = RulesEngine::new().resolve(&state, Intent::DamageCreature { id, amount: 50 });
        assert!(resolution.narrative.contains("fainted"));
        assert!(resolution.effects.iter().any(|e| matches!(
            e,
            Effect::HpChanged {
                amount: -10,
                fainted: true,
                ..
            }
        )));

        let state = reduce(state, Intent::DamageCreature { id, amount: 50 });
        assert_eq!(state.creature(id).unwrap().hp.current, 0);
    }

    #[test]
    fn test_zero_amount_is_noop() {
        let (state, id) = state_with_creature();
        let engine = RulesEngine::new();
        assert!(engine
            .resolve(&state, Intent::HealCreature { id, amount: 0 })
            .is_noop());
        assert!(engine
            .resolve(&state, Intent::DamageCreature { id, amount: -4 })
            .is_noop());
    }

    #[test]
    fn test_missing_creature_renders_nothing() {
        let (state, _) = state_with_creature();
        let ghost = CreatureId::new();
        let next = reduce(state.clone(), Intent::HealCreature { id: ghost, amount: 5 });
        assert_eq!(next, state);
        let next = reduce(
            state.clone(),
            Intent::UpdateCreature {
                id: ghost,
                creature: sample_creature("Ghost"),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_perform_attack_spends_one_pp() {
        let (mut state, id) = state_with_creature();
        state.team.get_mut(id).unwrap().attacks[0] =
            Some(Attack::new("Thunder Shock", 15).with_damage_dice("1d6+2"));
        state.team.get_mut(id).unwrap().attacks[0].as_mut().unwrap().pp =
            ResourcePool::new(10, 15);

        let resolution = RulesEngine::new().resolve(
            &state,
            Intent::PerformAttack {
                id,
                slot: 0,
                advantage: Advantage::Normal,
            },
        );
        let rolled = resolution.effects.iter().find_map(|e| match e {
            Effect::AttackRolled { to_hit, damage, .. } => Some((to_hit.clone(), damage.clone())),
            _ => None,
        });
        let (to_hit, damage) = rolled.expect("attack should roll");
        assert!((1..=20).contains(&to_hit.total));
        let damage = damage.expect("damage dice should roll");
        assert!((3..=8).contains(&damage.total));

        apply_effects(&mut state, &resolution.effects);
        assert_eq!(
            state.creature(id).unwrap().attack(0).unwrap().pp,
            ResourcePool::new(9, 15)
        );
    }

    #[test]
    fn test_perform_attack_without_pp_is_noop() {
        let (mut state, id) = state_with_creature();
        let mut attack = Attack::new("Thunder Shock", 15);
        attack.pp = ResourcePool::new(0, 15);
        state.team.get_mut(id).unwrap().attacks[0] = Some(attack);

        let resolution = RulesEngine::new().resolve(
            &state,
            Intent::PerformAttack {
                id,
                slot: 0,
                advantage: Advantage::Normal,
            },
        );
        assert!(resolution.is_noop());
        assert!(resolution.narrative.contains("no PP"));

        let next = reduce(
            state.clone(),
            Intent::PerformAttack {
                id,
                slot: 0,
                advantage: Advantage::Normal,
            },
        );
        assert_eq!(next.creature(id).unwrap().attack(0).unwrap().pp.current, 0);
    }

    #[test]
    fn test_set_attack_into_empty_slot() {
        let (state, id) = state_with_creature();
        let state = reduce(
            state,
            Intent::SetAttack {
                id,
                slot: 3,
                attack: Some(Attack::new("Quick Attack", 30)),
            },
        );
        assert_eq!(
            state.creature(id).unwrap().attack(3).map(|a| a.name.as_str()),
            Some("Quick Attack")
        );
    }

    #[test]
    fn test_restore_pp_clamps() {
        let (mut state, id) = state_with_creature();
        let mut attack = Attack::new("Ember", 25);
        attack.pp = ResourcePool::new(20, 25);
        state.team.get_mut(id).unwrap().attacks[1] = Some(attack);

        let state = reduce(
            state,
            Intent::RestorePp {
                id,
                slot: 1,
                amount: 10,
            },
        );
        assert_eq!(state.creature(id).unwrap().attack(1).unwrap().pp.current, 25);
    }

    #[test]
    fn test_status_and_end_turn() {
        let (state, id) = state_with_creature();
        let state = reduce(
            state,
            Intent::ApplyStatus {
                id,
                slot: StatusSlot::Primary,
                effect: StatusEffect::new(Condition::Asleep).with_duration(1),
            },
        );
        assert!(state.creature(id).unwrap().has_condition(&Condition::Asleep));

        let resolution = RulesEngine::new().resolve(&state, Intent::EndTurn { id });
        assert!(resolution.narrative.contains("no longer Asleep"));

        let state = reduce(state, Intent::EndTurn { id });
        assert!(state.creature(id).unwrap().primary_status.is_none());
    }

    #[test]
    fn test_rest_restores_everything() {
        let (mut state, id) = state_with_creature();
        {
            let creature = state.team.get_mut(id).unwrap();
            creature.hp = ResourcePool::new(3, 40);
            let mut attack = Attack::new("Ember", 25);
            attack.pp = ResourcePool::new(0, 25);
            creature.attacks[0] = Some(attack);
            creature.apply_status(StatusSlot::Primary, StatusEffect::new(Condition::Burned));
        }

        let state = reduce(state, Intent::Rest { id: None });
        let creature = state.creature(id).unwrap();
        assert!(creature.hp.is_full());
        assert_eq!(creature.attack(0).unwrap().pp.current, 25);
        assert!(creature.primary_status.is_none());
    }

    #[test]
    fn test_experience_levels_up_with_carry_over() {
        let (mut state, id) = state_with_creature();
        {
            let creature = state.team.get_mut(id).unwrap();
            creature.level = 5;
            creature.experience = 80;
            creature.experience_to_next = 100;
        }

        let state = reduce(state, Intent::GainExperience { id, amount: 230 });
        let creature = state.creature(id).unwrap();
        assert_eq!(creature.level, 8);
        assert_eq!(creature.experience, 10);
    }

    #[test]
    fn test_experience_huge_gain_levels_in_one_step() {
        let (mut state, id) = state_with_creature();
        {
            let creature = state.team.get_mut(id).unwrap();
            creature.level = 1;
            creature.experience = 0;
            creature.experience_to_next = 1;
        }

        let state = reduce(state, Intent::GainExperience { id, amount: u32::MAX });
        let creature = state.creature(id).unwrap();
        assert_eq!(creature.level, u32::MAX);
        assert_eq!(creature.experience, 0);
    }

    #[test]
    fn test_end_turn_skips_expired_none_sentinel() {
        let (mut state, id) = state_with_creature();
        state.team.get_mut(id).unwrap().primary_status =
            Some(StatusEffect::new(Condition::None).with_duration(1));

        let resolution = RulesEngine::new().resolve(&state, Intent::EndTurn { id });
        assert!(!resolution.narrative.contains("no longer"));
        assert!(resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::TurnEnded { expired, .. } if expired.is_empty())));

        let state = reduce(state, Intent::EndTurn { id });
        assert!(state.creature(id).unwrap().primary_status.is_none());
    }

    #[test]
    fn test_add_item_with_zero_quantity_is_noop() {
        let (state, _) = state_with_creature();
        let resolution = RulesEngine::new().resolve(
            &state,
            Intent::AddItem {
                item: NewItem::new("Potion", 0),
            },
        );
        assert!(resolution.effects.is_empty());

        let before = state.trainer.as_ref().unwrap().inventory.clone();
        let state = reduce(state, Intent::AddItem { item: NewItem::new("Potion", 0) });
        assert_eq!(state.trainer.as_ref().unwrap().inventory, before);
    }

    #[test]
    fn test_inventory_flow() {
        let (state, _) = state_with_creature();
        let resolution = RulesEngine::new().resolve(
            &state,
            Intent::AddItem {
                item: NewItem::new("Potion", 1).with_category(ItemCategory::Medicine),
            },
        );
        let item_id = resolution
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::ItemAdded { item } => Some(item.id.clone()),
                _ => None,
            })
            .unwrap();
        let mut state = state;
        apply_effects(&mut state, &resolution.effects);

        let state = reduce(state, Intent::IncreaseItem { item_id: item_id.clone() });
        let state = reduce(state, Intent::UseItem { item_id: item_id.clone() });
        let quantity = state.trainer.as_ref().unwrap().find_item(&item_id).map(|i| i.quantity);
        assert_eq!(quantity, Some(1));

        let state = reduce(state, Intent::UseItem { item_id: item_id.clone() });
        assert!(state.trainer.as_ref().unwrap().find_item(&item_id).is_none());
    }

    #[test]
    fn test_set_currency() {
        let (state, _) = state_with_creature();
        let state = reduce(state, Intent::SetCurrency { amount: 1500 });
        assert_eq!(state.trainer.as_ref().unwrap().pokedollars, 1500);
    }

    #[test]
    fn test_create_trainer_only_once() {
        let state = reduce(
            AppState::new(),
            Intent::CreateTrainer {
                trainer: sample_trainer("Ash"),
            },
        );
        let state = reduce(
            state,
            Intent::CreateTrainer {
                trainer: sample_trainer("Gary"),
            },
        );
        assert_eq!(state.trainer.as_ref().unwrap().name, "Ash");

        let state = reduce(state, Intent::DeleteTrainer);
        assert!(state.trainer.is_none());
    }

    #[test]
    fn test_intent_serializes_with_tag() {
        let intent = Intent::SetCurrency { amount: 10 };
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "set-currency");
    }
}
