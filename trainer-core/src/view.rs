//! Front-end view models.
//!
//! Small pieces of presentation logic that every front end needs and that
//! are worth testing without a terminal: numeric input parsing, the HP
//! dialog, currency adjustment, attack slot rows and the team cap.

use crate::rules::Intent;
use crate::team::TeamRegistry;
use crate::world::{Creature, CreatureId, ResourcePool, Trainer};

pub use crate::status::{status_badges, StatusBadge};

/// Parse a user-entered amount.
///
/// Unparseable and negative input are treated as 0.
pub fn parse_amount(input: &str) -> u32 {
    input.trim().parse::<i64>().map_or(0, |n| {
        u32::try_from(n.max(0)).unwrap_or(u32::MAX)
    })
}

// ============================================================================
// HP Dialog
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Heal,
    Damage,
}

impl DialogMode {
    pub fn title(&self) -> &'static str {
        match self {
            DialogMode::Heal => "Heal",
            DialogMode::Damage => "Damage",
        }
    }
}

/// Pending heal/damage amount for one creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpDialog {
    pub mode: DialogMode,
    pub input: String,
}

impl HpDialog {
    pub fn new(mode: DialogMode) -> Self {
        Self {
            mode,
            input: String::new(),
        }
    }

    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '-' && self.input.is_empty()) {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Close the dialog. A zero amount yields no intent.
    pub fn submit(self, id: CreatureId) -> Option<Intent> {
        let amount = parse_amount(&self.input);
        if amount == 0 {
            return None;
        }
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        Some(match self.mode {
            DialogMode::Heal => Intent::HealCreature { id, amount },
            DialogMode::Damage => Intent::DamageCreature { id, amount },
        })
    }
}

// ============================================================================
// Currency
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyAdjust {
    Add(u32),
    Subtract(u32),
}

impl CurrencyAdjust {
    /// The new balance, never below zero.
    pub fn apply(self, balance: u32) -> u32 {
        match self {
            CurrencyAdjust::Add(n) => balance.saturating_add(n),
            CurrencyAdjust::Subtract(n) => balance.saturating_sub(n),
        }
    }

    pub fn intent(self, trainer: &Trainer) -> Intent {
        Intent::SetCurrency {
            amount: self.apply(trainer.pokedollars),
        }
    }
}

// ============================================================================
// Attack Slots
// ============================================================================

/// One row of a creature's attack list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackSlotView {
    Filled {
        index: usize,
        name: String,
        pp: ResourcePool,
        can_perform: bool,
    },
    Empty {
        index: usize,
    },
}

impl AttackSlotView {
    pub fn index(&self) -> usize {
        match self {
            AttackSlotView::Filled { index, .. } | AttackSlotView::Empty { index } => *index,
        }
    }
}

/// Rows for the first `count` slots; missing slots render as empty.
pub fn attack_slots(creature: &Creature, count: usize) -> Vec<AttackSlotView> {
    creature
        .attack_slots(count)
        .into_iter()
        .enumerate()
        .map(|(index, attack)| match attack {
            Some(attack) => AttackSlotView::Filled {
                index,
                name: attack.name.clone(),
                pp: attack.pp,
                can_perform: attack.can_perform(),
            },
            None => AttackSlotView::Empty { index },
        })
        .collect()
}

// ============================================================================
// Team Policy
// ============================================================================

/// How many creatures a trainer may carry. The registry itself is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamPolicy {
    pub cap: usize,
}

impl TeamPolicy {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn can_add(&self, team: &TeamRegistry) -> bool {
        team.len() < self.cap
    }

    pub fn open_slots(&self, team: &TeamRegistry) -> usize {
        self.cap.saturating_sub(team.len())
    }
}

impl Default for TeamPolicy {
    fn default() -> Self {
        Self::new(6)
    }
}
