//! Status conditions on creatures.
//!
//! A creature carries three independent slots: one primary status (burn,
//! poison, sleep, ...), one confusion slot, and an ordered list of temporary
//! effects such as flinching. Each effect may count down a remaining duration.

use crate::world::Creature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A condition tag.
///
/// Serialized as its literal tag. `none` is a stored sentinel meaning "no
/// effect"; it round-trips but is never displayed. Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    None,
    Burned,
    Poisoned,
    BadlyPoisoned,
    Asleep,
    Paralyzed,
    Frozen,
    Confused,
    Flinched,
    Infatuated,
    Custom(String),
}

impl Condition {
    /// The stored tag.
    pub fn tag(&self) -> &str {
        match self {
            Condition::None => "none",
            Condition::Burned => "burned",
            Condition::Poisoned => "poisoned",
            Condition::BadlyPoisoned => "badly-poisoned",
            Condition::Asleep => "asleep",
            Condition::Paralyzed => "paralyzed",
            Condition::Frozen => "frozen",
            Condition::Confused => "confused",
            Condition::Flinched => "flinched",
            Condition::Infatuated => "infatuated",
            Condition::Custom(tag) => tag.as_str(),
        }
    }

    /// Parse a tag. Matching is exact so unknown tags round-trip unchanged.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "none" => Condition::None,
            "burned" => Condition::Burned,
            "poisoned" => Condition::Poisoned,
            "badly-poisoned" => Condition::BadlyPoisoned,
            "asleep" => Condition::Asleep,
            "paralyzed" => Condition::Paralyzed,
            "frozen" => Condition::Frozen,
            "confused" => Condition::Confused,
            "flinched" => Condition::Flinched,
            "infatuated" => Condition::Infatuated,
            other => Condition::Custom(other.to_string()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Condition::None)
    }

    /// Badge text: the tag with its first letter capitalised.
    ///
    /// `badly-poisoned` is the one compound tag and reads "Badly Poisoned".
    pub fn display_name(&self) -> String {
        match self {
            Condition::BadlyPoisoned => "Badly Poisoned".to_string(),
            other => capitalize(other.tag()),
        }
    }

    /// Conditions that belong in the primary slot.
    pub fn primary() -> [Condition; 6] {
        [
            Condition::Burned,
            Condition::Poisoned,
            Condition::BadlyPoisoned,
            Condition::Asleep,
            Condition::Paralyzed,
            Condition::Frozen,
        ]
    }
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<String> for Condition {
    fn from(tag: String) -> Self {
        Condition::from_tag(&tag)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.tag().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// A condition with its remaining duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub condition: Condition,
    /// Remaining turns; `None` is indefinite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub turns_active: u32,
}

impl StatusEffect {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            duration: None,
            turns_active: 0,
        }
    }

    pub fn with_duration(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }

    /// Advance one turn. Returns false once the effect has run out.
    fn tick(&mut self) -> bool {
        self.turns_active = self.turns_active.saturating_add(1);
        match self.duration.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining > 0
            }
            None => true,
        }
    }
}

/// Which status slot an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusSlot {
    Primary,
    Confusion,
    Temporary,
}

impl StatusSlot {
    pub fn name(&self) -> &'static str {
        match self {
            StatusSlot::Primary => "primary",
            StatusSlot::Confusion => "confusion",
            StatusSlot::Temporary => "temporary",
        }
    }
}

impl Creature {
    /// Put an effect into a slot.
    ///
    /// Primary and confusion are replaced; temporary effects are appended,
    /// duplicates included. A `none` condition clears the slot instead.
    pub fn apply_status(&mut self, slot: StatusSlot, effect: StatusEffect) {
        if effect.condition.is_none() {
            self.clear_status(slot);
            return;
        }
        match slot {
            StatusSlot::Primary => self.primary_status = Some(effect),
            StatusSlot::Confusion => self.confusion = Some(effect),
            StatusSlot::Temporary => self.temporary_effects.push(effect),
        }
    }

    pub fn clear_status(&mut self, slot: StatusSlot) {
        match slot {
            StatusSlot::Primary => self.primary_status = None,
            StatusSlot::Confusion => self.confusion = None,
            StatusSlot::Temporary => self.temporary_effects.clear(),
        }
    }

    /// Remove one temporary effect by position. Out-of-range is a no-op.
    pub fn remove_temporary_effect(&mut self, index: usize) -> Option<StatusEffect> {
        (index < self.temporary_effects.len()).then(|| self.temporary_effects.remove(index))
    }

    pub fn clear_all_statuses(&mut self) {
        self.primary_status = None;
        self.confusion = None;
        self.temporary_effects.clear();
    }

    /// End-of-turn bookkeeping.
    ///
    /// Counted effects lose a turn and expire at zero. Temporary effects
    /// without a count last a single turn.
    pub fn tick_statuses(&mut self) -> Vec<Condition> {
        let mut expired = Vec::new();

        for slot in [&mut self.primary_status, &mut self.confusion] {
            if let Some(effect) = slot.as_mut() {
                if !effect.tick() {
                    if effect.condition != Condition::None {
                        expired.push(effect.condition.clone());
                    }
                    *slot = None;
                }
            }
        }

        self.temporary_effects.retain_mut(|effect| {
            let single_turn = effect.duration.is_none();
            if effect.tick() && !single_turn {
                true
            } else {
                if effect.condition != Condition::None {
                    expired.push(effect.condition.clone());
                }
                false
            }
        });

        expired
    }

    /// All stored effects in display order, sentinels included.
    pub fn statuses(&self) -> impl Iterator<Item = (StatusSlot, &StatusEffect)> {
        let primary = self
            .primary_status
            .iter()
            .map(|e| (StatusSlot::Primary, e));
        let confusion = self.confusion.iter().map(|e| (StatusSlot::Confusion, e));
        let temporary = self
            .temporary_effects
            .iter()
            .map(|e| (StatusSlot::Temporary, e));
        primary.chain(confusion).chain(temporary)
    }

    pub fn has_condition(&self, condition: &Condition) -> bool {
        self.statuses().any(|(_, e)| &e.condition == condition)
    }
}

/// One rendered status badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub slot: StatusSlot,
    pub label: String,
    /// Shown only when present; zero is shown as zero.
    pub duration: Option<u32>,
}

/// Badges for a creature: primary, confusion, then temporary in list order.
///
/// The `none` sentinel is filtered out. Repeated temporary conditions stay
/// separate badges.
pub fn status_badges(creature: &Creature) -> Vec<StatusBadge> {
    creature
        .statuses()
        .filter(|(_, effect)| !effect.condition.is_none())
        .map(|(slot, effect)| StatusBadge {
            slot,
            label: effect.condition.display_name(),
            duration: effect.duration,
        })
        .collect()
}
