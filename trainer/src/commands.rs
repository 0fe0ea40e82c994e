//! Text commands shared by headless mode and the TUI's `:` prompt.
//!
//! Creatures are addressed by their 1-based position in the team list and
//! inventory rows by their 1-based position in the bag.

use std::path::PathBuf;

use trainer_core::dice::Advantage;
use trainer_core::status::{Condition, StatusEffect, StatusSlot};
use trainer_core::view::{parse_amount, CurrencyAdjust};
use trainer_core::world::{
    AbilityScores, Attack, Creature, CreatureId, ItemCategory, NewItem, ResourcePool, Trainer,
};
use trainer_core::{AppState, Intent};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Resolve through the rules engine
    Dispatch(Intent),
    /// Add a creature, subject to the team cap
    Catch(Creature),
    Show,
    Export(PathBuf),
    Import(PathBuf),
    Reset,
    Help,
    Quit,
}

/// Default export path for `:w`/`save` without an argument.
pub const DEFAULT_EXPORT: &str = "trainer-export.json";

pub const HELP: &[(&str, &str)] = &[
    ("trainer <name> [class]", "Create the trainer"),
    ("catch <name> <type> <level> <max-hp>", "Add a creature to the team"),
    ("release <n>", "Remove creature n"),
    ("heal <n> <amount>", "Heal creature n"),
    ("damage <n> <amount>", "Damage creature n"),
    ("attack <n> <slot> [adv|dis]", "Perform an attack, spending 1 PP"),
    ("learn <n> <slot> <pp> <name...>", "Put an attack in a slot"),
    ("forget <n> <slot>", "Empty an attack slot"),
    ("pp <n> <slot> <amount>", "Restore PP"),
    ("status <n> <primary|confusion|temporary> <tag> [turns]", "Apply a status"),
    ("clear <n> <primary|confusion|temporary>", "Clear a status slot"),
    ("tick <n>", "End creature n's turn"),
    ("rest [n]", "Fully restore one creature or the team"),
    ("xp <n> <amount>", "Award experience"),
    ("item add <qty> <name...>", "Add an inventory row"),
    ("item use <i>", "Use one of item i"),
    ("item more <i>", "Add one to item i"),
    ("money <amount|+amount|-amount>", "Set or adjust pokedollars"),
    ("hp <+amount|-amount>", "Adjust the trainer's HP"),
    ("show", "Print the current state"),
    ("save [path]", "Export a snapshot"),
    ("load [path]", "Import a snapshot"),
    ("reset", "Start over with an empty state"),
    ("quit", "Exit"),
];

/// Parse one command line against the current state.
pub fn parse(line: &str, state: &AppState) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = parts.split_first() else {
        return Err("Empty command".to_string());
    };

    match head.to_lowercase().as_str() {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "h" | "help" | "?" => Ok(Command::Help),
        "show" | "ls" => Ok(Command::Show),
        "reset" => Ok(Command::Reset),
        "w" | "save" | "export" => Ok(Command::Export(path_arg(args))),
        "e" | "load" | "import" => Ok(Command::Import(path_arg(args))),
        "trainer" | "new" => {
            let name = args.first().ok_or("Usage: trainer <name> [class]")?;
            let class = args.get(1).copied().unwrap_or("Trainer");
            Ok(Command::Dispatch(Intent::CreateTrainer {
                trainer: new_trainer(name, class),
            }))
        }
        "catch" => {
            let [name, type_tag, level, max_hp] = args else {
                return Err("Usage: catch <name> <type> <level> <max-hp>".to_string());
            };
            Ok(Command::Catch(new_creature(
                name,
                type_tag,
                parse_amount(level).max(1),
                to_i32(parse_amount(max_hp)),
            )))
        }
        "release" => {
            let id = creature_arg(args, 0, state)?;
            Ok(Command::Dispatch(Intent::RemoveCreature { id }))
        }
        "heal" => {
            let id = creature_arg(args, 0, state)?;
            let amount = to_i32(amount_arg(args, 1)?);
            Ok(Command::Dispatch(Intent::HealCreature { id, amount }))
        }
        "damage" | "dmg" => {
            let id = creature_arg(args, 0, state)?;
            let amount = to_i32(amount_arg(args, 1)?);
            Ok(Command::Dispatch(Intent::DamageCreature { id, amount }))
        }
        "attack" | "atk" => {
            let id = creature_arg(args, 0, state)?;
            let slot = slot_arg(args, 1)?;
            let advantage = match args.get(2).copied() {
                Some("adv") => Advantage::Advantage,
                Some("dis") => Advantage::Disadvantage,
                _ => Advantage::Normal,
            };
            Ok(Command::Dispatch(Intent::PerformAttack {
                id,
                slot,
                advantage,
            }))
        }
        "learn" => {
            let id = creature_arg(args, 0, state)?;
            let slot = slot_arg(args, 1)?;
            let pp = to_i32(amount_arg(args, 2)?);
            let name = args.get(3..).map(|rest| rest.join(" ")).unwrap_or_default();
            if name.is_empty() {
                return Err("Usage: learn <n> <slot> <pp> <name...>".to_string());
            }
            Ok(Command::Dispatch(Intent::SetAttack {
                id,
                slot,
                attack: Some(Attack::new(name, pp)),
            }))
        }
        "forget" => {
            let id = creature_arg(args, 0, state)?;
            let slot = slot_arg(args, 1)?;
            Ok(Command::Dispatch(Intent::SetAttack {
                id,
                slot,
                attack: None,
            }))
        }
        "pp" => {
            let id = creature_arg(args, 0, state)?;
            let slot = slot_arg(args, 1)?;
            let amount = to_i32(amount_arg(args, 2)?);
            Ok(Command::Dispatch(Intent::RestorePp { id, slot, amount }))
        }
        "status" => {
            let id = creature_arg(args, 0, state)?;
            let slot = status_slot_arg(args, 1)?;
            let tag = args
                .get(2)
                .ok_or("Usage: status <n> <slot> <tag> [turns]")?;
            let mut effect = StatusEffect::new(Condition::from_tag(&tag.to_lowercase()));
            if let Some(turns) = args.get(3) {
                effect = effect.with_duration(parse_amount(turns));
            }
            Ok(Command::Dispatch(Intent::ApplyStatus { id, slot, effect }))
        }
        "clear" => {
            let id = creature_arg(args, 0, state)?;
            let slot = status_slot_arg(args, 1)?;
            Ok(Command::Dispatch(Intent::ClearStatus { id, slot }))
        }
        "tick" | "end" => {
            let id = creature_arg(args, 0, state)?;
            Ok(Command::Dispatch(Intent::EndTurn { id }))
        }
        "rest" => {
            let id = match args.first() {
                Some(_) => Some(creature_arg(args, 0, state)?),
                None => None,
            };
            Ok(Command::Dispatch(Intent::Rest { id }))
        }
        "xp" => {
            let id = creature_arg(args, 0, state)?;
            let amount = amount_arg(args, 1)?;
            Ok(Command::Dispatch(Intent::GainExperience { id, amount }))
        }
        "item" => parse_item(args, state),
        "money" | "$" => {
            let raw = args.first().ok_or("Usage: money <amount|+amount|-amount>")?;
            let trainer = state.trainer.as_ref().ok_or("Create a trainer first")?;
            let intent = if let Some(n) = raw.strip_prefix('+') {
                CurrencyAdjust::Add(parse_amount(n)).intent(trainer)
            } else if let Some(n) = raw.strip_prefix('-') {
                CurrencyAdjust::Subtract(parse_amount(n)).intent(trainer)
            } else {
                Intent::SetCurrency {
                    amount: parse_amount(raw),
                }
            };
            Ok(Command::Dispatch(intent))
        }
        "hp" => {
            let raw = args.first().ok_or("Usage: hp <+amount|-amount>")?;
            let delta = match raw.strip_prefix('-') {
                Some(n) => to_i32(parse_amount(n)).saturating_neg(),
                None => to_i32(parse_amount(raw.trim_start_matches('+'))),
            };
            Ok(Command::Dispatch(Intent::AdjustTrainerHp { delta }))
        }
        other => Err(format!("Unknown command: {other}")),
    }
}

fn parse_item(args: &[&str], state: &AppState) -> Result<Command, String> {
    let trainer = state.trainer.as_ref().ok_or("Create a trainer first")?;
    match args.first().copied() {
        Some("add") => {
            let quantity = amount_arg(args, 1)?.max(1);
            let name = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
            if name.is_empty() {
                return Err("Usage: item add <qty> <name...>".to_string());
            }
            let category = guess_category(&name);
            Ok(Command::Dispatch(Intent::AddItem {
                item: NewItem::new(name, quantity).with_category(category),
            }))
        }
        Some(action @ ("use" | "more")) => {
            let index = amount_arg(args, 1)? as usize;
            let item = index
                .checked_sub(1)
                .and_then(|i| trainer.inventory.get(i))
                .ok_or_else(|| format!("No item #{index}"))?;
            let item_id = item.id.clone();
            Ok(Command::Dispatch(if action == "use" {
                Intent::UseItem { item_id }
            } else {
                Intent::IncreaseItem { item_id }
            }))
        }
        _ => Err("Usage: item <add|use|more> ...".to_string()),
    }
}

fn guess_category(name: &str) -> ItemCategory {
    let lower = name.to_lowercase();
    if lower.contains("ball") {
        ItemCategory::Ball
    } else if lower.contains("berry") {
        ItemCategory::Berry
    } else if lower.contains("potion") || lower.contains("heal") || lower.contains("revive") {
        ItemCategory::Medicine
    } else {
        ItemCategory::Other
    }
}

fn path_arg(args: &[&str]) -> PathBuf {
    PathBuf::from(args.first().copied().unwrap_or(DEFAULT_EXPORT))
}

/// Resolve a 1-based team position to an id.
fn creature_arg(args: &[&str], pos: usize, state: &AppState) -> Result<CreatureId, String> {
    let raw = args.get(pos).ok_or("Missing creature number")?;
    let index = parse_amount(raw) as usize;
    if let Some(id) = index
        .checked_sub(1)
        .and_then(|i| state.team.ids().get(i).copied())
    {
        return Ok(id);
    }
    state
        .team
        .find_by_name(raw)
        .ok_or_else(|| format!("No creature '{raw}'"))
}

fn slot_arg(args: &[&str], pos: usize) -> Result<usize, String> {
    let slot = amount_arg(args, pos)? as usize;
    slot.checked_sub(1)
        .ok_or_else(|| "Attack slots start at 1".to_string())
}

fn amount_arg(args: &[&str], pos: usize) -> Result<u32, String> {
    args.get(pos)
        .map(|raw| parse_amount(raw))
        .ok_or_else(|| format!("Missing argument {}", pos + 1))
}

/// Amounts beyond `i32::MAX` saturate.
fn to_i32(amount: u32) -> i32 {
    i32::try_from(amount).unwrap_or(i32::MAX)
}

fn status_slot_arg(args: &[&str], pos: usize) -> Result<StatusSlot, String> {
    match args.get(pos).map(|s| s.to_lowercase()).as_deref() {
        Some("primary" | "p") => Ok(StatusSlot::Primary),
        Some("confusion" | "c") => Ok(StatusSlot::Confusion),
        Some("temporary" | "temp" | "t") => Ok(StatusSlot::Temporary),
        _ => Err("Status slot must be primary, confusion or temporary".to_string()),
    }
}

/// A fresh level 1 trainer.
pub fn new_trainer(name: &str, class: &str) -> Trainer {
    Trainer {
        name: name.to_string(),
        level: 1,
        class: class.to_string(),
        attributes: AbilityScores::default(),
        hp: ResourcePool::full(20),
        inventory: Vec::new(),
        pokedollars: 0,
    }
}

/// A fresh creature with four empty attack slots.
pub fn new_creature(name: &str, type_tag: &str, level: u32, max_hp: i32) -> Creature {
    Creature {
        name: name.to_string(),
        type_tag: type_tag.to_string(),
        level,
        hp: ResourcePool::full(max_hp),
        experience: 0,
        experience_to_next: level.saturating_mul(100).max(100),
        attributes: AbilityScores::default(),
        attacks: vec![None; 4],
        primary_status: None,
        confusion: None,
        temporary_effects: Vec::new(),
    }
}
