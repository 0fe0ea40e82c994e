//! Headless mode for the trainer companion.
//!
//! Reads one command per line from stdin and prints the outcome. Designed
//! for scripting and automated testing.

use std::io::{self, BufRead, Write};

use trainer_core::view::{attack_slots, status_badges, AttackSlotView};
use trainer_core::{AppState, FileStore, SavedState, Session, SessionError};

use crate::commands::{self, Command};

/// Run the command loop until `quit` or end of input.
///
/// Output lines are tagged:
/// - `[OK]` the command changed state
/// - `[NOOP]` the command was understood but changed nothing
/// - `[ERROR]` the command could not be run
pub async fn run_headless(mut session: Session<FileStore>) -> Result<(), SessionError> {
    println!("=== Trainer Companion Headless Mode ===");
    match &session.state().trainer {
        Some(trainer) => println!(
            "Trainer: {} (Level {} {}), team of {}",
            trainer.name,
            trainer.level,
            trainer.class,
            session.state().team.len()
        ),
        None => println!("No trainer yet. Start with: trainer <name> [class]"),
    }
    println!("Type 'help' for commands.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match commands::parse(line, session.state()) {
            Ok(Command::Quit) => {
                println!("Goodbye!");
                break;
            }
            Ok(Command::Dispatch(intent)) => {
                let response = session.dispatch(intent);
                let tag = if response.changed() { "[OK]" } else { "[NOOP]" };
                println!("{tag} {}", response.narrative);
            }
            Ok(Command::Catch(creature)) => {
                let name = creature.name.clone();
                match session.add_creature(creature) {
                    Ok(_) => println!("[OK] {name} joins the team"),
                    Err(e) => println!("[ERROR] {e}"),
                }
            }
            Ok(Command::Show) => {
                for line in describe_state(session.state()) {
                    println!("{line}");
                }
            }
            Ok(Command::Export(path)) => {
                let saved = SavedState::new(session.state().clone());
                match saved.save_json(&path).await {
                    Ok(()) => println!("[OK] Exported to {}", path.display()),
                    Err(e) => println!("[ERROR] Export failed: {e}"),
                }
            }
            Ok(Command::Import(path)) => match SavedState::load_json(&path).await {
                Ok(saved) => {
                    session.replace_state(saved.state);
                    println!("[OK] Imported from {}", path.display());
                }
                Err(e) => println!("[ERROR] Import failed: {e}"),
            },
            Ok(Command::Reset) => match session.reset() {
                Ok(()) => println!("[OK] State reset"),
                Err(e) => println!("[ERROR] Reset failed: {e}"),
            },
            Ok(Command::Help) => {
                println!("[HELP]");
                for (usage, description) in commands::HELP {
                    println!("  {usage:<56} {description}");
                }
            }
            Err(message) => println!("[ERROR] {message}"),
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Plain-text rendering of the whole state for `show`.
pub fn describe_state(state: &AppState) -> Vec<String> {
    let mut lines = vec!["[STATE]".to_string()];

    match &state.trainer {
        Some(trainer) => {
            lines.push(format!(
                "  Trainer: {} (Level {} {}) HP {} P{}",
                trainer.name, trainer.level, trainer.class, trainer.hp, trainer.pokedollars
            ));
            for (i, item) in trainer.inventory.iter().enumerate() {
                lines.push(format!("    {}. {} x{}", i + 1, item.name, item.quantity));
            }
        }
        None => lines.push("  Trainer: none".to_string()),
    }

    if state.team.is_empty() {
        lines.push("  Team: empty".to_string());
    }
    for (i, (_, creature)) in state.team.iter().enumerate() {
        let mut line = format!(
            "  {}. {} Lv {} {} HP {} XP {}/{}",
            i + 1,
            creature.name,
            creature.level,
            creature.type_tag,
            creature.hp,
            creature.experience,
            creature.experience_to_next
        );
        let badges: Vec<String> = status_badges(creature)
            .into_iter()
            .map(|badge| badge.label)
            .collect();
        if !badges.is_empty() {
            line.push_str(&format!(" [{}]", badges.join(", ")));
        }
        if creature.is_fainted() {
            line.push_str(" FAINTED");
        }
        lines.push(line);

        for slot in attack_slots(creature, creature.attacks.len()) {
            if let AttackSlotView::Filled {
                index, name, pp, ..
            } = slot
            {
                lines.push(format!("       {}: {name} PP {pp}", index + 1));
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_core::status::{Condition, StatusEffect};
    use trainer_core::testing::{sample_creature, sample_trainer};

    #[test]
    fn test_describe_empty_state() {
        let lines = describe_state(&AppState::new());
        assert_eq!(lines[0], "[STATE]");
        assert!(lines.contains(&"  Trainer: none".to_string()));
        assert!(lines.contains(&"  Team: empty".to_string()));
    }

    #[test]
    fn test_describe_shows_badges_and_attacks() {
        let mut state = AppState::new();
        state.trainer = Some(sample_trainer("Red"));
        let mut creature = sample_creature("Sparky");
        creature.primary_status = Some(StatusEffect::new(Condition::BadlyPoisoned));
        state.team.add(creature);

        let text = describe_state(&state).join("\n");
        assert!(text.contains("Trainer: Red"));
        assert!(text.contains("1. Sparky Lv 5"));
        assert!(text.contains("[Badly Poisoned]"));
        assert!(text.contains("1: Tackle PP 35/35"));
        assert!(text.contains("x2"));
    }
}
