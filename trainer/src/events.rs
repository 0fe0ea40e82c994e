//! Event handling for the trainer TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use trainer_core::view::DialogMode;
use trainer_core::Intent;

use crate::app::{App, InputMode};
use crate::ui::{FocusedPanel, Overlay};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_log_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_log_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Char('q') => return EventResult::Quit,
        KeyCode::Tab => app.cycle_focus(),

        // Navigation: the log scrolls when focused, otherwise j/k pick a creature
        KeyCode::Char('j') | KeyCode::Down => {
            if app.focused_panel == FocusedPanel::Log {
                app.scroll_log_down(1);
            } else {
                app.select_next();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.focused_panel == FocusedPanel::Log {
                app.scroll_log_up(1);
            } else {
                app.select_prev();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => app.select_slot(true),
        KeyCode::Char('h') | KeyCode::Left => app.select_slot(false),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(index) = c.to_digit(10) {
                let len = app.state().team.len();
                let index = index as usize - 1;
                if index < len {
                    app.selected = index;
                }
            }
        }

        // Creature actions
        KeyCode::Char('+') | KeyCode::Char('H') => app.open_hp_dialog(DialogMode::Heal),
        KeyCode::Char('-') | KeyCode::Char('D') => app.open_hp_dialog(DialogMode::Damage),
        KeyCode::Char('a') | KeyCode::Enter => app.perform_selected_attack(),
        KeyCode::Char('e') => app.dispatch_selected(|id| Intent::EndTurn { id }),
        KeyCode::Char('r') => app.dispatch_selected(|id| Intent::Rest { id: Some(id) }),
        KeyCode::Char('R') => app.dispatch(Intent::Rest { id: None }),
        KeyCode::Char('x') => app.dispatch_selected(|id| Intent::RemoveCreature { id }),

        // Trainer actions
        KeyCode::Char('$') => app.open_money_dialog(false),
        KeyCode::Char('S') => app.open_money_dialog(true),

        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys in COMMAND mode (: commands)
fn handle_command_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => app.enter_normal_mode(),
        KeyCode::Enter => {
            let command = app.input_buffer().to_string();
            app.enter_normal_mode();

            if command.len() > 1 {
                app.process_command(&command);
            }

            if app.should_quit {
                return EventResult::Quit;
            }
        }
        KeyCode::Left => {
            if app.cursor_position() > 1 {
                app.cursor_left();
            }
        }
        KeyCode::Right => app.cursor_right(),
        KeyCode::Backspace => {
            if app.cursor_position() > 1 {
                app.backspace();
            } else {
                // Backspace on just ":" exits command mode
                app.enter_normal_mode();
            }
        }
        KeyCode::Char(c) => app.type_char(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle key when overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    let is_dialog = matches!(app.overlay(), Some(Overlay::Hp(_) | Overlay::Money(_)));

    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Enter if is_dialog => app.submit_dialog(),
        KeyCode::Backspace if is_dialog => app.dialog_backspace(),
        KeyCode::Char(c) if is_dialog => app.dialog_input(c),
        KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => app.close_overlay(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}
