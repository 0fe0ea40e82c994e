//! Main application state and logic

use std::path::PathBuf;

use trainer_core::view::{CurrencyAdjust, DialogMode, HpDialog};
use trainer_core::world::CreatureId;
use trainer_core::{AppState, FileStore, Intent, Session};

use crate::commands::{self, Command};
use crate::ui::theme::Theme;
use crate::ui::widgets::log::{LogEntry, LogKind};
use crate::ui::{FocusedPanel, Overlay};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Command mode - entering : commands
    Command,
}

/// Pending pokedollar adjustment typed into the money dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyDialog {
    pub subtract: bool,
    pub input: String,
}

impl MoneyDialog {
    pub fn adjustment(&self) -> CurrencyAdjust {
        let amount = trainer_core::view::parse_amount(&self.input);
        if self.subtract {
            CurrencyAdjust::Subtract(amount)
        } else {
            CurrencyAdjust::Add(amount)
        }
    }
}

/// Main application state
pub struct App {
    pub session: Session<FileStore>,

    // UI state
    pub theme: Theme,
    pub focused_panel: FocusedPanel,
    overlay: Option<Overlay>,
    pub selected: usize,
    pub selected_slot: usize,

    // Activity log
    pub log: Vec<LogEntry>,
    pub log_scroll: usize,

    // Command input
    pub input_mode: InputMode,
    input_buffer: String,
    cursor_position: usize,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // File operations handled by the main loop
    pub pending_export: Option<PathBuf>,
    pub pending_import: Option<PathBuf>,
}

impl App {
    pub fn new(session: Session<FileStore>) -> Self {
        let mut app = Self {
            session,
            theme: Theme::default(),
            focused_panel: FocusedPanel::default(),
            overlay: None,
            selected: 0,
            selected_slot: 0,
            log: Vec::new(),
            log_scroll: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            status_message: None,
            should_quit: false,
            pending_export: None,
            pending_import: None,
        };

        let welcome = match &app.session.state().trainer {
            Some(trainer) => format!(
                "Welcome back, {}. {} creature(s) on the team.",
                trainer.name,
                app.session.state().team.len()
            ),
            None => "No trainer yet. Type :trainer <name> to begin.".to_string(),
        };
        app.add_log(welcome, LogKind::Info);
        app.add_log(
            "Press ? for help, : for commands, j/k to pick a creature".to_string(),
            LogKind::System,
        );
        app
    }

    pub fn state(&self) -> &AppState {
        self.session.state()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Id of the highlighted creature, if the team is not empty.
    pub fn selected_id(&self) -> Option<CreatureId> {
        self.state().team.ids().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.state().team.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.state().team.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_slot(&mut self, forward: bool) {
        let slots = self.session.config().attack_slots.max(1);
        self.selected_slot = if forward {
            (self.selected_slot + 1) % slots
        } else {
            (self.selected_slot + slots - 1) % slots
        };
    }

    /// Keep the selection inside the team after removals.
    fn clamp_selection(&mut self) {
        let len = self.state().team.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Send an intent through the session and log the outcome.
    pub fn dispatch(&mut self, intent: Intent) {
        let response = self.session.dispatch(intent);
        let kind = if response.changed() {
            LogKind::Action
        } else {
            LogKind::System
        };
        self.set_status(response.narrative.clone());
        self.add_log(response.narrative, kind);
        self.clamp_selection();
    }

    /// Dispatch an intent that targets the selected creature.
    pub fn dispatch_selected(&mut self, build: impl FnOnce(CreatureId) -> Intent) {
        match self.selected_id() {
            Some(id) => self.dispatch(build(id)),
            None => self.set_status("The team is empty"),
        }
    }

    /// Perform the attack in the selected slot. Disabled at 0 PP.
    pub fn perform_selected_attack(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_status("The team is empty");
            return;
        };
        let slot = self.selected_slot;
        let attack = self.session.creature(id).and_then(|c| c.attack(slot));
        match attack {
            None => self.set_status(format!("Slot {} is empty", slot + 1)),
            Some(attack) if !attack.can_perform() => {
                let name = attack.name.clone();
                self.set_status(format!("{name} has no PP left"));
            }
            Some(_) => self.dispatch(Intent::PerformAttack {
                id,
                slot,
                advantage: Default::default(),
            }),
        }
    }

    pub fn open_hp_dialog(&mut self, mode: DialogMode) {
        if self.selected_id().is_none() {
            self.set_status("The team is empty");
            return;
        }
        self.overlay = Some(Overlay::Hp(HpDialog::new(mode)));
    }

    pub fn open_money_dialog(&mut self, subtract: bool) {
        if self.state().trainer.is_none() {
            self.set_status("Create a trainer first");
            return;
        }
        self.overlay = Some(Overlay::Money(MoneyDialog {
            subtract,
            input: String::new(),
        }));
    }

    /// Close the open dialog, dispatching its intent if the amount is non-zero.
    pub fn submit_dialog(&mut self) {
        match self.overlay.take() {
            Some(Overlay::Hp(dialog)) => {
                if let Some(intent) = self.selected_id().and_then(|id| dialog.submit(id)) {
                    self.dispatch(intent);
                }
            }
            Some(Overlay::Money(dialog)) => {
                let adjustment = dialog.adjustment();
                if let Some(trainer) = &self.state().trainer {
                    if !matches!(adjustment, CurrencyAdjust::Add(0) | CurrencyAdjust::Subtract(0)) {
                        let intent = adjustment.intent(trainer);
                        self.dispatch(intent);
                    }
                }
            }
            other => self.overlay = other,
        }
    }

    /// Feed a typed character to the open dialog.
    pub fn dialog_input(&mut self, c: char) {
        match &mut self.overlay {
            Some(Overlay::Hp(dialog)) => dialog.push(c),
            Some(Overlay::Money(dialog)) if c.is_ascii_digit() => dialog.input.push(c),
            _ => {}
        }
    }

    pub fn dialog_backspace(&mut self) {
        match &mut self.overlay {
            Some(Overlay::Hp(dialog)) => dialog.backspace(),
            Some(Overlay::Money(dialog)) => {
                dialog.input.pop();
            }
            _ => {}
        }
    }

    /// Run a `:` command line.
    pub fn process_command(&mut self, command: &str) {
        let line = command.trim_start_matches(':');
        match commands::parse(line, self.state()) {
            Ok(Command::Dispatch(intent)) => self.dispatch(intent),
            Ok(Command::Catch(creature)) => {
                let name = creature.name.clone();
                match self.session.add_creature(creature) {
                    Ok(id) => {
                        let ids = self.state().team.ids();
                        self.selected = ids.iter().position(|x| *x == id).unwrap_or(0);
                        self.add_log(format!("{name} joins the team"), LogKind::Action);
                        self.set_status(format!("Caught {name}"));
                    }
                    Err(e) => self.set_status(e.to_string()),
                }
            }
            Ok(Command::Show) => self.focused_panel = FocusedPanel::Creature,
            Ok(Command::Export(path)) => {
                self.set_status("Exporting...");
                self.pending_export = Some(path);
            }
            Ok(Command::Import(path)) => {
                self.set_status("Importing...");
                self.pending_import = Some(path);
            }
            Ok(Command::Reset) => match self.session.reset() {
                Ok(()) => {
                    self.selected = 0;
                    self.add_log("Started over".to_string(), LogKind::System);
                    self.set_status("State reset");
                }
                Err(e) => self.set_status(format!("Reset failed: {e}")),
            },
            Ok(Command::Help) => self.toggle_help(),
            Ok(Command::Quit) => self.should_quit = true,
            Err(message) => self.set_status(message),
        }
    }

    /// Swap in an imported state.
    pub fn replace_state(&mut self, state: AppState) {
        self.session.replace_state(state);
        self.selected = 0;
        self.selected_slot = 0;
    }

    // =========================================================================
    // Log
    // =========================================================================

    pub fn add_log(&mut self, content: String, kind: LogKind) {
        self.log.push(LogEntry { content, kind });
        self.log_scroll = usize::MAX / 2;
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        let max = self.log.len().saturating_sub(1);
        self.log_scroll = self.log_scroll.min(max).saturating_sub(lines);
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.log_scroll = self.log_scroll.saturating_add(lines);
    }

    // =========================================================================
    // Command input
    // =========================================================================

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.input_buffer.clear();
        self.input_buffer.push(':');
        self.cursor_position = 1;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.clear_input();
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    // =========================================================================
    // Overlays and status
    // =========================================================================

    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Cycle to next focused panel
    pub fn cycle_focus(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Team => FocusedPanel::Creature,
            FocusedPanel::Creature => FocusedPanel::Trainer,
            FocusedPanel::Trainer => FocusedPanel::Log,
            FocusedPanel::Log => FocusedPanel::Team,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trainer_core::SessionConfig;

    fn test_app(dir: &TempDir) -> App {
        let store = FileStore::open(dir.path()).expect("Failed to open store");
        let mut app = App::new(Session::new(SessionConfig::new(), store));
        app.process_command(":trainer Ash");
        app
    }

    fn selected_hp(app: &App) -> Option<i32> {
        app.selected_id()
            .and_then(|id| app.state().creature(id))
            .map(|c| c.hp.current)
    }

    #[test]
    fn test_catch_selects_new_creature() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.process_command(":catch Sparky Electric 5 40");
        app.process_command(":catch Bolt Electric 3 25");

        let name = app
            .selected_id()
            .and_then(|id| app.state().creature(id))
            .map(|c| c.name.clone());
        assert_eq!(name.as_deref(), Some("Bolt"));
    }

    #[test]
    fn test_selection_clamps_after_release() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.process_command(":catch Sparky Electric 5 40");
        app.process_command(":catch Bolt Electric 3 25");
        app.selected = 1;

        app.dispatch_selected(|id| Intent::RemoveCreature { id });
        assert_eq!(app.selected, 0);
        assert!(app.selected_id().is_some());

        app.dispatch_selected(|id| Intent::RemoveCreature { id });
        assert_eq!(app.selected, 0);
        assert!(app.selected_id().is_none());
    }

    #[test]
    fn test_select_next_and_prev_wrap() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.select_next();
        assert_eq!(app.selected, 0);

        app.process_command(":catch Sparky Electric 5 40");
        app.process_command(":catch Bolt Electric 3 25");
        app.selected = 1;
        app.select_next();
        assert_eq!(app.selected, 0);
        app.select_prev();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_empty_hp_dialog_closes_without_change() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.process_command(":catch Bolt Electric 3 25");

        app.open_hp_dialog(DialogMode::Damage);
        assert!(app.has_overlay());
        app.submit_dialog();

        assert!(!app.has_overlay());
        assert_eq!(selected_hp(&app), Some(25));
    }

    #[test]
    fn test_hp_dialog_applies_amount() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.process_command(":catch Bolt Electric 3 25");

        app.open_hp_dialog(DialogMode::Damage);
        app.dialog_input('7');
        app.submit_dialog();
        assert_eq!(selected_hp(&app), Some(18));

        app.open_hp_dialog(DialogMode::Heal);
        app.dialog_input('-');
        app.dialog_input('3');
        app.submit_dialog();
        assert_eq!(selected_hp(&app), Some(18));
    }

    #[test]
    fn test_money_dialog_spend_clamps_at_zero() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.process_command(":money 300");

        app.open_money_dialog(true);
        for c in "500".chars() {
            app.dialog_input(c);
        }
        app.submit_dialog();

        let balance = app.state().trainer.as_ref().map(|t| t.pokedollars);
        assert_eq!(balance, Some(0));
    }

    #[test]
    fn test_hp_dialog_needs_a_creature() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.open_hp_dialog(DialogMode::Heal);
        assert!(!app.has_overlay());
        assert_eq!(app.status_message(), Some("The team is empty"));
    }
}
