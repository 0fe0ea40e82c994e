//! Render orchestration for the trainer TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use trainer_core::view::{CurrencyAdjust, HpDialog};

use crate::app::{App, InputMode, MoneyDialog};
use crate::commands::HELP;
use crate::ui::widgets::{
    CreaturePanelWidget, InputWidget, LogWidget, TeamListWidget, TrainerPanelWidget,
};

/// Which panel is focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Team,
    Creature,
    Trainer,
    Log,
}

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
    Hp(HpDialog),
    Money(MoneyDialog),
}

/// Hotkeys shown in the help overlay and the key hint bar.
const HOTKEYS: &[(&str, &str)] = &[
    ("j/k", "Select creature (scroll log when focused)"),
    ("h/l", "Select attack slot"),
    ("1-9", "Jump to creature"),
    ("+ / H", "Heal dialog"),
    ("- / D", "Damage dialog"),
    ("a / Enter", "Perform selected attack"),
    ("e", "End turn"),
    ("r / R", "Rest creature / whole team"),
    ("x", "Release creature"),
    ("$ / S", "Add / spend pokedollars"),
    ("Tab", "Cycle panel focus"),
    (":", "Command mode"),
    ("q", "Quit"),
];

/// Areas of the main screen
struct ScreenLayout {
    title_area: Rect,
    team_area: Rect,
    creature_area: Rect,
    sidebar_area: Rect,
    log_area: Rect,
    status_bar: Rect,
    input_area: Rect,
}

impl ScreenLayout {
    fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(12),   // Main content
                Constraint::Length(8), // Log
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Input
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(rows[1]);

        Self {
            title_area: rows[0],
            team_area: columns[0],
            creature_area: columns[1],
            sidebar_area: columns[2],
            log_area: rows[2],
            status_bar: rows[3],
            input_area: rows[4],
        }
    }
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = ScreenLayout::calculate(area);
    let state = app.state();
    let config = app.session.config();

    render_title_bar(frame, app, layout.title_area);

    let team_widget = TeamListWidget::new(&state.team, &app.theme)
        .selected(app.selected)
        .cap(config.team_cap)
        .focused(app.focused_panel == FocusedPanel::Team);
    frame.render_widget(team_widget, layout.team_area);

    let creature = app.selected_id().and_then(|id| state.creature(id));
    let creature_widget = CreaturePanelWidget::new(creature, &app.theme)
        .slots(config.attack_slots, app.selected_slot)
        .focused(app.focused_panel == FocusedPanel::Creature);
    frame.render_widget(creature_widget, layout.creature_area);

    let trainer_widget = TrainerPanelWidget::new(state.trainer.as_ref(), &app.theme)
        .focused(app.focused_panel == FocusedPanel::Trainer);
    frame.render_widget(trainer_widget, layout.sidebar_area);

    let log_widget = LogWidget::new(&app.log, &app.theme)
        .scroll(app.log_scroll)
        .focused(app.focused_panel == FocusedPanel::Log);
    frame.render_widget(log_widget, layout.log_area);

    render_status_bar(frame, app, layout.status_bar);
    render_input(frame, app, layout.input_area);

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.state().trainer {
        Some(trainer) => format!(
            " Trainer Companion | {} | P{} ",
            trainer.name, trainer.pokedollars
        ),
        None => " Trainer Companion ".to_string(),
    };

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Mode indicator plus the last status message
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (mode, color) = match app.input_mode {
        InputMode::Normal => ("NORMAL", Color::Blue),
        InputMode::Command => ("COMMAND", Color::Magenta),
    };

    let mut spans = vec![Span::styled(
        format!(" {mode} "),
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )];
    match app.status_message() {
        Some(message) => spans.push(Span::styled(format!(" {message}"), app.theme.info_style())),
        None => spans.push(Span::styled(
            " ? help  : command  q quit",
            Style::default().add_modifier(Modifier::DIM),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the input area
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .active(app.input_mode == InputMode::Command);

    frame.render_widget(input_widget, area);
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
        Overlay::Hp(dialog) => {
            let name = app
                .selected_id()
                .and_then(|id| app.state().creature(id))
                .map(|c| c.name.as_str())
                .unwrap_or("creature");
            render_amount_dialog(
                frame,
                app,
                &format!(" {} {name} ", dialog.mode.title()),
                &dialog.input,
                area,
            );
        }
        Overlay::Money(dialog) => {
            let title = match dialog.adjustment() {
                CurrencyAdjust::Subtract(_) => " Spend Pokedollars ",
                CurrencyAdjust::Add(_) => " Add Pokedollars ",
            };
            render_amount_dialog(frame, app, title, &dialog.input, area);
        }
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let height = (HOTKEYS.len() + HELP.len() + 8) as u16;
    let popup_area = centered_rect_fixed(72, height, area);

    frame.render_widget(Clear, popup_area);

    let heading = Style::default().add_modifier(Modifier::UNDERLINED);
    let mut lines = vec![
        Line::from(Span::styled(
            " Trainer Companion - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Keys (NORMAL mode):", heading)),
    ];
    for (key, description) in HOTKEYS {
        lines.push(Line::from(format!("  {key:<12} {description}")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Commands (prefix with :):", heading)));
    for (usage, description) in HELP {
        lines.push(Line::from(vec![
            Span::styled(format!("  {usage}"), app.theme.info_style()),
            Span::styled(format!("  {description}"), app.theme.system_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Esc or q to close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Small popup with a numeric input line
fn render_amount_dialog(frame: &mut Frame, app: &App, title: &str, input: &str, area: Rect) {
    let popup_area = centered_rect_fixed(36, 5, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(vec![
            Span::raw("Amount: "),
            Span::styled(
                format!("{input}_"),
                app.theme.info_style().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            "Enter to apply, Esc to cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect_fixed(36, 5, area);
        assert_eq!(rect, Rect::new(32, 17, 36, 5));
    }

    #[test]
    fn test_centered_rect_shrinks_to_small_area() {
        let area = Rect::new(2, 3, 20, 4);
        let rect = centered_rect_fixed(72, 30, area);
        assert_eq!(rect, area);
    }

    #[test]
    fn test_layout_covers_all_regions() {
        let layout = ScreenLayout::calculate(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.title_area.height, 1);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(layout.log_area.height, 8);
        assert!(layout.team_area.width > 0);
        assert!(layout.creature_area.width > layout.team_area.width);
        assert_eq!(layout.sidebar_area.y, layout.team_area.y);
    }
}
