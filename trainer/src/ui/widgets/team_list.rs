//! Team list widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use trainer_core::TeamRegistry;

use crate::ui::theme::Theme;

/// Width of the mini HP bar in cells.
const BAR_WIDTH: usize = 10;

/// One line per team member with a mini HP bar.
pub struct TeamListWidget<'a> {
    team: &'a TeamRegistry,
    theme: &'a Theme,
    selected: usize,
    cap: usize,
    focused: bool,
}

impl<'a> TeamListWidget<'a> {
    pub fn new(team: &'a TeamRegistry, theme: &'a Theme) -> Self {
        Self {
            team,
            theme,
            selected: 0,
            cap: 6,
            focused: false,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TeamListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!(" Team {}/{} ", self.team.len(), self.cap),
                self.theme.title_style(self.focused),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        if self.team.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No creatures yet",
                self.theme.system_style(),
            )))
            .block(block)
            .render(area, buf);
            return;
        }

        let lines: Vec<Line> = self
            .team
            .iter()
            .enumerate()
            .map(|(i, (_, creature))| {
                let ratio = creature.hp.ratio();
                let filled = (ratio * BAR_WIDTH as f32).round() as usize;
                let bar = format!(
                    "{}{}",
                    "█".repeat(filled),
                    "░".repeat(BAR_WIDTH.saturating_sub(filled))
                );
                let name_style = if i == self.selected {
                    self.theme.selected_style()
                } else {
                    self.theme.text_style()
                };
                let marker = if i == self.selected { ">" } else { " " };

                Line::from(vec![
                    Span::styled(format!("{marker}{} ", i + 1), name_style),
                    Span::styled(format!("{:<12} ", creature.name), name_style),
                    Span::styled(bar, Style::default().fg(self.theme.hp_color(ratio))),
                    Span::styled(format!(" {}", creature.hp), self.theme.system_style()),
                ])
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
