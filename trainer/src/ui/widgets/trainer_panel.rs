//! Trainer panel widget for sidebar display

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use trainer_core::world::{Ability, AbilityScores, Trainer};

use crate::ui::theme::Theme;

/// Trainer summary: HP, abilities, pokedollars and inventory.
pub struct TrainerPanelWidget<'a> {
    trainer: Option<&'a Trainer>,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> TrainerPanelWidget<'a> {
    pub fn new(trainer: Option<&'a Trainer>, theme: &'a Theme) -> Self {
        Self {
            trainer,
            theme,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TrainerPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(trainer) = self.trainer else {
            let block = Block::default()
                .title(" Trainer ")
                .borders(Borders::ALL)
                .border_style(self.theme.border_style(self.focused));
            Paragraph::new(Line::from(Span::styled(
                "No trainer. :trainer <name> [class]",
                self.theme.system_style(),
            )))
            .block(block)
            .render(area, buf);
            return;
        };

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", trainer.name),
                self.theme.title_style(self.focused),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Class/Level
                Constraint::Length(1), // HP bar
                Constraint::Length(1), // Pokedollars
                Constraint::Length(3), // Ability scores
                Constraint::Min(0),    // Inventory
            ])
            .split(inner);

        let class_line = Line::from(Span::styled(
            format!("Level {} {}", trainer.level, trainer.class),
            Style::default().add_modifier(Modifier::DIM),
        ));
        Paragraph::new(class_line).render(chunks[0], buf);

        let hp = trainer.hp;
        Gauge::default()
            .gauge_style(Style::default().fg(self.theme.hp_color(hp.ratio())))
            .ratio(hp.ratio() as f64)
            .label(format!("HP: {hp}"))
            .render(chunks[1], buf);

        Paragraph::new(Line::from(vec![
            Span::raw("Pokedollars: "),
            Span::styled(
                format!("P{}", trainer.pokedollars),
                Style::default()
                    .fg(self.theme.currency)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(chunks[2], buf);

        Paragraph::new(ability_lines(&trainer.attributes)).render(chunks[3], buf);

        if chunks[4].height > 0 {
            let mut lines = vec![Line::from(Span::styled(
                format!("Bag ({} items):", trainer.total_items()),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if trainer.inventory.is_empty() {
                lines.push(Line::from(Span::styled("  empty", self.theme.system_style())));
            }
            for (i, item) in trainer.inventory.iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:>2}. ", i + 1), self.theme.system_style()),
                    Span::raw(format!("{} x{}", item.name, item.quantity)),
                    Span::styled(
                        format!("  {}", item.category.name()),
                        self.theme.system_style(),
                    ),
                ]));
            }
            Paragraph::new(lines).render(chunks[4], buf);
        }
    }
}

/// Ability scores, two per line: `STR 10 (+0)  DEX 14 (+2)`.
pub fn ability_lines(scores: &AbilityScores) -> Vec<Line<'static>> {
    Ability::all()
        .chunks(2)
        .map(|pair| {
            let text = pair
                .iter()
                .map(|ability| {
                    let modifier = scores.modifier(*ability);
                    format!("{} {:2} ({modifier:+})", ability, scores.get(*ability))
                })
                .collect::<Vec<_>>()
                .join("  ");
            Line::from(text)
        })
        .collect()
}
