//! Selected creature detail widget

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use trainer_core::view::{attack_slots, status_badges, AttackSlotView};
use trainer_core::world::Creature;

use crate::ui::theme::Theme;
use crate::ui::widgets::trainer_panel::ability_lines;

/// HP, experience, status badges and attack slots for one creature.
pub struct CreaturePanelWidget<'a> {
    creature: Option<&'a Creature>,
    theme: &'a Theme,
    slot_count: usize,
    selected_slot: usize,
    focused: bool,
}

impl<'a> CreaturePanelWidget<'a> {
    pub fn new(creature: Option<&'a Creature>, theme: &'a Theme) -> Self {
        Self {
            creature,
            theme,
            slot_count: 4,
            selected_slot: 0,
            focused: false,
        }
    }

    pub fn slots(mut self, count: usize, selected: usize) -> Self {
        self.slot_count = count;
        self.selected_slot = selected;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for CreaturePanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let Some(creature) = self.creature else {
            Paragraph::new(Line::from(Span::styled(
                "No creature selected. :catch <name> <type> <level> <max-hp>",
                self.theme.system_style(),
            )))
            .block(block.title(" Creature "))
            .wrap(Wrap { trim: true })
            .render(area, buf);
            return;
        };

        let block = block.title(Span::styled(
            format!(" {} ", creature.name),
            self.theme.title_style(self.focused),
        ));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                            // Type/Level/XP
                Constraint::Length(1),                            // HP bar
                Constraint::Length(2),                            // Status badges
                Constraint::Length(self.slot_count as u16 + 1),   // Attacks
                Constraint::Min(0),                               // Abilities
            ])
            .split(inner);

        let mut header = vec![
            Span::styled(
                format!("Lv {} {}", creature.level, creature.type_tag),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  XP {}/{}",
                    creature.experience, creature.experience_to_next
                ),
                self.theme.system_style(),
            ),
        ];
        if creature.is_fainted() {
            header.push(Span::styled(
                "  FAINTED",
                Style::default()
                    .fg(self.theme.hp_critical)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Paragraph::new(Line::from(header)).render(chunks[0], buf);

        let hp = creature.hp;
        Gauge::default()
            .gauge_style(Style::default().fg(self.theme.hp_color(hp.ratio())))
            .ratio(hp.ratio() as f64)
            .label(format!("HP: {hp}"))
            .render(chunks[1], buf);

        let badges = status_badges(creature);
        let badge_line = if badges.is_empty() {
            Line::from(Span::styled("No status effects", self.theme.system_style()))
        } else {
            let mut spans = Vec::new();
            for badge in badges {
                let text = match badge.duration {
                    Some(turns) => format!(" {} ({turns}) ", badge.label),
                    None => format!(" {} ", badge.label),
                };
                spans.push(Span::styled(text, self.theme.badge_style(badge.slot)));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        };
        Paragraph::new(badge_line)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        let mut attack_lines = vec![Line::from(Span::styled(
            "Attacks:",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for row in attack_slots(creature, self.slot_count) {
            let marker = if row.index() == self.selected_slot {
                Span::styled("> ", self.theme.selected_style())
            } else {
                Span::raw("  ")
            };
            let line = match row {
                AttackSlotView::Filled {
                    index,
                    name,
                    pp,
                    can_perform,
                } => Line::from(vec![
                    marker,
                    Span::raw(format!("{}. {name}", index + 1)),
                    Span::styled(format!("  PP {pp}"), self.theme.pp_style(can_perform)),
                ]),
                AttackSlotView::Empty { index } => Line::from(vec![
                    marker,
                    Span::styled(format!("{}. -", index + 1), self.theme.system_style()),
                ]),
            };
            attack_lines.push(line);
        }
        Paragraph::new(attack_lines).render(chunks[3], buf);

        if chunks[4].height > 0 {
            Paragraph::new(ability_lines(&creature.attributes)).render(chunks[4], buf);
        }
    }
}
