//! Color theme and styling for the trainer TUI

use ratatui::style::{Color, Modifier, Style};
use trainer_core::StatusSlot;

/// UI color theme
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub selected: Color,

    // Pool colors
    pub hp_healthy: Color,
    pub hp_wounded: Color,
    pub hp_critical: Color,
    pub pp: Color,
    pub pp_empty: Color,

    // Status badge colors
    pub primary_status: Color,
    pub confusion_status: Color,
    pub temporary_status: Color,

    // Log colors
    pub action_text: Color,
    pub info_text: Color,
    pub system_text: Color,

    pub currency: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            selected: Color::LightYellow,

            hp_healthy: Color::Green,
            hp_wounded: Color::Yellow,
            hp_critical: Color::Red,
            pp: Color::LightBlue,
            pp_empty: Color::DarkGray,

            primary_status: Color::LightRed,
            confusion_status: Color::Magenta,
            temporary_status: Color::LightCyan,

            action_text: Color::White,
            info_text: Color::Cyan,
            system_text: Color::DarkGray,

            currency: Color::Yellow,
        }
    }
}

impl Theme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    pub fn action_style(&self) -> Style {
        Style::default().fg(self.action_text)
    }

    pub fn info_style(&self) -> Style {
        Style::default()
            .fg(self.info_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Get HP bar color based on ratio
    pub fn hp_color(&self, ratio: f32) -> Color {
        if ratio > 0.5 {
            self.hp_healthy
        } else if ratio > 0.25 {
            self.hp_wounded
        } else {
            self.hp_critical
        }
    }

    pub fn pp_style(&self, can_perform: bool) -> Style {
        if can_perform {
            Style::default().fg(self.pp)
        } else {
            Style::default()
                .fg(self.pp_empty)
                .add_modifier(Modifier::CROSSED_OUT)
        }
    }

    pub fn badge_style(&self, slot: StatusSlot) -> Style {
        let color = match slot {
            StatusSlot::Primary => self.primary_status,
            StatusSlot::Confusion => self.confusion_status,
            StatusSlot::Temporary => self.temporary_status,
        };
        Style::default().fg(Color::Black).bg(color)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
