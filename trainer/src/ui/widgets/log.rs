//! Activity log widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use crate::ui::theme::Theme;

/// What produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// A dispatched intent that changed state
    Action,
    /// Greetings and confirmations
    Info,
    /// No-op results and hints
    System,
}

/// A single entry in the log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub content: String,
    pub kind: LogKind,
}

/// Scrolling list of what happened this session.
pub struct LogWidget<'a> {
    entries: &'a [LogEntry],
    scroll: usize,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> LogWidget<'a> {
    pub fn new(entries: &'a [LogEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            scroll: 0,
            theme,
            focused: false,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn style_for(&self, kind: LogKind) -> Style {
        match kind {
            LogKind::Action => self.theme.action_style(),
            LogKind::Info => self.theme.info_style(),
            LogKind::System => self.theme.system_style(),
        }
    }
}

impl Widget for LogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Log [j/k scroll] "
        } else {
            " Log "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .entries
            .iter()
            .flat_map(|entry| {
                let style = self.style_for(entry.kind);
                let prefix = match entry.kind {
                    LogKind::Action => "* ",
                    LogKind::Info | LogKind::System => "  ",
                };
                entry
                    .content
                    .lines()
                    .map(move |line| Line::from(Span::styled(format!("{prefix}{line}"), style)))
                    .collect::<Vec<_>>()
            })
            .collect();

        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(scrollbar_area, buf, &mut scrollbar_state);
        }
    }
}
