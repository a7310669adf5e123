use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::DialogState;
use crate::components::dialog::input_line;

/// One-line filter prompt shown while a query is typed.
pub struct FilterBarWidget<'a> {
    state: &'a DialogState,
    matches: usize,
}

impl<'a> FilterBarWidget<'a> {
    pub fn new(state: &'a DialogState, matches: usize) -> Self {
        Self { state, matches }
    }
}

impl<'a> Widget for FilterBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 4 {
            return;
        }

        let prompt = Span::styled(
            "/ ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        let count = format!(" {} rows", self.matches);
        let input_width = (area.width as usize)
            .saturating_sub(2)
            .saturating_sub(count.len());

        let mut spans = vec![prompt];
        spans.extend(input_line(self.state, input_width).spans);
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let pad = (area.width as usize).saturating_sub(used + count.len());
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(count, Style::default().fg(Color::DarkGray)));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
