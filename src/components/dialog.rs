use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{AppMode, DialogKind, DialogState};
use crate::components::tree::PLACEHOLDER_TEXT;

/// Centered modal overlay for the rename and delete dialogs.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    dialog_state: &'a DialogState,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, dialog_state: &'a DialogState) -> Self {
        Self { mode, dialog_state }
    }
}

/// A rectangle of the given size centered within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let AppMode::Dialog(kind) = self.mode else {
            return;
        };

        match kind {
            DialogKind::Rename {
                placeholder: true, ..
            } => render_input_dialog("New Item", self.dialog_state, area, buf),
            DialogKind::Rename { .. } => {
                render_input_dialog("Rename", self.dialog_state, area, buf)
            }
            DialogKind::DeleteConfirm { name, .. } => render_confirm_dialog(name, area, buf),
        }
    }
}

/// Split `input` around the cursor: text before, the character under the
/// cursor (a space at the end), and text after.
pub fn split_at_cursor(input: &str, cursor: usize) -> (&str, &str, &str) {
    match input[cursor..].chars().next() {
        Some(ch) => {
            let end = cursor + ch.len_utf8();
            (&input[..cursor], &input[cursor..end], &input[end..])
        }
        None => (input, " ", ""),
    }
}

/// Input line with a block cursor.
pub fn input_line<'s>(state: &'s DialogState, max_width: usize) -> Line<'s> {
    let (before, cursor_char, after) = split_at_cursor(&state.input, state.cursor_position);

    // Keep the cursor in view by dropping characters from the left.
    let before_width = before.chars().count();
    let budget = max_width.saturating_sub(1);
    let before = if before_width > budget {
        let skip = before
            .char_indices()
            .nth(before_width - budget)
            .map_or(before.len(), |(i, _)| i);
        &before[skip..]
    } else {
        before
    };

    let input_style = Style::default().fg(Color::White);
    let cursor_style = Style::default()
        .bg(Color::White)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);

    Line::from(vec![
        Span::styled(before, input_style),
        Span::styled(cursor_char, cursor_style),
        Span::styled(after, input_style),
    ])
}

fn hint_line(hint: &str) -> Line<'_> {
    Line::from(Span::styled(
        hint,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
    ))
}

fn render_input_dialog(title: &str, state: &DialogState, area: Rect, buf: &mut Buffer) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let rect = centered_rect(dialog_width, 5, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let line = input_line(state, inner.width as usize);
    buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);

    if inner.height > 1 {
        let hint = hint_line("[Enter] Save  [Esc] Cancel");
        buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
    }
}

fn render_confirm_dialog(name: &str, area: Rect, buf: &mut Buffer) {
    let shown = if name.is_empty() { PLACEHOLDER_TEXT } else { name };
    let dialog_width = (shown.chars().count() as u16 + 10)
        .max(40)
        .min(area.width.saturating_sub(4));
    let rect = centered_rect(dialog_width, 7, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(" Delete Item ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let header = Line::from(Span::styled(
        "Delete every item named",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    buf.set_line(inner.x, inner.y, &header, inner.width);

    if inner.height > 2 {
        let target = Line::from(Span::styled(
            format!("  • {}", shown),
            Style::default().fg(Color::White),
        ));
        buf.set_line(inner.x, inner.y + 2, &target, inner.width);
    }

    let hint = hint_line("[y] Yes  [n/Esc] Cancel");
    buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
}
