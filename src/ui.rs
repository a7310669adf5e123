use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::dialog::DialogWidget;
use crate::components::filter_bar::FilterBarWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::ChecklistWidget;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let typing = app.mode == AppMode::FilterInput;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(if typing { 1 } else { 0 }),
            Constraint::Length(1),
        ])
        .split(area);

    // Keep the selected row visible (border takes two lines).
    app.update_scroll(chunks[0].height.saturating_sub(2) as usize);

    let view = app.checklist.view();

    let border = if view.is_filtering() {
        Color::Yellow
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .title(" Checklist ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    frame.render_widget(
        ChecklistWidget::new(&view, &app.rows, &app.expansion)
            .selected(app.selected_index)
            .scroll(app.scroll_offset)
            .block(block),
        chunks[0],
    );

    if typing {
        frame.render_widget(
            FilterBarWidget::new(&app.filter_input, app.rows.len()),
            chunks[1],
        );
    }

    let item_count = crate::tree::node::count(app.checklist.roots());
    frame.render_widget(
        StatusBarWidget::new(item_count, view.mode(), &app.remote_status)
            .filter(view.query())
            .message(app.status_message.as_ref()),
        chunks[2],
    );

    if matches!(app.mode, AppMode::Dialog(_)) {
        frame.render_widget(DialogWidget::new(&app.mode, &app.dialog_state), area);
    }
}
