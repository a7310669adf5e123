use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::tree::{ExpandedSet, FlatRecord, RecordId, TreeView};

/// Shown in place of an empty item name.
pub const PLACEHOLDER_TEXT: &str = "(new item)";

/// Renders the visible checklist rows with indentation and expand markers.
pub struct ChecklistWidget<'a> {
    view: &'a TreeView,
    rows: &'a [RecordId],
    expansion: &'a ExpandedSet,
    selected: usize,
    scroll: usize,
    block: Option<Block<'a>>,
}

impl<'a> ChecklistWidget<'a> {
    pub fn new(view: &'a TreeView, rows: &'a [RecordId], expansion: &'a ExpandedSet) -> Self {
        Self {
            view,
            rows,
            expansion,
            selected: 0,
            scroll: 0,
            block: None,
        }
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll = offset;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn marker(&self, record: &FlatRecord) -> &'static str {
        if !record.expandable {
            "  "
        } else if self.expansion.is_expanded(record.id) {
            "▾ "
        } else {
            "▸ "
        }
    }

    /// Whether the record's own name matches the active query.
    fn is_match(&self, record: &FlatRecord) -> bool {
        match self.view.query() {
            Some(q) if !q.is_empty() => record.name.to_lowercase().contains(q),
            _ => false,
        }
    }
}

impl<'a> Widget for ChecklistWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        if self.rows.is_empty() {
            let text = if self.view.is_filtering() {
                "No matching items"
            } else {
                "Checklist is empty"
            };
            let line = Line::from(Span::styled(
                text,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        let visible = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(inner_area.height as usize);

        for (i, (idx, id)) in visible.enumerate() {
            let Some(record) = self.view.record(*id) else {
                continue;
            };
            let y = inner_area.y + i as u16;

            let indent = "  ".repeat(record.level);
            let marker = self.marker(record);
            let (name, name_style) = if record.name.is_empty() {
                (
                    PLACEHOLDER_TEXT,
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
            } else if self.is_match(record) {
                (
                    record.name.as_str(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else if record.expandable {
                (
                    record.name.as_str(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (record.name.as_str(), Style::default().fg(Color::White))
            };

            let line = if idx == self.selected {
                let style = Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                let content = format!("{}{}{}", indent, marker, name);
                let padded = format!("{:<width$}", content, width = inner_area.width as usize);
                Line::from(Span::styled(padded, style))
            } else {
                Line::from(vec![
                    Span::raw(indent),
                    Span::styled(marker, Style::default().fg(Color::DarkGray)),
                    Span::styled(name, name_style),
                ])
            };
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
