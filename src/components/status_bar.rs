use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::{RemoteStatus, StatusMessage};
use crate::tree::FilterMode;

const KEY_HINTS: &str = " a:add  r:ren  d:del  /:filter  m:mode  q:quit ";

/// Bottom bar: item count, filter state, sync state and key hints, or a
/// transient message when one is pending.
pub struct StatusBarWidget<'a> {
    item_count: usize,
    filter: Option<&'a str>,
    mode: FilterMode,
    remote: &'a RemoteStatus,
    message: Option<&'a StatusMessage>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(item_count: usize, mode: FilterMode, remote: &'a RemoteStatus) -> Self {
        Self {
            item_count,
            filter: None,
            mode,
            remote,
            message: None,
        }
    }

    pub fn filter(mut self, query: Option<&'a str>) -> Self {
        self.filter = query.filter(|q| !q.is_empty());
        self
    }

    pub fn message(mut self, message: Option<&'a StatusMessage>) -> Self {
        self.message = message;
        self
    }

    fn remote_style(&self) -> Style {
        match self.remote {
            RemoteStatus::Offline => Style::default().fg(Color::DarkGray),
            RemoteStatus::Loading | RemoteStatus::Saving => Style::default().fg(Color::Yellow),
            RemoteStatus::Synced => Style::default().fg(Color::Green),
            RemoteStatus::Failed => Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;

        if let Some(msg) = self.message {
            let style = if msg.is_error {
                Style::default().bg(Color::Red).fg(Color::White)
            } else {
                Style::default().fg(Color::Green)
            };
            let text: String = msg.text.chars().take(width).collect();
            let display = format!("{:<width$}", text, width = width);
            buf.set_line(
                area.x,
                area.y,
                &Line::from(Span::styled(display, style)),
                area.width,
            );
            return;
        }

        let mut spans = vec![Span::styled(
            format!(
                " {} item{} ",
                self.item_count,
                if self.item_count == 1 { "" } else { "s" }
            ),
            Style::default().fg(Color::White),
        )];

        let filter_text = match self.filter {
            Some(q) => format!("filter: \"{}\" [{}] ", q, self.mode.label()),
            None => format!("[{}] ", self.mode.label()),
        };
        spans.push(Span::styled(filter_text, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!("● {} ", self.remote.label()),
            self.remote_style(),
        ));

        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let pad = width.saturating_sub(used).saturating_sub(KEY_HINTS.len());
        if pad > 0 {
            spans.push(Span::raw(" ".repeat(pad)));
            spans.push(Span::styled(
                KEY_HINTS,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn render(widget: StatusBarWidget, width: u16) -> (String, Buffer) {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let content = (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        (content, buf)
    }

    #[test]
    fn normal_bar_shows_count_mode_and_sync() {
        let remote = RemoteStatus::Synced;
        let (content, _) = render(StatusBarWidget::new(8, FilterMode::Hide, &remote), 100);
        assert!(content.contains("8 items"));
        assert!(content.contains("[hide]"));
        assert!(content.contains("synced"));
        assert!(content.contains("a:add"));
    }

    #[test]
    fn active_filter_is_shown() {
        let remote = RemoteStatus::Offline;
        let (content, _) = render(
            StatusBarWidget::new(1, FilterMode::Prune, &remote).filter(Some("pump")),
            100,
        );
        assert!(content.contains("1 item "));
        assert!(content.contains("filter: \"pump\" [prune]"));
        assert!(content.contains("offline"));
    }

    #[test]
    fn empty_query_is_not_shown() {
        let remote = RemoteStatus::Offline;
        let (content, _) = render(
            StatusBarWidget::new(2, FilterMode::Hide, &remote).filter(Some("")),
            100,
        );
        assert!(!content.contains("filter:"));
    }

    #[test]
    fn error_message_replaces_bar() {
        let remote = RemoteStatus::Failed;
        let msg = StatusMessage {
            text: "Remote save failed: timeout".into(),
            is_error: true,
            created: Instant::now(),
        };
        let (content, buf) = render(
            StatusBarWidget::new(8, FilterMode::Hide, &remote).message(Some(&msg)),
            60,
        );
        assert!(content.contains("Remote save failed: timeout"));
        assert!(!content.contains("a:add"));
        assert_eq!(buf.cell((0, 0)).unwrap().bg, Color::Red);
    }

    #[test]
    fn narrow_bar_drops_hints() {
        let remote = RemoteStatus::Offline;
        let (content, _) = render(StatusBarWidget::new(8, FilterMode::Hide, &remote), 30);
        assert!(!content.contains("q:quit"));
    }

    #[test]
    fn zero_area_does_not_panic() {
        let remote = RemoteStatus::Offline;
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new(0, FilterMode::Hide, &remote).render(area, &mut buf);
    }
}
