use std::time::Instant;

use crate::checklist::Checklist;
use crate::error::Result;
use crate::remote::RemoteEvent;
use crate::tree::{visible_rows, ExpandedSet, ExpansionControl, FilterMode, RecordId, TreeNode};

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    /// Rename a row. `placeholder` marks a freshly added empty item that is
    /// removed again if the dialog is cancelled.
    Rename { record: RecordId, placeholder: bool },
    DeleteConfirm { record: RecordId, name: String },
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
    /// Typing a filter query; the view narrows on every keystroke.
    FilterInput,
}

/// Single-line text input with a byte-offset cursor.
#[derive(Debug, Default, Clone)]
pub struct DialogState {
    pub input: String,
    pub cursor_position: usize,
}

impl DialogState {
    pub fn with_text(text: &str) -> Self {
        Self {
            input: text.to_string(),
            cursor_position: text.len(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
            self.input.remove(self.cursor_position);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor_position..].chars().next() {
            self.cursor_position += next.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn end(&mut self) {
        self.cursor_position = self.input.len();
    }
}

/// State of the link to the remote document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Persistence disabled.
    Offline,
    /// Waiting for the document to be opened.
    Loading,
    /// An edit has been sent and not yet acknowledged.
    Saving,
    Synced,
    Failed,
}

impl RemoteStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RemoteStatus::Offline => "offline",
            RemoteStatus::Loading => "loading…",
            RemoteStatus::Saving => "saving…",
            RemoteStatus::Synced => "synced",
            RemoteStatus::Failed => "sync failed",
        }
    }
}

/// A transient status bar message.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Main application state.
pub struct App {
    pub checklist: Checklist,
    pub expansion: ExpandedSet,
    /// Rows currently drawn, in display order.
    pub rows: Vec<RecordId>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub filter_input: DialogState,
    pub status_message: Option<StatusMessage>,
    pub remote_status: RemoteStatus,
    pub confirm_delete: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(checklist: Checklist, confirm_delete: bool, remote: bool) -> Self {
        let mut app = Self {
            checklist,
            expansion: ExpandedSet::default(),
            rows: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            filter_input: DialogState::default(),
            status_message: None,
            remote_status: if remote {
                RemoteStatus::Loading
            } else {
                RemoteStatus::Offline
            },
            confirm_delete,
            should_quit: false,
        };
        app.refresh_rows();
        app
    }

    /// Recompute the drawn rows from the view and expansion state.
    pub fn refresh_rows(&mut self) {
        let rows = {
            let view = self.checklist.view();
            self.expansion.retain(view.order());
            visible_rows(view.records(), &self.expansion)
        };
        self.rows = rows;
        if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len().saturating_sub(1);
        }
    }

    pub fn selected_record(&self) -> Option<RecordId> {
        self.rows.get(self.selected_index).copied()
    }

    fn select_record(&mut self, record: RecordId) {
        if let Some(index) = self.rows.iter().position(|r| *r == record) {
            self.selected_index = index;
        }
    }

    /// Keep the selected row inside a viewport of `visible_height` rows.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }

    // ── Status ──────────────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_message(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.rows.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
    }

    pub fn expand_selected(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        let expandable = self
            .checklist
            .view()
            .record(record)
            .is_some_and(|r| r.expandable);
        if expandable {
            self.expansion.expand(record);
            self.refresh_rows();
        }
    }

    /// Collapse the selected row, or jump to its parent if it is already
    /// collapsed.
    pub fn collapse_selected(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        if self.expansion.is_expanded(record) {
            self.expansion.collapse(record);
            self.refresh_rows();
            return;
        }
        let parent = {
            let view = self.checklist.view();
            let level_at = |index: usize| view.record(self.rows[index]).map_or(0, |r| r.level);
            let level = level_at(self.selected_index);
            (0..self.selected_index).rev().find(|i| level_at(*i) < level)
        };
        if let Some(parent) = parent {
            self.selected_index = parent;
        }
    }

    pub fn toggle_selected(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        let expandable = self
            .checklist
            .view()
            .record(record)
            .is_some_and(|r| r.expandable);
        if expandable {
            self.expansion.toggle(record);
            self.refresh_rows();
        }
    }

    pub fn expand_all(&mut self) {
        let order = self.checklist.view().order().to_vec();
        self.expansion.expand_all(&order);
        self.refresh_rows();
    }

    // ── Dialogs ─────────────────────────────────────────────────────────────

    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = match &kind {
            DialogKind::Rename { record, .. } => {
                let name = self
                    .checklist
                    .view()
                    .record(*record)
                    .map(|r| r.name.clone())
                    .unwrap_or_default();
                DialogState::with_text(&name)
            }
            DialogKind::DeleteConfirm { .. } => DialogState::default(),
        };
        self.mode = AppMode::Dialog(kind);
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Edits made before the remote copy arrives would be overwritten by it
    /// on screen while still being saved to the server.
    fn edits_blocked(&mut self) -> bool {
        if self.remote_status == RemoteStatus::Loading {
            self.set_error_message("Still loading the remote checklist");
            return true;
        }
        false
    }

    /// Insert an empty child under the selected row and open the rename
    /// dialog on it.
    pub fn start_add(&mut self) {
        if self.edits_blocked() {
            return;
        }
        let Some(parent) = self.selected_record() else {
            self.set_error_message("Nothing selected");
            return;
        };
        // An empty name never matches a query, so the placeholder would be
        // filtered out of sight.
        if self.checklist.view().query().is_some() {
            self.clear_filter();
        }
        let result = self.checklist.add_item(parent, "", &mut self.expansion);
        let child = match self.after_edit(result) {
            Some(child) => child,
            None => return,
        };
        match self.checklist.record_for(child) {
            Some(record) => {
                self.select_record(record);
                self.open_dialog(DialogKind::Rename {
                    record,
                    placeholder: true,
                });
            }
            None => self.set_error_message("New item is not visible"),
        }
    }

    pub fn start_rename(&mut self) {
        if self.edits_blocked() {
            return;
        }
        if let Some(record) = self.selected_record() {
            self.open_dialog(DialogKind::Rename {
                record,
                placeholder: false,
            });
        }
    }

    pub fn start_delete(&mut self) {
        if self.edits_blocked() {
            return;
        }
        let Some(record) = self.selected_record() else {
            return;
        };
        if self.confirm_delete {
            let name = self
                .checklist
                .view()
                .record(record)
                .map(|r| r.name.clone())
                .unwrap_or_default();
            self.open_dialog(DialogKind::DeleteConfirm { record, name });
        } else {
            self.delete_record(record);
        }
    }

    /// Enter in a dialog.
    pub fn confirm_dialog(&mut self) {
        let AppMode::Dialog(kind) = self.mode.clone() else {
            return;
        };
        match kind {
            DialogKind::Rename {
                record,
                placeholder,
            } => {
                let name = self.dialog_state.input.trim().to_string();
                if name.is_empty() && placeholder {
                    self.cancel_dialog();
                    return;
                }
                self.close_dialog();
                self.rename_record(record, &name);
            }
            DialogKind::DeleteConfirm { record, .. } => {
                self.close_dialog();
                self.delete_record(record);
            }
        }
    }

    /// Esc in a dialog. A cancelled placeholder is removed again.
    pub fn cancel_dialog(&mut self) {
        let mode = std::mem::take(&mut self.mode);
        self.dialog_state = DialogState::default();
        if let AppMode::Dialog(DialogKind::Rename {
            record,
            placeholder: true,
        }) = mode
        {
            let result = self.checklist.remove_item(record, &mut self.expansion);
            self.after_edit(result);
        }
    }

    fn rename_record(&mut self, record: RecordId, name: &str) {
        let node = self.checklist.view().node_of(record);
        let result = self.checklist.save_item(record, name, &mut self.expansion);
        if self.after_edit(result).is_none() {
            return;
        }
        let renamed = node.and_then(|n| self.checklist.record_for(n));
        if let Some(renamed) = renamed {
            self.select_record(renamed);
        }
    }

    fn delete_record(&mut self, record: RecordId) {
        let result = self.checklist.remove_item(record, &mut self.expansion);
        if let Some(removed) = self.after_edit(result) {
            self.set_status_message(format!(
                "Deleted {} item{}",
                removed,
                if removed == 1 { "" } else { "s" }
            ));
        }
    }

    /// Common bookkeeping after a store edit: refresh rows, mark the remote
    /// copy dirty, surface errors in the status bar.
    fn after_edit<T>(&mut self, result: Result<T>) -> Option<T> {
        self.refresh_rows();
        match result {
            Ok(value) => {
                if self.remote_status != RemoteStatus::Offline {
                    self.remote_status = RemoteStatus::Saving;
                }
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "edit rejected");
                self.set_error_message(e.to_string());
                None
            }
        }
    }

    // ── Filtering ───────────────────────────────────────────────────────────

    pub fn start_filter(&mut self) {
        let current = self.checklist.view().query().unwrap_or("").to_string();
        self.filter_input = DialogState::with_text(&current);
        self.mode = AppMode::FilterInput;
    }

    /// Re-run the filter with the text typed so far.
    pub fn update_filter(&mut self) {
        let query = self.filter_input.input.clone();
        self.checklist.apply_filter(&query, &mut self.expansion);
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.refresh_rows();
    }

    /// Enter while typing: keep the filter (an empty query drops it).
    pub fn commit_filter(&mut self) {
        self.mode = AppMode::Normal;
        if self.filter_input.input.trim().is_empty() {
            self.clear_filter();
        }
    }

    pub fn clear_filter(&mut self) {
        self.filter_input = DialogState::default();
        if self.mode == AppMode::FilterInput {
            self.mode = AppMode::Normal;
        }
        if self.checklist.view().query().is_some() {
            self.checklist.clear_filter();
            self.refresh_rows();
        }
    }

    pub fn toggle_filter_mode(&mut self) {
        let mode: FilterMode = self.checklist.view().mode().toggle();
        self.checklist.set_mode(mode, &mut self.expansion);
        self.refresh_rows();
        self.set_status_message(format!("Filter mode: {}", mode.label()));
    }

    // ── Remote ──────────────────────────────────────────────────────────────

    pub fn handle_remote(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::Loaded(items) => self.load_remote(items),
            RemoteEvent::Saved => self.remote_status = RemoteStatus::Synced,
            RemoteEvent::Failed { op, message } => {
                self.remote_status = RemoteStatus::Failed;
                self.set_error_message(format!("Remote {} failed: {}", op.label(), message));
            }
        }
    }

    fn load_remote(&mut self, items: Vec<TreeNode>) {
        // Every record is about to go stale.
        if matches!(self.mode, AppMode::Dialog(_)) {
            self.close_dialog();
        }
        self.checklist.replace_all(items);
        self.expansion.clear();
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.refresh_rows();
        self.remote_status = RemoteStatus::Synced;
        self.set_status_message("Loaded remote checklist");
    }
}
