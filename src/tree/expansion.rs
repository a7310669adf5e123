use std::collections::HashSet;

use crate::tree::mapper::{is_expandable, level_of, FlatRecord, RecordId};

/// Expand/collapse state owned by the rendering side. The core only ever
/// expands.
pub trait ExpansionControl {
    fn expand(&mut self, record: RecordId);

    fn expand_all(&mut self, records: &[RecordId]) {
        for record in records {
            self.expand(*record);
        }
    }
}

/// Set of expanded records.
#[derive(Debug, Default, Clone)]
pub struct ExpandedSet {
    expanded: HashSet<RecordId>,
}

impl ExpansionControl for ExpandedSet {
    fn expand(&mut self, record: RecordId) {
        self.expanded.insert(record);
    }
}

impl ExpandedSet {
    pub fn is_expanded(&self, record: RecordId) -> bool {
        self.expanded.contains(&record)
    }

    pub fn collapse(&mut self, record: RecordId) {
        self.expanded.remove(&record);
    }

    pub fn toggle(&mut self, record: RecordId) {
        if !self.expanded.remove(&record) {
            self.expanded.insert(record);
        }
    }

    /// Forget records that are no longer part of the view.
    pub fn retain(&mut self, live: &[RecordId]) {
        let live: HashSet<&RecordId> = live.iter().collect();
        self.expanded.retain(|r| live.contains(r));
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}

/// Rows a renderer should draw: a record is shown when it is not hidden and
/// every ancestor is expanded. Descendants of a hidden or collapsed record
/// are skipped.
pub fn visible_rows<'a>(
    records: impl IntoIterator<Item = &'a FlatRecord>,
    expansion: &ExpandedSet,
) -> Vec<RecordId> {
    let mut rows = Vec::new();
    // Level of the closest collapsed (or hidden) ancestor, if any.
    let mut cut: Option<usize> = None;
    for record in records {
        let level = level_of(record);
        if let Some(cut_level) = cut {
            if level > cut_level {
                continue;
            }
            cut = None;
        }
        if record.hidden {
            cut = Some(level);
            continue;
        }
        rows.push(record.id);
        if !(is_expandable(record) && expansion.is_expanded(record.id)) {
            cut = Some(level);
        }
    }
    rows
}
