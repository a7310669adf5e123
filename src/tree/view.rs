use crate::tree::filter::{self, normalize_query, FilterMode};
use crate::tree::mapper::{FlatRecord, NodeMapper, RecordId};
use crate::tree::node::{NodeHandle, TreeNode};
use crate::tree::store::{TreeChange, TreeObserver};

/// Display projection of the checklist.
///
/// Subscribed to the store; on every notification it deep-copies the
/// snapshot, runs the active filter over the copy and re-flattens. The
/// canonical tree is never touched by filtering in either mode.
#[derive(Debug)]
pub struct TreeView {
    mapper: NodeMapper,
    mode: FilterMode,
    /// Normalized query; `None` when no filter is applied.
    query: Option<String>,
    order: Vec<RecordId>,
}

impl TreeObserver for TreeView {
    fn tree_changed(&mut self, change: &TreeChange, roots: &[TreeNode]) {
        tracing::trace!(?change, "refreshing view");
        self.refresh(roots);
    }
}

impl TreeView {
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mapper: NodeMapper::new(),
            mode,
            query: None,
            order: Vec::new(),
        }
    }

    /// Rebuild the flat sequence from a canonical snapshot.
    pub fn refresh(&mut self, roots: &[TreeNode]) {
        let mut display = roots.to_vec();
        if let Some(query) = &self.query {
            let all_suppressed = filter::search(query, &mut display, self.mode);
            tracing::debug!(query = %query, mode = self.mode.label(), all_suppressed, "filter pass");
        }
        self.order = self.mapper.flatten(&display);
    }

    /// Set the filter query and recompute. Returns the records to expand.
    pub fn apply_filter(&mut self, query: &str, roots: &[TreeNode]) -> &[RecordId] {
        self.query = Some(normalize_query(query));
        self.refresh(roots);
        &self.order
    }

    /// Drop the filter entirely.
    pub fn clear_filter(&mut self, roots: &[TreeNode]) {
        self.query = None;
        self.refresh(roots);
    }

    pub fn set_mode(&mut self, mode: FilterMode, roots: &[TreeNode]) {
        self.mode = mode;
        self.refresh(roots);
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// True when a non-empty query is narrowing the view.
    pub fn is_filtering(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.is_empty())
    }

    /// Record ids in display order.
    pub fn order(&self) -> &[RecordId] {
        &self.order
    }

    /// Records in display order.
    pub fn records(&self) -> impl Iterator<Item = &FlatRecord> {
        self.order.iter().filter_map(|id| self.mapper.record(*id))
    }

    pub fn record(&self, id: RecordId) -> Option<&FlatRecord> {
        self.mapper.record(id)
    }

    pub fn node_of(&self, id: RecordId) -> Option<NodeHandle> {
        self.mapper.node_of(id)
    }

    pub fn record_of(&self, handle: NodeHandle) -> Option<RecordId> {
        self.mapper.record_of(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::sample_checklist;
    use crate::tree::store::TreeStore;

    fn visible(view: &TreeView) -> Vec<String> {
        view.records()
            .filter(|r| !r.hidden)
            .map(|r| r.name.clone())
            .collect()
    }

    #[test]
    fn filter_does_not_touch_canonical_tree() {
        for mode in [FilterMode::Hide, FilterMode::Prune] {
            let store = TreeStore::new(sample_checklist(), false);
            let mut view = TreeView::new(mode);
            view.apply_filter("pump", store.roots());
            assert_eq!(visible(&view), vec!["Vegetables", "Pumpkins"]);
            assert_eq!(store.roots(), TreeStore::new(sample_checklist(), false).roots());
        }
    }

    #[test]
    fn prune_mode_drops_rows() {
        let store = TreeStore::new(sample_checklist(), false);
        let mut view = TreeView::new(FilterMode::Prune);
        view.apply_filter("pump", store.roots());
        assert_eq!(view.order().len(), 2);
    }

    #[test]
    fn hide_mode_keeps_rows_but_flags_them() {
        let store = TreeStore::new(sample_checklist(), false);
        let mut view = TreeView::new(FilterMode::Hide);
        view.apply_filter("pump", store.roots());
        assert_eq!(view.order().len(), 8);
        assert_eq!(view.records().filter(|r| r.hidden).count(), 6);
    }

    #[test]
    fn empty_filter_restores_everything() {
        let store = TreeStore::new(sample_checklist(), false);
        let mut view = TreeView::new(FilterMode::Hide);
        view.refresh(store.roots());
        let unfiltered = view.order().to_vec();

        view.apply_filter("pump", store.roots());
        view.apply_filter("  ", store.roots());
        assert!(!view.is_filtering());
        assert_eq!(view.order(), unfiltered.as_slice());
        assert!(view.records().all(|r| !r.hidden));
    }

    #[test]
    fn empty_filter_after_prune_keeps_survivor_records() {
        let store = TreeStore::new(sample_checklist(), false);
        let mut view = TreeView::new(FilterMode::Prune);
        view.refresh(store.roots());
        let vegetables = store.roots()[1].handle();
        let pumpkins = store.roots()[1].children.as_ref().unwrap()[0].handle();
        let survivors = [view.record_of(vegetables), view.record_of(pumpkins)];

        view.apply_filter("pump", store.roots());
        view.apply_filter("  ", store.roots());
        assert!(!view.is_filtering());
        assert_eq!(view.order().len(), 8);
        assert_eq!([view.record_of(vegetables), view.record_of(pumpkins)], survivors);
        assert!(view.records().all(|r| !r.hidden));
    }

    #[test]
    fn filter_reapplies_after_mutation() {
        let mut store = TreeStore::new(sample_checklist(), false);
        let view = std::rc::Rc::new(std::cell::RefCell::new(TreeView::new(FilterMode::Hide)));
        store.subscribe(view.clone());
        view.borrow_mut().apply_filter("pump", store.roots());

        let fruits = store.roots()[0].handle();
        store.insert(fruits, "Pumpernickel").unwrap();
        assert_eq!(
            visible(&view.borrow()),
            vec!["Fruits", "Pumpernickel", "Vegetables", "Pumpkins"]
        );
    }

    #[test]
    fn filtered_rows_keep_identity() {
        let store = TreeStore::new(sample_checklist(), false);
        let mut view = TreeView::new(FilterMode::Prune);
        view.refresh(store.roots());
        let pumpkins = store.roots()[1].children.as_ref().unwrap()[0].handle();
        let before = view.record_of(pumpkins).unwrap();
        view.apply_filter("pump", store.roots());
        assert_eq!(view.record_of(pumpkins), Some(before));
        view.clear_filter(store.roots());
        assert_eq!(view.record_of(pumpkins), Some(before));
    }
}
