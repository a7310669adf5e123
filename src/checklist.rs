use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::error::{AppError, Result};
use crate::tree::{
    ExpansionControl, FilterMode, NodeHandle, RecordId, SubscriptionId, TreeNode, TreeObserver,
    TreeStore, TreeView,
};

/// The checklist as the front end sees it: a canonical store plus the view
/// subscribed to it. Edits address rows by [`RecordId`]; a record from an
/// earlier pass that no longer resolves is a `ReferenceNotFound` error.
pub struct Checklist {
    store: TreeStore,
    view: Rc<RefCell<TreeView>>,
}

impl Checklist {
    pub fn new(roots: Vec<TreeNode>, mode: FilterMode, ids: bool) -> Self {
        let mut store = TreeStore::new(roots, ids);
        let view = Rc::new(RefCell::new(TreeView::new(mode)));
        store.subscribe(view.clone());
        Self { store, view }
    }

    /// Register an additional observer (e.g. persistence).
    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn TreeObserver>>) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn view(&self) -> Ref<'_, TreeView> {
        self.view.borrow()
    }

    pub fn roots(&self) -> &[TreeNode] {
        self.store.roots()
    }

    /// Append a child to the node behind `record`, then expand `record` so
    /// the new child is reachable. Returns the new node's handle.
    pub fn add_item(
        &mut self,
        record: RecordId,
        name: &str,
        expansion: &mut dyn ExpansionControl,
    ) -> Result<NodeHandle> {
        let parent = self.resolve(record)?;
        let child = self.store.insert(parent, name)?;
        expansion.expand(record);
        Ok(child)
    }

    /// Rename the node behind `record`. The renamed row gets a new record on
    /// the next flatten, so its own expansion state starts over.
    pub fn save_item(
        &mut self,
        record: RecordId,
        name: &str,
        expansion: &mut dyn ExpansionControl,
    ) -> Result<()> {
        let node = self.resolve(record)?;
        self.store.rename(node, name)?;
        expansion.expand(record);
        Ok(())
    }

    /// Delete the node behind `record` and every node matching it.
    pub fn remove_item(
        &mut self,
        record: RecordId,
        expansion: &mut dyn ExpansionControl,
    ) -> Result<usize> {
        let node = self.resolve(record)?;
        let removed = self.store.delete(node)?;
        expansion.expand(record);
        Ok(removed)
    }

    /// Filter the view and force-expand every remaining row.
    pub fn apply_filter(&mut self, query: &str, expansion: &mut dyn ExpansionControl) {
        let mut view = self.view.borrow_mut();
        let rows = view.apply_filter(query, self.store.roots());
        expansion.expand_all(rows);
    }

    pub fn clear_filter(&mut self) {
        self.view.borrow_mut().clear_filter(self.store.roots());
    }

    pub fn set_mode(&mut self, mode: FilterMode, expansion: &mut dyn ExpansionControl) {
        let mut view = self.view.borrow_mut();
        view.set_mode(mode, self.store.roots());
        if view.query().is_some() {
            expansion.expand_all(view.order());
        }
    }

    /// Install a tree loaded from elsewhere. Every earlier record goes stale.
    pub fn replace_all(&mut self, roots: Vec<TreeNode>) {
        self.store.replace_all(roots);
    }

    /// Current record for a node, e.g. the placeholder just inserted.
    pub fn record_for(&self, handle: NodeHandle) -> Option<RecordId> {
        self.view.borrow().record_of(handle)
    }

    fn resolve(&self, record: RecordId) -> Result<NodeHandle> {
        self.view
            .borrow()
            .node_of(record)
            .ok_or_else(|| AppError::ReferenceNotFound(format!("{:?} is stale", record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::outline;
    use crate::tree::{sample_checklist, ExpandedSet};

    fn row(checklist: &Checklist, name: &str) -> RecordId {
        checklist
            .view()
            .records()
            .find(|r| r.name == name)
            .map(|r| r.id)
            .unwrap()
    }

    #[test]
    fn add_item_expands_parent_and_reuses_its_record() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Hide, false);
        let mut expansion = ExpandedSet::default();
        let figs = row(&checklist, "Figs");

        let child = checklist.add_item(figs, "", &mut expansion).unwrap();
        assert!(expansion.is_expanded(figs));
        assert_eq!(row(&checklist, "Figs"), figs);
        assert!(checklist.view().record(figs).unwrap().expandable);

        let placeholder = checklist.record_for(child).unwrap();
        assert_eq!(checklist.view().record(placeholder).unwrap().level, 2);
    }

    #[test]
    fn rename_resets_expansion_of_renamed_row() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Hide, false);
        let mut expansion = ExpandedSet::default();
        let pumpkins = row(&checklist, "Pumpkins");
        expansion.expand(pumpkins);

        checklist.save_item(pumpkins, "Squash", &mut expansion).unwrap();
        let squash = row(&checklist, "Squash");
        assert_ne!(squash, pumpkins);
        assert!(!expansion.is_expanded(squash));
    }

    #[test]
    fn stale_record_is_an_error_not_a_no_op() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Hide, false);
        let mut expansion = ExpandedSet::default();
        let figs = row(&checklist, "Figs");
        checklist.replace_all(sample_checklist());

        let before = outline(checklist.roots());
        assert!(matches!(
            checklist.add_item(figs, "x", &mut expansion),
            Err(AppError::ReferenceNotFound(_))
        ));
        assert!(matches!(
            checklist.save_item(figs, "x", &mut expansion),
            Err(AppError::ReferenceNotFound(_))
        ));
        assert!(matches!(
            checklist.remove_item(figs, &mut expansion),
            Err(AppError::ReferenceNotFound(_))
        ));
        assert_eq!(outline(checklist.roots()), before);
    }

    #[test]
    fn renamed_away_record_is_stale() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Hide, false);
        let mut expansion = ExpandedSet::default();
        let figs = row(&checklist, "Figs");
        checklist.save_item(figs, "Dates", &mut expansion).unwrap();
        assert!(checklist.save_item(figs, "Again", &mut expansion).is_err());
    }

    #[test]
    fn apply_filter_expands_all_rows() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Prune, false);
        let mut expansion = ExpandedSet::default();
        checklist.apply_filter("pump", &mut expansion);
        let order = checklist.view().order().to_vec();
        assert_eq!(order.len(), 2);
        assert!(order.iter().all(|r| expansion.is_expanded(*r)));
    }

    #[test]
    fn insert_rename_delete_round_trip() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Hide, false);
        let mut expansion = ExpandedSet::default();
        let carrots = row(&checklist, "Carrots");
        let before = outline(checklist.roots());

        let child = checklist.add_item(carrots, "", &mut expansion).unwrap();
        let placeholder = checklist.record_for(child).unwrap();
        checklist.save_item(placeholder, "Baby", &mut expansion).unwrap();
        let baby = row(&checklist, "Baby");
        checklist.remove_item(baby, &mut expansion).unwrap();

        assert_eq!(outline(checklist.roots()), before.replace("Carrots", "Carrots[]"));
        assert!(!checklist.view().record(carrots).unwrap().expandable);
    }

    #[test]
    fn mode_switch_keeps_query() {
        let mut checklist = Checklist::new(sample_checklist(), FilterMode::Hide, false);
        let mut expansion = ExpandedSet::default();
        checklist.apply_filter("pump", &mut expansion);
        assert_eq!(checklist.view().order().len(), 8);
        checklist.set_mode(FilterMode::Prune, &mut expansion);
        assert_eq!(checklist.view().order().len(), 2);
        checklist.clear_filter();
        assert_eq!(checklist.view().order().len(), 8);
    }
}
