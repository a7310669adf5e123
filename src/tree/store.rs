use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{AppError, Result};
use crate::tree::node::{self, NodeHandle, TreeNode, MAX_NODE_ID};

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// Current state delivered to a new subscriber.
    Initial,
    Inserted { parent: NodeHandle, node: NodeHandle },
    Renamed { node: NodeHandle },
    /// `removed` counts the nodes removed at match points (not their
    /// descendants).
    Deleted { name: String, removed: usize },
    /// The whole canonical tree was swapped out, e.g. after a remote load.
    Replaced,
}

impl TreeChange {
    /// True for changes caused by an edit (as opposed to a load).
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            TreeChange::Inserted { .. } | TreeChange::Renamed { .. } | TreeChange::Deleted { .. }
        )
    }
}

impl fmt::Display for TreeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeChange::Initial => write!(f, "initial"),
            TreeChange::Inserted { parent, node } => {
                write!(f, "inserted #{} under #{}", node.0, parent.0)
            }
            TreeChange::Renamed { node } => write!(f, "renamed #{}", node.0),
            TreeChange::Deleted { name, removed } => write!(f, "deleted {}x {:?}", removed, name),
            TreeChange::Replaced => write!(f, "replaced"),
        }
    }
}

/// Receives the full snapshot after every mutation of a [`TreeStore`].
pub trait TreeObserver {
    fn tree_changed(&mut self, change: &TreeChange, roots: &[TreeNode]);
}

impl<F> TreeObserver for F
where
    F: FnMut(&TreeChange, &[TreeNode]),
{
    fn tree_changed(&mut self, change: &TreeChange, roots: &[TreeNode]) {
        self(change, roots)
    }
}

/// Token returned by [`TreeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of the canonical checklist.
///
/// Every mutation notifies each observer synchronously, in subscription
/// order, before the mutating call returns.
pub struct TreeStore {
    roots: Vec<TreeNode>,
    /// Whether nodes carry persistent ids (remote-backed checklists).
    ids: bool,
    next_handle: u64,
    observers: Vec<(SubscriptionId, Rc<RefCell<dyn TreeObserver>>)>,
    next_subscription: u64,
}

impl TreeStore {
    /// Create a store owning `roots`. With `ids`, nodes lacking an id get one.
    pub fn new(roots: Vec<TreeNode>, ids: bool) -> Self {
        let mut store = Self {
            roots: Vec::new(),
            ids,
            next_handle: 1,
            observers: Vec::new(),
            next_subscription: 1,
        };
        store.roots = store.adopt(roots);
        store
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&TreeNode> {
        node::find(&self.roots, handle)
    }

    /// Register an observer; it immediately receives the current snapshot.
    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn TreeObserver>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        observer
            .borrow_mut()
            .tree_changed(&TreeChange::Initial, &self.roots);
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    #[cfg(test)]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Append a child named `name` to `parent`, creating its children
    /// sequence if absent. An empty name is allowed for placeholders.
    pub fn insert(&mut self, parent: NodeHandle, name: &str) -> Result<NodeHandle> {
        let handle = self.allocate_handle();
        let id = if self.ids { Some(self.fresh_id()) } else { None };
        let target = node::find_mut(&mut self.roots, parent).ok_or_else(|| dangling(parent))?;

        let mut child = TreeNode::leaf(name);
        child.id = id;
        child.handle = handle;
        target.children.get_or_insert_with(Vec::new).push(child);

        tracing::debug!(?parent, ?handle, name, "inserted item");
        self.notify(&TreeChange::Inserted {
            parent,
            node: handle,
        });
        Ok(handle)
    }

    /// Rename a node in place. Children and id are untouched.
    pub fn rename(&mut self, handle: NodeHandle, name: &str) -> Result<()> {
        let target = node::find_mut(&mut self.roots, handle).ok_or_else(|| dangling(handle))?;
        tracing::debug!(?handle, from = %target.name, to = name, "renamed item");
        target.name = name.to_string();
        self.notify(&TreeChange::Renamed { node: handle });
        Ok(())
    }

    /// Delete every node matching the target's name (case-insensitively) and,
    /// when ids are in use, its id. Matching nodes go with their subtrees;
    /// same-named nodes in other branches are removed as well.
    pub fn delete(&mut self, handle: NodeHandle) -> Result<usize> {
        let target = self.get(handle).ok_or_else(|| dangling(handle))?;
        let name = target.name.clone();
        let id = target.id;

        let removed = remove_matching(&mut self.roots, &name.to_lowercase(), id);
        tracing::info!(name = %name, ?id, removed, "deleted items");
        self.notify(&TreeChange::Deleted { name, removed });
        Ok(removed)
    }

    /// Swap in a whole new tree. Filter flags are cleared and every node gets
    /// a fresh handle, so no handle from the previous tree resolves.
    pub fn replace_all(&mut self, mut roots: Vec<TreeNode>) {
        node::clear_hidden(&mut roots);
        self.roots = self.adopt(roots);
        tracing::info!(items = node::count(&self.roots), "replaced checklist");
        self.notify(&TreeChange::Replaced);
    }

    fn notify(&self, change: &TreeChange) {
        for (_, observer) in &self.observers {
            observer.borrow_mut().tree_changed(change, &self.roots);
        }
    }

    fn adopt(&mut self, mut roots: Vec<TreeNode>) -> Vec<TreeNode> {
        let mut next = self.next_handle;
        node::walk_mut(&mut roots, &mut |n| {
            n.handle = NodeHandle(next);
            next += 1;
        });
        self.next_handle = next;

        if self.ids {
            let mut missing = Vec::new();
            node::walk_mut(&mut roots, &mut |n| {
                if n.id.is_none() {
                    missing.push(n.handle);
                }
            });
            for handle in missing {
                let id = unique_id(&roots);
                if let Some(n) = node::find_mut(&mut roots, handle) {
                    n.id = Some(id);
                }
            }
        }
        roots
    }

    fn allocate_handle(&mut self) -> NodeHandle {
        let handle = NodeHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn fresh_id(&self) -> u64 {
        unique_id(&self.roots)
    }
}

/// A random id not yet used anywhere in `roots`.
fn unique_id(roots: &[TreeNode]) -> u64 {
    loop {
        let id = rand::random_range(1..=MAX_NODE_ID);
        if !node::contains_id(roots, id) {
            return id;
        }
    }
}

fn dangling(handle: NodeHandle) -> AppError {
    AppError::ReferenceNotFound(format!("node {:?} is not in the checklist", handle))
}

/// Depth-first removal scan. Each level is walked back to front so removing
/// an element never shifts one that is still to be visited.
fn remove_matching(nodes: &mut Vec<TreeNode>, name_lower: &str, id: Option<u64>) -> usize {
    let mut removed = 0;
    for i in (0..nodes.len()).rev() {
        let candidate = &nodes[i];
        let is_match = candidate.name.to_lowercase() == name_lower
            && (id.is_none() || candidate.id == id);
        if is_match {
            nodes.remove(i);
            removed += 1;
        } else if let Some(children) = &mut nodes[i].children {
            removed += remove_matching(children, name_lower, id);
        }
    }
    removed
}
