use serde::{Deserialize, Serialize};

/// Largest id handed out to a node. Ids stay below 2^53 so they survive a
/// JSON round trip through document stores that parse numbers as doubles.
pub const MAX_NODE_ID: u64 = (1 << 53) - 1;

/// Store-assigned identity of a node in the canonical tree.
///
/// Handles are never serialized. Every node that enters the store (at
/// construction, through `insert`, or through a full replacement) receives a
/// fresh one, so a handle from an earlier tree never resolves in a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) u64);

/// One checklist item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Only present when the checklist is backed by a remote document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// `None` for a leaf that never had children; `Some(vec![])` once its
    /// last child was deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    /// Transient filter state. Accepted on input, never written out.
    #[serde(default, skip_serializing)]
    pub hidden: bool,
    #[serde(skip)]
    pub(crate) handle: NodeHandle,
}

impl TreeNode {
    /// A leaf with the given name.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            children: None,
            hidden: false,
            handle: NodeHandle::default(),
        }
    }

    /// A node with the given children.
    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            children: Some(children),
            ..Self::leaf(name)
        }
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// True iff `children` is present and non-empty.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Children of a node, empty for leaves.
pub fn children_of(node: &TreeNode) -> &[TreeNode] {
    node.children.as_deref().unwrap_or(&[])
}

/// Find a node by handle anywhere in the forest.
pub fn find(nodes: &[TreeNode], handle: NodeHandle) -> Option<&TreeNode> {
    for node in nodes {
        if node.handle == handle {
            return Some(node);
        }
        if let Some(found) = find(children_of(node), handle) {
            return Some(found);
        }
    }
    None
}

/// Find a mutable node by handle anywhere in the forest.
pub fn find_mut(nodes: &mut [TreeNode], handle: NodeHandle) -> Option<&mut TreeNode> {
    for node in nodes.iter_mut() {
        if node.handle == handle {
            return Some(node);
        }
        if let Some(children) = &mut node.children {
            if let Some(found) = find_mut(children, handle) {
                return Some(found);
            }
        }
    }
    None
}

/// Visit every node in preorder.
pub fn walk_mut(nodes: &mut [TreeNode], f: &mut impl FnMut(&mut TreeNode)) {
    for node in nodes.iter_mut() {
        f(node);
        if let Some(children) = &mut node.children {
            walk_mut(children, f);
        }
    }
}

/// Total number of nodes in the forest.
pub fn count(nodes: &[TreeNode]) -> usize {
    nodes.iter().map(|n| 1 + count(children_of(n))).sum()
}

/// Reset every transient `hidden` flag.
pub fn clear_hidden(nodes: &mut [TreeNode]) {
    walk_mut(nodes, &mut |node| node.hidden = false);
}

/// Whether any node in the forest already carries `id`.
pub fn contains_id(nodes: &[TreeNode], id: u64) -> bool {
    nodes
        .iter()
        .any(|n| n.id == Some(id) || contains_id(children_of(n), id))
}

/// Compact outline of a forest, e.g. `A[B, C[]], D`. A leaf without a
/// children sequence prints bare; an emptied one prints `[]`.
#[cfg(test)]
pub fn outline(nodes: &[TreeNode]) -> String {
    nodes
        .iter()
        .map(|n| match &n.children {
            Some(children) => format!("{}[{}]", n.name, outline(children)),
            None => n.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
