use crate::tree::node::TreeNode;

/// How suppressed nodes are removed from view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Suppressed nodes are removed from the (copied) tree.
    Prune,
    /// Suppressed nodes stay in place with `hidden = true`.
    #[default]
    Hide,
}

impl FilterMode {
    /// Parse a mode name from config or CLI.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "prune" => Some(FilterMode::Prune),
            "hide" | "hide-flag" => Some(FilterMode::Hide),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::Prune => "prune",
            FilterMode::Hide => "hide",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            FilterMode::Prune => FilterMode::Hide,
            FilterMode::Hide => FilterMode::Prune,
        }
    }
}

/// Normalize a user query: trimmed and lowercased.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Apply `query` (already normalized) to `nodes`, deciding visibility
/// bottom-up. Returns true iff every node of this sequence ended up
/// suppressed (vacuously true for an empty sequence).
///
/// A node is kept if its name contains the query, or if any descendant is
/// kept. Siblings are visited back to front so prune-mode removal is safe.
pub fn search(query: &str, nodes: &mut Vec<TreeNode>, mode: FilterMode) -> bool {
    let mut all_suppressed = true;
    for i in (0..nodes.len()).rev() {
        let suppress = {
            let node = &mut nodes[i];
            let direct = node.name.to_lowercase().contains(query);
            match &mut node.children {
                Some(children) => {
                    let children_suppressed = search(query, children, mode);
                    !direct && children_suppressed
                }
                None => !direct,
            }
        };

        match mode {
            FilterMode::Prune => {
                if suppress {
                    nodes.remove(i);
                }
            }
            FilterMode::Hide => nodes[i].hidden = suppress,
        }
        all_suppressed &= suppress;
    }
    all_suppressed
}
