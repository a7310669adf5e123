//! Checklist tree engine: canonical store, flat projection, filtering.

pub mod expansion;
pub mod filter;
pub mod mapper;
pub mod node;
pub mod store;
pub mod view;

pub use expansion::{visible_rows, ExpandedSet, ExpansionControl};
pub use filter::FilterMode;
pub use mapper::{FlatRecord, RecordId};
pub use node::{NodeHandle, TreeNode};
pub use store::{SubscriptionId, TreeChange, TreeObserver, TreeStore};
pub use view::TreeView;

/// The checklist a fresh install starts with.
pub fn sample_checklist() -> Vec<TreeNode> {
    vec![
        TreeNode::branch(
            "Fruits",
            vec![TreeNode::leaf("Bananas"), TreeNode::leaf("Figs")],
        ),
        TreeNode::branch(
            "Vegetables",
            vec![
                TreeNode::branch(
                    "Pumpkins",
                    vec![TreeNode::leaf("White"), TreeNode::leaf("Blue")],
                ),
                TreeNode::leaf("Carrots"),
            ],
        ),
    ]
}
