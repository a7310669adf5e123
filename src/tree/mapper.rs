use std::collections::HashMap;

use crate::tree::node::{children_of, NodeHandle, TreeNode};

/// Identity of a flat record. Two passes that return the same `RecordId`
/// for a node handed out the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub id: RecordId,
    pub name: String,
    pub level: usize,
    pub expandable: bool,
    pub hidden: bool,
}

/// Indentation level of a record.
pub fn level_of(record: &FlatRecord) -> usize {
    record.level
}

/// Whether a record can be expanded.
pub fn is_expandable(record: &FlatRecord) -> bool {
    record.expandable
}

/// Projects a forest into preorder display records and keeps the
/// record ↔ node association from the latest pass.
#[derive(Debug, Default)]
pub struct NodeMapper {
    records: HashMap<RecordId, FlatRecord>,
    forward: HashMap<RecordId, NodeHandle>,
    backward: HashMap<NodeHandle, RecordId>,
    next_id: u64,
}

/// Tables being built by a single flatten pass.
#[derive(Default)]
struct Pass {
    order: Vec<RecordId>,
    records: HashMap<RecordId, FlatRecord>,
    forward: HashMap<RecordId, NodeHandle>,
    backward: HashMap<NodeHandle, RecordId>,
}

impl NodeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `roots` in preorder, returning the record ids in display order.
    ///
    /// A node keeps its previous record only if the record's name still
    /// equals the node's name; a renamed node gets a new record. Records not
    /// emitted by this pass are forgotten.
    pub fn flatten(&mut self, roots: &[TreeNode]) -> Vec<RecordId> {
        let mut pass = Pass::default();
        self.flatten_level(roots, 0, &mut pass);

        self.records = pass.records;
        self.forward = pass.forward;
        self.backward = pass.backward;
        pass.order
    }

    fn flatten_level(&mut self, nodes: &[TreeNode], level: usize, pass: &mut Pass) {
        for node in nodes {
            let record = self.transform(node, level);
            let id = record.id;
            pass.forward.insert(id, node.handle());
            pass.backward.insert(node.handle(), id);
            pass.records.insert(id, record);
            pass.order.push(id);

            self.flatten_level(children_of(node), level + 1, pass);
        }
    }

    fn transform(&mut self, node: &TreeNode, level: usize) -> FlatRecord {
        let previous = self
            .backward
            .get(&node.handle())
            .and_then(|id| self.records.remove(id))
            .filter(|record| record.name == node.name);

        let mut record = match previous {
            Some(record) => record,
            None => {
                self.next_id += 1;
                FlatRecord {
                    id: RecordId(self.next_id),
                    name: node.name.clone(),
                    level: 0,
                    expandable: false,
                    hidden: false,
                }
            }
        };
        record.level = level;
        record.expandable = node.has_children();
        record.hidden = node.hidden;
        record
    }

    pub fn record(&self, id: RecordId) -> Option<&FlatRecord> {
        self.records.get(&id)
    }

    /// Node behind a record from the latest pass.
    pub fn node_of(&self, id: RecordId) -> Option<NodeHandle> {
        self.forward.get(&id).copied()
    }

    /// Record currently associated with a node.
    pub fn record_of(&self, handle: NodeHandle) -> Option<RecordId> {
        self.backward.get(&handle).copied()
    }
}
