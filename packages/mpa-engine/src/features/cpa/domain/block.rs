//! Program blocks for summarization

use std::collections::BTreeSet;

use crate::shared::models::NodeId;

/// A single-entry region of the CFA whose analysis result can be summarized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    pub entry: NodeId,
    pub exits: BTreeSet<NodeId>,
    pub nodes: BTreeSet<NodeId>,
}

impl Block {
    pub fn new(entry: NodeId, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        nodes.insert(entry);
        Self {
            entry,
            exits: BTreeSet::new(),
            nodes,
        }
    }

    pub fn with_exit(mut self, exit: NodeId) -> Self {
        self.nodes.insert(exit);
        self.exits.insert(exit);
        self
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}
