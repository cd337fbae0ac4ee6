use std::collections::HashMap;

use crate::graph::node::{Node, WeakNode};
use crate::memo::hash::content_hash;

const PRUNE_EVERY: usize = 256;

/// Arena of canonical nodes keyed by content hash.
///
/// Interning a node returns the first live node with the same structure
/// (types included), so identity comparisons stand in for deep equality.
/// Entries are weak: a canonical node is released once nothing else holds
/// it, and dead entries are swept periodically.
#[derive(Default)]
pub struct NodeInterner {
    nodes: HashMap<[u8; 32], WeakNode>,
    inserts_since_prune: usize,
}

impl NodeInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, node: &Node) -> Node {
        let key = content_hash(node);
        if let Some(existing) = self.nodes.get(&key).and_then(WeakNode::upgrade) {
            if existing == *node {
                return existing;
            }
        }

        self.nodes.insert(key, node.downgrade());
        self.inserts_since_prune += 1;
        if self.inserts_since_prune >= PRUNE_EVERY {
            self.prune();
        }
        node.clone()
    }

    /// Drops entries whose node is no longer alive.
    pub fn prune(&mut self) {
        self.nodes.retain(|_, weak| weak.upgrade().is_some());
        self.inserts_since_prune = 0;
    }

    /// Number of entries, live or not yet swept.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
