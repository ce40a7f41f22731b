//! Batch-scoped node cache.
//!
//! Every node touched while decomposing a batch is looked up here by its
//! identity, so records touching the same node accumulate onto one in-memory copy.
//! Nodes are flushed in first-touch order.

use crate::error::StorageError;
use crate::store::NodeStore;
use crate::tree::Node;
use crate::types::NodeIdentity;
use std::collections::HashMap;

/// A node that could not be written at flush time
#[derive(Debug)]
pub struct PersistFailure {
    pub identity: NodeIdentity,
    pub error: StorageError,
}

#[derive(Debug, Default)]
pub struct NodeCache {
    /// Keyed by full identity; digests only disambiguate within one dataset version
    nodes: HashMap<NodeIdentity, Node>,
    order: Vec<NodeIdentity>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, identity: &NodeIdentity) -> bool {
        self.nodes.contains_key(identity)
    }

    pub fn get(&self, identity: &NodeIdentity) -> Option<&Node> {
        self.nodes.get(identity)
    }

    pub fn get_mut(&mut self, identity: &NodeIdentity) -> Option<&mut Node> {
        self.nodes.get_mut(identity)
    }

    /// Load every identity not yet cached.
    ///
    /// All-or-nothing: if any load fails, nothing is inserted.
    pub fn preload<S: NodeStore + ?Sized>(
        &mut self,
        store: &S,
        identities: &[NodeIdentity],
    ) -> Result<(), StorageError> {
        let mut loaded: Vec<Node> = Vec::new();
        for identity in identities {
            let pending = loaded.iter().any(|n| n.identity() == identity);
            if !pending && !self.nodes.contains_key(identity) {
                loaded.push(store.load_or_create(identity)?);
            }
        }
        for node in loaded {
            self.insert(node);
        }
        Ok(())
    }

    fn insert(&mut self, node: Node) {
        let identity = node.identity().clone();
        if self.nodes.insert(identity.clone(), node).is_none() {
            self.order.push(identity);
        }
    }

    /// Nodes in first-touch order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|identity| self.nodes.get(identity))
    }

    /// Persist every cached node once, continuing past failures.
    pub fn flush<S: NodeStore + ?Sized>(self, store: &S) -> (usize, Vec<PersistFailure>) {
        let mut written = 0;
        let mut failures = Vec::new();
        let mut nodes = self.nodes;
        for identity in self.order {
            let Some(node) = nodes.remove(&identity) else {
                continue;
            };
            match store.persist(&node) {
                Ok(()) => written += 1,
                Err(error) => failures.push(PersistFailure {
                    identity: node.identity().clone(),
                    error,
                }),
            }
        }
        (written, failures)
    }
}
