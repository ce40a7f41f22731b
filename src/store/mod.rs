//! Node Store
//!
//! Reads and writes nodes at their content addresses and resolves the config
//! a dataset version is merged under.

pub mod atomic;
pub mod fs;

pub use fs::FsNodeStore;

use crate::config::ResolvedConfig;
use crate::error::StorageError;
use crate::tree::Node;
use crate::types::{NodeIdentity, NodeKind};
use std::path::Path;

/// Node Store interface
pub trait NodeStore {
    /// Stored node at the identity's address, if any
    fn load(&self, identity: &NodeIdentity) -> Result<Option<Node>, StorageError>;

    /// Whether a node file exists for the identity
    fn contains(&self, identity: &NodeIdentity) -> bool;

    /// Config for a dataset version: persisted `config.json`, then the
    /// explicit file, then the catalog default. Nothing is written.
    fn resolve_config(
        &self,
        dataset_id: &str,
        dataset_version: &str,
        explicit_config: Option<&Path>,
    ) -> Result<ResolvedConfig, StorageError>;

    /// Write the node (and, for dataset nodes, a missing dataset config).
    fn persist(&self, node: &Node) -> Result<(), StorageError>;

    /// Stored node, or a fresh one with only identity set.
    ///
    /// Dataset nodes come back bound to their resolved config.
    fn load_or_create(&self, identity: &NodeIdentity) -> Result<Node, StorageError> {
        let mut node = match self.load(identity)? {
            Some(node) => node,
            None => Node::new(identity.clone()),
        };
        if identity.kind == NodeKind::Dataset {
            node.config = Some(self.resolve_config(
                &identity.dataset_id,
                &identity.dataset_version,
                None,
            )?);
        }
        Ok(node)
    }
}
