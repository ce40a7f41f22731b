//! Filesystem-backed node store rooted at a catalog's `metadata/` directory.

use super::atomic::{read_json, write_json};
use super::NodeStore;
use crate::config::{CatalogConfig, ConfigSource, ResolvedConfig};
use crate::error::StorageError;
use crate::tree::{address_of, Node};
use crate::types::{NodeIdentity, NodeKind};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the per-dataset-version config
pub const DATASET_CONFIG_FILE: &str = "config.json";

/// Reject identity components that would leave their directory
pub(crate) fn checked_component(component: &str) -> Result<&str, StorageError> {
    if component.is_empty()
        || component == "."
        || component == ".."
        || component.contains(['/', '\\'])
    {
        return Err(StorageError::InvalidPath(component.to_string()));
    }
    Ok(component)
}

pub struct FsNodeStore {
    metadata_root: PathBuf,
    default_config: CatalogConfig,
}

impl FsNodeStore {
    pub fn new(metadata_root: impl Into<PathBuf>, default_config: CatalogConfig) -> Self {
        Self {
            metadata_root: metadata_root.into(),
            default_config,
        }
    }

    pub fn metadata_root(&self) -> &Path {
        &self.metadata_root
    }

    pub fn default_config(&self) -> &CatalogConfig {
        &self.default_config
    }

    /// `metadata/{id}/{version}`
    pub fn version_dir(&self, dataset_id: &str, dataset_version: &str) -> Result<PathBuf, StorageError> {
        Ok(self
            .metadata_root
            .join(checked_component(dataset_id)?)
            .join(checked_component(dataset_version)?))
    }

    pub fn dataset_config_path(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<PathBuf, StorageError> {
        Ok(self
            .version_dir(dataset_id, dataset_version)?
            .join(DATASET_CONFIG_FILE))
    }

    /// Absolute node file location
    pub fn node_path(&self, identity: &NodeIdentity) -> Result<PathBuf, StorageError> {
        self.version_dir(&identity.dataset_id, &identity.dataset_version)?;
        Ok(address_of(identity).location(&self.metadata_root))
    }
}

impl NodeStore for FsNodeStore {
    fn load(&self, identity: &NodeIdentity) -> Result<Option<Node>, StorageError> {
        let path = self.node_path(identity)?;
        let Some(value) = read_json::<Value>(&path)? else {
            return Ok(None);
        };
        let node = Node::from_json(identity.clone(), value)
            .map_err(|e| StorageError::read(&path, e))?;
        debug!(node = %identity, path = %path.display(), "Loaded node");
        Ok(Some(node))
    }

    fn contains(&self, identity: &NodeIdentity) -> bool {
        self.node_path(identity)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn resolve_config(
        &self,
        dataset_id: &str,
        dataset_version: &str,
        explicit_config: Option<&Path>,
    ) -> Result<ResolvedConfig, StorageError> {
        let persisted = self.dataset_config_path(dataset_id, dataset_version)?;
        if persisted.is_file() {
            return Ok(ResolvedConfig {
                config: CatalogConfig::load(&persisted)?,
                source: ConfigSource::Dataset,
            });
        }
        if let Some(path) = explicit_config {
            return Ok(ResolvedConfig {
                config: CatalogConfig::load(path)?,
                source: ConfigSource::Dataset,
            });
        }
        Ok(ResolvedConfig {
            config: self.default_config.clone(),
            source: ConfigSource::Catalog,
        })
    }

    fn persist(&self, node: &Node) -> Result<(), StorageError> {
        let identity = node.identity();
        if identity.kind == NodeKind::Dataset {
            if let Some(resolved) = node
                .config
                .as_ref()
                .filter(|c| c.source == ConfigSource::Dataset)
            {
                let config_path =
                    self.dataset_config_path(&identity.dataset_id, &identity.dataset_version)?;
                if !config_path.exists() {
                    write_json(&config_path, &resolved.config)?;
                    debug!(path = %config_path.display(), "Wrote dataset config");
                }
            }
        }
        let path = self.node_path(identity)?;
        write_json(&path, &node.to_json())?;
        debug!(node = %identity, path = %path.display(), "Persisted node");
        Ok(())
    }
}
