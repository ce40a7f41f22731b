//! Catalog handle
//!
//! Binds a catalog root, its catalog-level config and the node store, and
//! exposes record ingestion, lookup, removal and the home pointer.

use crate::config::{CatalogConfig, ResolvedConfig, Settings};
use crate::error::{CatalogError, RecordError, StorageError};
use crate::ingest::{ingest_batch, BatchReport};
use crate::store::atomic::{read_json, write_json};
use crate::store::{FsNodeStore, NodeStore};
use crate::tree::{ChildRef, Node};
use crate::types::{path_segments, NodeIdentity, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const METADATA_DIR: &str = "metadata";
pub const CATALOG_CONFIG_FILE: &str = "config.json";
pub const HOME_FILE: &str = "super.json";

/// The catalog's default dataset version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePointer {
    pub dataset_id: String,
    pub dataset_version: String,
}

/// Result of [`Catalog::get_record`]
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRecord {
    /// Dataset or directory node
    Node(Node),
    /// File entry as stored on its parent node
    File(ChildRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed {
        /// The dataset id directory was empty afterwards and was removed too
        dataset_dir_removed: bool,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetHomeOutcome {
    Set,
    Replaced { previous: HomePointer },
    /// No dataset node exists for the requested version
    NotInCatalog,
    /// A different home is set and `overwrite` was not given
    AlreadySet { current: HomePointer },
}

pub struct Catalog {
    root: PathBuf,
    config: CatalogConfig,
    store: FsNodeStore,
}

impl Catalog {
    fn bind(root: &Path, config: CatalogConfig) -> Self {
        let store = FsNodeStore::new(root.join(METADATA_DIR), config.clone());
        Self {
            root: root.to_path_buf(),
            config,
            store,
        }
    }

    /// `{root}/config.json`, else `fallback`, else the built-in default
    fn catalog_config(root: &Path, fallback: Option<&Path>) -> Result<CatalogConfig, CatalogError> {
        let own = root.join(CATALOG_CONFIG_FILE);
        if own.is_file() {
            return Ok(CatalogConfig::load(&own)?);
        }
        match fallback {
            Some(path) => Ok(CatalogConfig::load(path)?),
            None => Ok(CatalogConfig::default()),
        }
    }

    /// Create a catalog at `root`.
    ///
    /// An existing catalog config is kept unless `force` is set.
    pub fn create(root: &Path, config_path: Option<&Path>, force: bool) -> Result<Self, CatalogError> {
        let metadata = root.join(METADATA_DIR);
        fs::create_dir_all(&metadata).map_err(|e| StorageError::write(&metadata, e))?;

        let config_file = root.join(CATALOG_CONFIG_FILE);
        let config = if config_file.is_file() && !force {
            CatalogConfig::load(&config_file)?
        } else {
            let config = match config_path {
                Some(path) => CatalogConfig::load(path)?,
                None => CatalogConfig::default(),
            };
            write_json(&config_file, &config)?;
            config
        };
        info!(root = %root.display(), "Created catalog");
        Ok(Self::bind(root, config))
    }

    /// Open an existing catalog
    pub fn open(root: &Path) -> Result<Self, CatalogError> {
        Self::open_with_fallback(root, None)
    }

    fn open_with_fallback(root: &Path, fallback: Option<&Path>) -> Result<Self, CatalogError> {
        if !root.join(METADATA_DIR).is_dir() {
            return Err(CatalogError::NotFound(format!(
                "no catalog at {}",
                root.display()
            )));
        }
        let config = Self::catalog_config(root, fallback)?;
        debug!(root = %root.display(), "Opened catalog");
        Ok(Self::bind(root, config))
    }

    /// Open the configured catalog, creating it when absent
    pub fn from_settings(settings: &Settings) -> Result<Self, CatalogError> {
        let root = settings
            .catalog
            .root
            .as_deref()
            .ok_or_else(|| CatalogError::ConfigError("catalog.root is not set".to_string()))?;
        let fallback = settings.catalog.default_config.as_deref();
        if root.join(METADATA_DIR).is_dir() {
            Self::open_with_fallback(root, fallback)
        } else {
            Self::create(root, fallback, false)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    /// Catalog-level config
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store(&self) -> &FsNodeStore {
        &self.store
    }

    /// Add a batch of canonical records.
    ///
    /// `dataset_config` applies to dataset records whose version has no
    /// persisted config yet.
    pub fn add<I>(&self, records: I, dataset_config: Option<&Path>) -> BatchReport
    where
        I: IntoIterator,
        I::Item: Borrow<Value>,
    {
        ingest_batch(&self.store, records, dataset_config)
    }

    /// Look up a dataset, directory or file record.
    ///
    /// `path` is required for directories and files and ignored for datasets.
    pub fn get_record(
        &self,
        dataset_id: &str,
        dataset_version: &str,
        kind: NodeKind,
        path: Option<&str>,
    ) -> Result<Option<CatalogRecord>, CatalogError> {
        let dataset = NodeIdentity::dataset(dataset_id, dataset_version);
        if kind == NodeKind::Dataset {
            return Ok(self.store.load(&dataset)?.map(CatalogRecord::Node));
        }

        let segments = path.map(path_segments).unwrap_or_default();
        let Some((last, parents)) = segments.split_last() else {
            return Err(RecordError::MissingField("path").into());
        };
        if kind == NodeKind::Directory {
            let identity =
                NodeIdentity::directory(dataset_id, dataset_version, &segments.join("/"));
            return Ok(self.store.load(&identity)?.map(CatalogRecord::Node));
        }

        // files live as child entries on their parent node
        let parent = if parents.is_empty() {
            dataset
        } else {
            NodeIdentity::directory(dataset_id, dataset_version, &parents.join("/"))
        };
        Ok(self
            .store
            .load(&parent)?
            .and_then(|node| node.child(NodeKind::File, last).cloned())
            .map(CatalogRecord::File))
    }

    /// Delete every node of a dataset version.
    pub fn remove_record(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<RemoveOutcome, CatalogError> {
        let version_dir = self.store.version_dir(dataset_id, dataset_version)?;
        if !version_dir.is_dir() {
            info!(dataset_id, dataset_version, "Nothing to remove");
            return Ok(RemoveOutcome::NotFound);
        }
        fs::remove_dir_all(&version_dir)
            .map_err(|e| StorageError::write(&version_dir, e))?;

        let mut dataset_dir_removed = false;
        if let Some(dataset_dir) = version_dir.parent() {
            let empty = fs::read_dir(dataset_dir)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if empty {
                fs::remove_dir(dataset_dir)
                    .map_err(|e| StorageError::write(dataset_dir, e))?;
                dataset_dir_removed = true;
            }
        }
        info!(dataset_id, dataset_version, dataset_dir_removed, "Removed dataset version");
        Ok(RemoveOutcome::Removed {
            dataset_dir_removed,
        })
    }

    fn home_path(&self) -> PathBuf {
        self.metadata_path().join(HOME_FILE)
    }

    /// Point home at a dataset version, unconditionally
    pub fn set_home(&self, dataset_id: &str, dataset_version: &str) -> Result<(), CatalogError> {
        let home = HomePointer {
            dataset_id: dataset_id.to_string(),
            dataset_version: dataset_version.to_string(),
        };
        write_json(&self.home_path(), &home)?;
        info!(dataset_id, dataset_version, "Set catalog home");
        Ok(())
    }

    /// Point home at a dataset version that exists, keeping any other home
    /// already set. `overwrite` skips both checks.
    pub fn set_home_checked(
        &self,
        dataset_id: &str,
        dataset_version: &str,
        overwrite: bool,
    ) -> Result<SetHomeOutcome, CatalogError> {
        let exists = self
            .store
            .contains(&NodeIdentity::dataset(dataset_id, dataset_version));
        if !exists && !overwrite {
            return Ok(SetHomeOutcome::NotInCatalog);
        }
        let outcome = match self.get_home()? {
            None => SetHomeOutcome::Set,
            Some(current)
                if current.dataset_id == dataset_id && current.dataset_version == dataset_version =>
            {
                SetHomeOutcome::Set
            }
            Some(current) if !overwrite => return Ok(SetHomeOutcome::AlreadySet { current }),
            Some(previous) => SetHomeOutcome::Replaced { previous },
        };
        self.set_home(dataset_id, dataset_version)?;
        Ok(outcome)
    }

    /// Current home pointer, `None` when not set
    pub fn get_home(&self) -> Result<Option<HomePointer>, CatalogError> {
        Ok(read_json(&self.home_path())?)
    }

    /// Config a dataset version is merged under; `None` when the dataset is
    /// not in the catalog
    pub fn dataset_config(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<Option<ResolvedConfig>, CatalogError> {
        if !self
            .store
            .contains(&NodeIdentity::dataset(dataset_id, dataset_version))
        {
            return Ok(None);
        }
        Ok(Some(self.store.resolve_config(
            dataset_id,
            dataset_version,
            None,
        )?))
    }

    /// `(dataset_id, dataset_version)` pairs with a persisted dataset node, sorted
    pub fn dataset_versions(&self) -> Result<Vec<(String, String)>, CatalogError> {
        let metadata = self.metadata_path();
        let mut versions = Vec::new();
        for entry in WalkDir::new(&metadata)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| StorageError::read(&metadata, e))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let version = entry.file_name().to_string_lossy().into_owned();
            let Some(id) = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if self.store.contains(&NodeIdentity::dataset(&id, &version)) {
                versions.push((id, version));
            }
        }
        Ok(versions)
    }
}
