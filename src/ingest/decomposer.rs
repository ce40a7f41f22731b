//! Tree decomposition
//!
//! Maps one canonical record onto the node graph: the dataset node, a chain
//! of directory nodes along the record's path, and the terminal file or
//! subdataset child reference.
//!
//! Each record is planned first (node identities to load, child links to add,
//! config to bind). Only once every load has succeeded is the cache mutated.

use super::cache::{NodeCache, PersistFailure};
use super::record::{CanonicalRecord, RecordKind};
use crate::config::ResolvedConfig;
use crate::error::CatalogError;
use crate::store::NodeStore;
use crate::tree::ChildRef;
use crate::types::{incremental_paths, NodeIdentity, NodeKind};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Work derived from one record before anything is mutated
#[derive(Debug, Default)]
struct Plan {
    identities: Vec<NodeIdentity>,
    links: Vec<(NodeIdentity, ChildRef)>,
    dataset_config: Option<ResolvedConfig>,
}

impl Plan {
    fn need(&mut self, identity: NodeIdentity) {
        if !self.identities.contains(&identity) {
            self.identities.push(identity);
        }
    }

    /// Chain `segments` under `root`: one directory node per proper prefix,
    /// `terminal` attached to the deepest one (or to `root` for a single segment).
    fn chain(&mut self, root: &NodeIdentity, segments: &[String], terminal: ChildRef) {
        let dirs = incremental_paths(&segments[..segments.len().saturating_sub(1)]);
        let mut parent = root.clone();
        for (dir_path, name) in dirs.iter().zip(segments) {
            let child = ChildRef::new(NodeKind::Directory, name)
                .with("path", dir_path.as_str())
                .with("dataset_id", root.dataset_id.as_str())
                .with("dataset_version", root.dataset_version.as_str());
            self.links.push((parent, child));
            parent = NodeIdentity::directory(&root.dataset_id, &root.dataset_version, dir_path);
            self.need(parent.clone());
        }
        self.links.push((parent, terminal));
    }
}

fn last_segment(segments: &[String]) -> &str {
    segments.last().map(String::as_str).unwrap_or_default()
}

/// Child entry for a file record: the whole record, named by its last path segment
fn file_child(record: &CanonicalRecord) -> ChildRef {
    let mut child = ChildRef::new(NodeKind::File, last_segment(&record.path_segments));
    child.extra = record
        .fields
        .iter()
        .filter(|(key, _)| key.as_str() != "type" && key.as_str() != "name")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    child
}

pub struct Decomposer<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    cache: NodeCache,
    explicit_config: Option<PathBuf>,
}

impl<'a, S: NodeStore + ?Sized> Decomposer<'a, S> {
    /// `explicit_config` is the per-record dataset config applied to dataset records
    pub fn new(store: &'a S, explicit_config: Option<&Path>) -> Self {
        Self {
            store,
            cache: NodeCache::new(),
            explicit_config: explicit_config.map(Path::to_path_buf),
        }
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    fn plan(&self, record: &CanonicalRecord) -> Result<Plan, CatalogError> {
        let dataset = NodeIdentity::dataset(&record.dataset_id, &record.dataset_version);
        let mut plan = Plan::default();
        plan.need(dataset.clone());
        match record.kind {
            RecordKind::File => plan.chain(&dataset, &record.path_segments, file_child(record)),
            RecordKind::Dataset => {
                for sub in &record.subdatasets {
                    let terminal = ChildRef::new(NodeKind::Dataset, last_segment(&sub.segments))
                        .with("path", sub.segments.join("/"))
                        .with("dataset_id", sub.dataset_id.as_str())
                        .with("dataset_version", sub.dataset_version.as_str());
                    plan.chain(&dataset, &sub.segments, terminal);
                }
                plan.dataset_config = Some(self.store.resolve_config(
                    &record.dataset_id,
                    &record.dataset_version,
                    self.explicit_config.as_deref(),
                )?);
            }
        }
        Ok(plan)
    }

    /// Decompose one record into the cache, returning the nodes it touched.
    /// On error the cache is unchanged.
    pub fn process(&mut self, record: &CanonicalRecord) -> Result<Vec<NodeIdentity>, CatalogError> {
        let plan = self.plan(record)?;
        self.cache.preload(self.store, &plan.identities)?;

        for (parent, child) in plan.links {
            if let Some(node) = self.cache.get_mut(&parent) {
                let name = child.name.clone();
                if node.add_child(child) {
                    trace!(parent = %parent, child = name.as_str(), "Linked child");
                }
            }
        }

        if record.kind == RecordKind::Dataset {
            let dataset = NodeIdentity::dataset(&record.dataset_id, &record.dataset_version);
            if let Some(node) = self.cache.get_mut(&dataset) {
                node.config = plan.dataset_config;
                let stats = node.merge_attributes(
                    &record.dataset_attributes(),
                    &record.source,
                    &record.source_name,
                );
                debug!(
                    dataset = %dataset,
                    source = record.source_name.as_str(),
                    replaced = stats.replaced,
                    merged = stats.merged,
                    kept = stats.kept,
                    "Merged dataset record"
                );
            }
        }
        Ok(plan.identities)
    }

    /// Persist every touched node once
    pub fn finish(self) -> (usize, Vec<PersistFailure>) {
        self.cache.flush(self.store)
    }
}
